//! Address resolution against an external geocoding service.
//!
//! [`AddressResolver`] is the seam used by the enrichment pipeline.
//! [`NominatimResolver`] implements it over the OpenStreetMap Nominatim
//! search API, asking for a single best match with a fixed Japanese
//! language hint.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use courseplan_data::geocoding::{AddressResolver, NominatimConfig, NominatimResolver};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NominatimConfig::default()
//!     .with_timeout(Duration::from_secs(10))
//!     .with_max_retries(2);
//! let resolver = NominatimResolver::with_config(config)?;
//!
//! if let Some(location) = resolver.resolve("東京都千代田区丸の内1丁目").await? {
//!     println!("lat {} lon {}", location.y, location.x);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

mod nominatim;
mod resolver;

#[doc(hidden)]
pub mod test_support;

pub use resolver::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, NominatimConfig, NominatimResolver, ResolverBuildError,
};

/// Language hint sent with every lookup.
pub const LANGUAGE_HINT: &str = "ja";

/// Resolves free-form addresses to coordinates (`x = longitude`,
/// `y = latitude`).
#[async_trait(?Send)]
pub trait AddressResolver {
    /// Look up the best match for `address`.
    ///
    /// `Ok(None)` means the service answered but found nothing.
    async fn resolve(&self, address: &str) -> Result<Option<Coord<f64>>, ResolveError>;
}

/// Errors raised while resolving an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// The address was empty or whitespace.
    #[error("address is blank")]
    EmptyAddress,
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    /// The service answered with an error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error contacting {url}: {message}")]
    Network { url: String, message: String },
    /// The response body was not the expected JSON.
    #[error("failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },
    /// The best match carried coordinates that are not valid WGS84 values.
    #[error("service returned invalid coordinates lat={lat:?} lon={lon:?}")]
    InvalidCoordinate { lat: String, lon: String },
}

impl ResolveError {
    /// Whether repeating the same request may succeed.
    ///
    /// Timeouts, transport failures, server errors and rate limiting are
    /// transient; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn http(status: u16) -> ResolveError {
        ResolveError::Http {
            url: "http://localhost/search".into(),
            status,
            message: "boom".into(),
        }
    }

    #[rstest]
    #[case(http(500), true)]
    #[case(http(503), true)]
    #[case(http(429), true)]
    #[case(http(404), false)]
    #[case(http(403), false)]
    #[case(ResolveError::Timeout { url: "u".into(), timeout_secs: 1 }, true)]
    #[case(ResolveError::Network { url: "u".into(), message: "reset".into() }, true)]
    #[case(ResolveError::Parse { url: "u".into(), message: "eof".into() }, false)]
    #[case(ResolveError::EmptyAddress, false)]
    fn classifies_transient_failures(#[case] error: ResolveError, #[case] expected: bool) {
        assert_eq!(error.is_transient(), expected);
    }
}
