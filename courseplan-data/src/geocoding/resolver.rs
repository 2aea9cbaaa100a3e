//! HTTP `AddressResolver` backed by the Nominatim search API.

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use log::{debug, warn};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::nominatim::SearchPlace;
use super::{AddressResolver, LANGUAGE_HINT, ResolveError};

/// Public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "DeliveryRouteApp/1.0";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Errors raised while constructing a [`NominatimResolver`].
#[derive(Debug, Error)]
pub enum ResolverBuildError {
    /// The configured base URL is not a valid absolute URL.
    #[error("invalid geocoder base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Configuration for [`NominatimResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatimConfig {
    /// Service root, e.g. `"https://nominatim.openstreetmap.org"`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Extra attempts after a transient failure. Zero disables retries.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub retry_backoff: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl NominatimConfig {
    /// Create a configuration targeting `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Retry transient failures up to `max_retries` extra times.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between retry attempts.
    #[must_use]
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }
}

/// Geocoder issuing one search request per lookup.
///
/// Requests are `GET {base}/search?q=..&format=json&limit=1&accept-language=ja`.
/// Only the first match of the response is used.
#[derive(Debug)]
pub struct NominatimResolver {
    client: Client,
    search_url: Url,
    config: NominatimConfig,
}

impl NominatimResolver {
    /// Create a resolver for `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ResolverBuildError> {
        Self::with_config(NominatimConfig::new(base_url))
    }

    /// Create a resolver with explicit configuration.
    pub fn with_config(config: NominatimConfig) -> Result<Self, ResolverBuildError> {
        let search_url = search_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ResolverBuildError::HttpClient)?;
        Ok(Self {
            client,
            search_url,
            config,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }

    fn request_url(&self, address: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("accept-language", LANGUAGE_HINT);
        url
    }

    async fn search(&self, url: &Url) -> Result<Option<Coord<f64>>, ResolveError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        let places: Vec<SearchPlace> =
            response.json().await.map_err(|err| ResolveError::Parse {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let Some(place) = places.first() else {
            return Ok(None);
        };
        let location = place.location()?;
        debug!(
            "matched {} at ({}, {})",
            place.display_name.as_deref().unwrap_or("<unnamed place>"),
            location.y,
            location.x
        );
        Ok(Some(location))
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &Url) -> ResolveError {
        if error.is_timeout() {
            return ResolveError::Timeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return ResolveError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() {
            return ResolveError::Parse {
                url: url.to_string(),
                message: error.to_string(),
            };
        }

        ResolveError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl AddressResolver for NominatimResolver {
    async fn resolve(&self, address: &str) -> Result<Option<Coord<f64>>, ResolveError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ResolveError::EmptyAddress);
        }

        let url = self.request_url(address);
        let mut attempt = 0;
        loop {
            match self.search(&url).await {
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "geocoding attempt {attempt} of {} failed: {err}; retrying",
                        self.config.max_retries + 1
                    );
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                outcome => return outcome,
            }
        }
    }
}

fn search_url(base_url: &str) -> Result<Url, ResolverBuildError> {
    let invalid = |source| ResolverBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source,
    };
    let root = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&root)
        .and_then(|root| root.join("search"))
        .map_err(invalid)
}
