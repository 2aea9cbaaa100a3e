//! Test utilities for address resolution.
//!
//! [`StubAddressResolver`] answers from an in-memory table without making
//! network requests and records every lookup it receives.

use std::{cell::RefCell, collections::HashMap};

use async_trait::async_trait;
use geo::Coord;

use super::{AddressResolver, ResolveError};

/// Deterministic [`AddressResolver`] for tests.
///
/// Addresses without a configured outcome resolve to no match.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use courseplan_data::geocoding::{AddressResolver, ResolveError};
/// use courseplan_data::geocoding::test_support::StubAddressResolver;
///
/// # tokio_test_block(async {
/// let resolver = StubAddressResolver::new()
///     .with_match("Tokyo", Coord { x: 139.76, y: 35.68 })
///     .with_failure("Osaka", ResolveError::EmptyAddress);
///
/// assert!(resolver.resolve("Tokyo").await.unwrap().is_some());
/// assert!(resolver.resolve("Osaka").await.is_err());
/// assert_eq!(resolver.calls(), vec!["Tokyo", "Osaka"]);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(future: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StubAddressResolver {
    outcomes: HashMap<String, Result<Option<Coord<f64>>, ResolveError>>,
    calls: RefCell<Vec<String>>,
}

impl StubAddressResolver {
    /// Create a resolver that finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `address` to `location`.
    #[must_use]
    pub fn with_match(mut self, address: impl Into<String>, location: Coord<f64>) -> Self {
        self.outcomes.insert(address.into(), Ok(Some(location)));
        self
    }

    /// Fail lookups of `address` with `error`.
    #[must_use]
    pub fn with_failure(mut self, address: impl Into<String>, error: ResolveError) -> Self {
        self.outcomes.insert(address.into(), Err(error));
        self
    }

    /// Addresses looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl AddressResolver for StubAddressResolver {
    async fn resolve(&self, address: &str) -> Result<Option<Coord<f64>>, ResolveError> {
        self.calls.borrow_mut().push(address.to_owned());
        self.outcomes.get(address).cloned().unwrap_or(Ok(None))
    }
}
