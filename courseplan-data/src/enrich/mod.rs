//! Geocoding enrichment of stored delivery records.

use courseplan_core::{DeliveryStore, StoreError};
use log::{debug, info, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::geocoding::AddressResolver;

mod pacer;

pub use pacer::{DEFAULT_PACING_INTERVAL, Pacer};

/// Outcome of an enrichment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichmentReport {
    /// Records that lacked coordinates when the run started.
    pub total: usize,
    /// Records whose coordinates were stored.
    pub updated: usize,
    /// Whether the run stopped early because it was cancelled.
    pub cancelled: bool,
}

/// Storage failures that abort an enrichment run.
///
/// Coordinates stored before the failure are kept.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Selecting records without coordinates failed.
    #[error("failed to list records missing coordinates: {source}")]
    ListCandidates {
        #[source]
        source: StoreError,
    },
    /// Persisting a resolved coordinate pair failed.
    #[error("failed to store coordinates for record {id}: {source}")]
    PersistCoordinates {
        id: u64,
        #[source]
        source: StoreError,
    },
}

/// Geocode every stored record that lacks a latitude or a longitude.
///
/// Candidates are resolved one at a time in storage order, with a pause
/// from `pacer` after each one. A lookup that fails or finds nothing leaves
/// the record untouched and the run continues. Cancellation is observed
/// between candidates and during pauses, never while a lookup is in flight.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use courseplan_core::{DeliveryPoint, DeliveryStore, SqliteDeliveryStore};
/// use courseplan_data::geocoding::test_support::StubAddressResolver;
/// use courseplan_data::{Pacer, enrich_missing_coordinates};
/// use tokio_util::sync::CancellationToken;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteDeliveryStore::open_in_memory()?;
/// store.replace_all(&[DeliveryPoint::new("1", "Tanaka", "C-1", "Tokyo", 100.0)])?;
/// let resolver = StubAddressResolver::new().with_match("Tokyo", Coord { x: 139.77, y: 35.68 });
///
/// let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
/// let report = runtime.block_on(enrich_missing_coordinates(
///     &mut store,
///     &resolver,
///     &Pacer::new(Duration::ZERO),
///     &CancellationToken::new(),
/// ))?;
///
/// assert_eq!((report.total, report.updated), (1, 1));
/// assert!(store.list_missing_coordinates()?.is_empty());
/// # Ok(())
/// # }
/// ```
pub async fn enrich_missing_coordinates<S, R>(
    store: &mut S,
    resolver: &R,
    pacer: &Pacer,
    cancel: &CancellationToken,
) -> Result<EnrichmentReport, EnrichError>
where
    S: DeliveryStore + ?Sized,
    R: AddressResolver + ?Sized,
{
    let candidates = store
        .list_missing_coordinates()
        .map_err(|source| EnrichError::ListCandidates { source })?;
    let mut report = EnrichmentReport {
        total: candidates.len(),
        ..EnrichmentReport::default()
    };
    info!("geocoding {} records without coordinates", report.total);

    for record in candidates {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        match resolver.resolve(&record.point.address).await {
            Ok(Some(location)) => match store.update_coordinates(record.id, location) {
                Ok(()) => {
                    report.updated += 1;
                    debug!("stored coordinates for record {}", record.id);
                }
                // Replaced by a concurrent ingestion; nothing left to update.
                Err(StoreError::RecordNotFound { id }) => {
                    warn!("record {id} disappeared before its coordinates were stored");
                }
                Err(source) => {
                    return Err(EnrichError::PersistCoordinates {
                        id: record.id,
                        source,
                    });
                }
            },
            Ok(None) => warn!(
                "no geocoding match for record {} ({:?})",
                record.id, record.point.address
            ),
            Err(err) => warn!("geocoding failed for record {}: {err}", record.id),
        }

        if !pacer.pause(cancel).await {
            report.cancelled = true;
            break;
        }
    }

    info!(
        "geocoded {} of {} records{}",
        report.updated,
        report.total,
        if report.cancelled { " before cancellation" } else { "" }
    );
    Ok(report)
}
