//! CSV ingestion, export and geocoding enrichment for Courseplan.
//!
//! Responsibilities:
//! - Parse uploaded CSV files and replace the stored dataset atomically.
//! - Render stored records back to CSV.
//! - Resolve addresses through an external geocoder and persist the
//!   coordinates at a fixed, polite pace.
//!
//! Boundaries:
//! - Domain rules and persistence live in `courseplan-core`.
//! - Network access is confined to [`geocoding`].

pub mod csv;
mod enrich;
pub mod geocoding;
mod ingest;

pub use enrich::{
    DEFAULT_PACING_INTERVAL, EnrichError, EnrichmentReport, Pacer, enrich_missing_coordinates,
};
pub use ingest::{IngestError, IngestReport, ingest_csv, read_csv_upload};
