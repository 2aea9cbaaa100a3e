//! Storage traits for delivery records.
//!
//! The [`DeliveryStore`] trait treats persistence as an opaque keyed table.
//! Ingestion replaces the table wholesale, enrichment fills in coordinates
//! one record at a time, and course edits rewrite the grouping label.

use std::error::Error as StdError;

use geo::Coord;
use thiserror::Error;

use crate::{CourseSummary, DeliveryPoint, DeliveryRecord};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteDeliveryStore, SqliteStoreError};

/// Errors raised by [`DeliveryStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend failed while performing `operation`.
    #[error("storage failure during {operation}: {source}")]
    Backend {
        /// Short description of the failed operation.
        operation: &'static str,
        /// Backend-specific error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The targeted record does not exist.
    #[error("delivery record {id} does not exist")]
    RecordNotFound {
        /// Identifier that matched no record.
        id: u64,
    },
}

impl StoreError {
    /// Wrap a backend error with the operation that produced it.
    pub fn backend(
        operation: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }
}

/// Read and write access to the delivery-point table.
///
/// Listing methods return records ordered by course label and then by id,
/// except [`DeliveryStore::list_missing_coordinates`], which orders by id.
///
/// # Examples
///
/// ```rust
/// use courseplan_core::{DeliveryPoint, DeliveryStore, SqliteDeliveryStore};
///
/// # fn main() -> Result<(), courseplan_core::StoreError> {
/// let mut store = SqliteDeliveryStore::open_in_memory()?;
/// let inserted = store.replace_all(&[
///     DeliveryPoint::new("2", "Sato", "C-2", "Osaka", 30.0),
///     DeliveryPoint::new("1", "Tanaka", "C-1", "Tokyo", 100.0),
/// ])?;
/// assert_eq!(inserted, 2);
///
/// let records = store.list_all()?;
/// assert_eq!(records[0].course_number(), "1");
/// # Ok(())
/// # }
/// ```
pub trait DeliveryStore {
    /// Every record, ordered by course label then id.
    fn list_all(&self) -> Result<Vec<DeliveryRecord>, StoreError>;

    /// Records belonging to `course_number`, ordered by id.
    fn list_course(&self, course_number: &str) -> Result<Vec<DeliveryRecord>, StoreError>;

    /// Records missing either coordinate, ordered by id.
    ///
    /// A record lacking only one of latitude or longitude is selected just
    /// like a record lacking both.
    fn list_missing_coordinates(&self) -> Result<Vec<DeliveryRecord>, StoreError>;

    /// Atomically discard every stored record and insert `points` in order.
    ///
    /// Returns the number of inserted records. On failure the previous
    /// contents remain untouched.
    fn replace_all(&mut self, points: &[DeliveryPoint]) -> Result<usize, StoreError>;

    /// Persist both coordinates for the record identified by `id`.
    fn update_coordinates(&mut self, id: u64, location: Coord<f64>) -> Result<(), StoreError>;

    /// Set the course label of every record in `ids`, returning the number of
    /// records changed.
    fn update_course_number(
        &mut self,
        ids: &[u64],
        course_number: &str,
    ) -> Result<usize, StoreError>;

    /// Per-course delivery counts and sales totals, ordered by course label.
    fn aggregate_by_course(&self) -> Result<Vec<CourseSummary>, StoreError>;

    /// Distinct course labels in ascending order.
    fn list_courses(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .aggregate_by_course()?
            .into_iter()
            .map(|summary| summary.course_number)
            .collect())
    }
}
