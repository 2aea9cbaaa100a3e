//! Facade crate for the Courseplan delivery-route toolkit.
//!
//! This crate re-exports the core domain types and exposes the SQLite-backed
//! delivery store behind a feature flag.

#![forbid(unsafe_code)]

pub use courseplan_core::{
    CourseEditError, CourseSummary, DeliveryPoint, DeliveryRecord, DeliveryStore, StoreError,
    SummaryTotals, assign_course, assign_course_batch, course_color, course_color_index,
};

#[cfg(feature = "store-sqlite")]
pub use courseplan_core::SqliteDeliveryStore;

#[cfg(feature = "test-support")]
pub use courseplan_core::test_support::MemoryDeliveryStore;
