//! Core domain types for Courseplan.
//!
//! Delivery points are grouped into numbered courses (delivery routes). This
//! crate defines the record types, course editing rules, per-course
//! aggregation, and the [`DeliveryStore`] persistence seam. A SQLite-backed
//! store is available behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

mod course;
mod record;
pub mod store;
mod summary;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use course::{
    COURSE_PALETTE, CourseEditError, UNASSIGNED_COLOR, assign_course, assign_course_batch,
    course_color, course_color_index,
};
pub use record::{DeliveryPoint, DeliveryRecord};
pub use store::{DeliveryStore, StoreError};
pub use summary::{CourseSummary, SummaryTotals, summarise_courses};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteDeliveryStore, SqliteStoreError};
