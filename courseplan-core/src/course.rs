//! Course labels: marker palette and reassignment of delivery records.

use thiserror::Error;

use crate::{DeliveryStore, StoreError};

/// Marker colours indexed by [`course_color_index`].
pub const COURSE_PALETTE: [&str; 10] = [
    "#ef4444", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
    "#84cc16", "#06b6d4",
];

/// Colour used for courses without a usable numeric prefix.
pub const UNASSIGNED_COLOR: &str = "#6b7280";

/// Palette slot for a course label.
///
/// The label's leading integer (after optional whitespace and sign) is
/// reduced modulo the palette size. Labels without leading digits, and
/// negative values, have no slot.
///
/// # Examples
/// ```
/// use courseplan_core::course_color_index;
///
/// assert_eq!(course_color_index("3"), Some(3));
/// assert_eq!(course_color_index("12-north"), Some(2));
/// assert_eq!(course_color_index("north"), None);
/// assert_eq!(course_color_index("-4"), None);
/// ```
pub fn course_color_index(course_number: &str) -> Option<usize> {
    let trimmed = course_number.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = unsigned
        .split(|ch: char| !ch.is_ascii_digit())
        .next()
        .unwrap_or_default();
    if digits.is_empty() {
        return None;
    }
    if negative && digits.bytes().any(|digit| digit != b'0') {
        return None;
    }
    // Exact integer arithmetic: n mod 10 is the final decimal digit at any
    // length. Labels beyond 2^53 therefore keep their true last digit rather
    // than the digit of a rounded float.
    digits
        .bytes()
        .last()
        .map(|digit| usize::from(digit - b'0') % COURSE_PALETTE.len())
}

/// Hex colour for a course label's map marker.
pub fn course_color(course_number: &str) -> &'static str {
    course_color_index(course_number)
        .and_then(|index| COURSE_PALETTE.get(index).copied())
        .unwrap_or(UNASSIGNED_COLOR)
}

/// Errors returned when reassigning delivery records to a course.
#[derive(Debug, Error)]
pub enum CourseEditError {
    /// No record ids were supplied.
    #[error("at least one delivery record id is required")]
    EmptySelection,
    /// The course label was empty or whitespace.
    #[error("course number must not be blank")]
    BlankCourse,
    /// None of the supplied ids matched a stored record.
    #[error("no delivery records matched ids {ids:?}")]
    NoMatchingRecords {
        /// Identifiers that were requested.
        ids: Vec<u64>,
    },
    /// The store failed while applying the update.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Move a single record to `course_number`.
pub fn assign_course<S>(store: &mut S, id: u64, course_number: &str) -> Result<usize, CourseEditError>
where
    S: DeliveryStore + ?Sized,
{
    assign_course_batch(store, &[id], course_number)
}

/// Move every record in `ids` to `course_number`.
///
/// The label is trimmed before it is stored. Returns the number of records
/// changed; ids that match nothing are ignored unless none match at all.
///
/// # Examples
/// ```
/// use courseplan_core::{DeliveryPoint, DeliveryStore, SqliteDeliveryStore, assign_course_batch};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteDeliveryStore::open_in_memory()?;
/// store.replace_all(&[
///     DeliveryPoint::new("1", "a", "c1", "x", 1.0),
///     DeliveryPoint::new("1", "b", "c2", "y", 1.0),
/// ])?;
/// let ids: Vec<u64> = store.list_all()?.iter().map(|record| record.id).collect();
///
/// let changed = assign_course_batch(&mut store, &ids, " 4 ")?;
/// assert_eq!(changed, 2);
/// assert_eq!(store.list_courses()?, vec!["4".to_owned()]);
/// # Ok(())
/// # }
/// ```
pub fn assign_course_batch<S>(
    store: &mut S,
    ids: &[u64],
    course_number: &str,
) -> Result<usize, CourseEditError>
where
    S: DeliveryStore + ?Sized,
{
    if ids.is_empty() {
        return Err(CourseEditError::EmptySelection);
    }
    let course_number = course_number.trim();
    if course_number.is_empty() {
        return Err(CourseEditError::BlankCourse);
    }

    let changed = store.update_course_number(ids, course_number)?;
    if changed == 0 {
        return Err(CourseEditError::NoMatchingRecords { ids: ids.to_vec() });
    }
    Ok(changed)
}
