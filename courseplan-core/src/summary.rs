//! Per-course sales aggregation.

use std::collections::BTreeMap;

use crate::DeliveryRecord;

/// Delivery count and sales total for one course.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CourseSummary {
    pub course_number: String,
    pub delivery_count: u64,
    pub total_sales: f64,
}

impl CourseSummary {
    /// Mean sales per delivery, or `None` for an empty course.
    ///
    /// # Examples
    /// ```
    /// use courseplan_core::CourseSummary;
    ///
    /// let summary = CourseSummary {
    ///     course_number: "1".into(),
    ///     delivery_count: 2,
    ///     total_sales: 150.0,
    /// };
    /// assert_eq!(summary.average_sales(), Some(75.0));
    /// ```
    pub fn average_sales(&self) -> Option<f64> {
        if self.delivery_count == 0 {
            return None;
        }
        Some(self.total_sales / self.delivery_count as f64)
    }
}

/// Grand totals across every course.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummaryTotals {
    pub delivery_count: u64,
    pub total_sales: f64,
}

impl SummaryTotals {
    /// Sum the per-course figures.
    pub fn from_summaries(summaries: &[CourseSummary]) -> Self {
        summaries
            .iter()
            .fold(Self::default(), |totals, summary| Self {
                delivery_count: totals.delivery_count + summary.delivery_count,
                total_sales: totals.total_sales + summary.total_sales,
            })
    }
}

/// Group records by course label, ordered by label.
///
/// Labels compare bytewise, so `"10"` sorts before `"2"`.
pub fn summarise_courses<'a, I>(records: I) -> Vec<CourseSummary>
where
    I: IntoIterator<Item = &'a DeliveryRecord>,
{
    let mut groups: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.course_number()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.point.sales;
    }

    groups
        .into_iter()
        .map(|(course_number, (delivery_count, total_sales))| CourseSummary {
            course_number: course_number.to_owned(),
            delivery_count,
            total_sales,
        })
        .collect()
}
