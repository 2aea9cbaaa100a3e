//! Test-only, in-memory `DeliveryStore` implementation used by unit and
//! behaviour tests.

use std::collections::HashSet;

use geo::Coord;

use crate::{
    CourseSummary, DeliveryPoint, DeliveryRecord, DeliveryStore, StoreError, summarise_courses,
};

/// In-memory `DeliveryStore` with optional fault injection.
///
/// Identifiers are assigned from a monotonically increasing sequence that is
/// never reset, mirroring the SQLite store. Writes are staged and swapped in
/// only on success, so injected failures leave the previous contents intact.
#[derive(Debug, Clone)]
pub struct MemoryDeliveryStore {
    records: Vec<DeliveryRecord>,
    next_id: u64,
    fail_insert_at: Option<usize>,
    fail_coordinate_update_for: Option<u64>,
    fail_listing: bool,
}

impl Default for MemoryDeliveryStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            fail_insert_at: None,
            fail_coordinate_update_for: None,
            fail_listing: false,
        }
    }
}

impl MemoryDeliveryStore {
    /// Create a store pre-populated with `points`.
    pub fn with_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = DeliveryPoint>,
    {
        let mut store = Self::default();
        for point in points {
            store.push(point);
        }
        store
    }

    /// Fail the insert at zero-based position `index` of the next
    /// [`DeliveryStore::replace_all`] calls.
    #[must_use]
    pub fn failing_insert_at(mut self, index: usize) -> Self {
        self.fail_insert_at = Some(index);
        self
    }

    /// Fail coordinate updates targeting `id`.
    #[must_use]
    pub fn failing_coordinate_update_for(mut self, id: u64) -> Self {
        self.fail_coordinate_update_for = Some(id);
        self
    }

    /// Fail every listing query.
    #[must_use]
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Overwrite a record's coordinates without going through the store API.
    pub fn set_location(&mut self, id: u64, location: Option<Coord<f64>>) {
        if let Some(record) = self.records.iter_mut().find(|record| record.id == id) {
            record.location = location;
        }
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[DeliveryRecord] {
        &self.records
    }

    fn push(&mut self, point: DeliveryPoint) {
        let record = DeliveryRecord::new(self.next_id, point);
        self.next_id += 1;
        self.records.push(record);
    }

    fn check_listing(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.fail_listing {
            return Err(StoreError::backend(operation, "injected listing failure"));
        }
        Ok(())
    }

    fn sorted_by_course(mut records: Vec<DeliveryRecord>) -> Vec<DeliveryRecord> {
        records.sort_by(|left, right| {
            left.course_number()
                .cmp(right.course_number())
                .then(left.id.cmp(&right.id))
        });
        records
    }
}

impl DeliveryStore for MemoryDeliveryStore {
    fn list_all(&self) -> Result<Vec<DeliveryRecord>, StoreError> {
        self.check_listing("list delivery records")?;
        Ok(Self::sorted_by_course(self.records.clone()))
    }

    fn list_course(&self, course_number: &str) -> Result<Vec<DeliveryRecord>, StoreError> {
        self.check_listing("list course records")?;
        Ok(self
            .records
            .iter()
            .filter(|record| record.course_number() == course_number)
            .cloned()
            .collect())
    }

    fn list_missing_coordinates(&self) -> Result<Vec<DeliveryRecord>, StoreError> {
        self.check_listing("list records missing coordinates")?;
        Ok(self
            .records
            .iter()
            .filter(|record| !record.is_geocoded())
            .cloned()
            .collect())
    }

    fn replace_all(&mut self, points: &[DeliveryPoint]) -> Result<usize, StoreError> {
        let mut staged = Vec::with_capacity(points.len());
        let mut next_id = self.next_id;
        for (index, point) in points.iter().enumerate() {
            if self.fail_insert_at == Some(index) {
                return Err(StoreError::backend(
                    "insert delivery point",
                    "injected insert failure",
                ));
            }
            staged.push(DeliveryRecord::new(next_id, point.clone()));
            next_id += 1;
        }
        self.records = staged;
        self.next_id = next_id;
        Ok(points.len())
    }

    fn update_coordinates(&mut self, id: u64, location: Coord<f64>) -> Result<(), StoreError> {
        if self.fail_coordinate_update_for == Some(id) {
            return Err(StoreError::backend(
                "update coordinates",
                "injected update failure",
            ));
        }
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::RecordNotFound { id })?;
        record.location = Some(location);
        Ok(())
    }

    fn update_course_number(
        &mut self,
        ids: &[u64],
        course_number: &str,
    ) -> Result<usize, StoreError> {
        let wanted: HashSet<u64> = ids.iter().copied().collect();
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|record| wanted.contains(&record.id)) {
            record.point.course_number = course_number.to_owned();
            changed += 1;
        }
        Ok(changed)
    }

    fn aggregate_by_course(&self) -> Result<Vec<CourseSummary>, StoreError> {
        self.check_listing("aggregate courses")?;
        Ok(summarise_courses(&self.records))
    }
}
