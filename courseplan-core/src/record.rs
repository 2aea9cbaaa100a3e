use geo::Coord;

/// A delivery destination as read from an upload, before storage assigns it
/// an identifier.
///
/// # Examples
/// ```
/// use courseplan_core::DeliveryPoint;
///
/// let point = DeliveryPoint::new("1", "Tanaka Shoten", "C-001", "Tokyo", 1200.0);
/// assert_eq!(point.course_number, "1");
/// assert_eq!(point.sales, 1200.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryPoint {
    /// Course label; free-form and not guaranteed to be numeric.
    pub course_number: String,
    pub customer_name: String,
    pub customer_code: String,
    pub address: String,
    /// Non-negative sales amount.
    pub sales: f64,
}

impl DeliveryPoint {
    /// Construct a `DeliveryPoint` from its field values.
    pub fn new(
        course_number: impl Into<String>,
        customer_name: impl Into<String>,
        customer_code: impl Into<String>,
        address: impl Into<String>,
        sales: f64,
    ) -> Self {
        Self {
            course_number: course_number.into(),
            customer_name: customer_name.into(),
            customer_code: customer_code.into(),
            address: address.into(),
            sales,
        }
    }
}

/// A persisted delivery point.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. They are
/// held as a single optional pair so a record is either fully geocoded or
/// not geocoded at all.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    /// Identifier assigned by storage.
    pub id: u64,
    pub point: DeliveryPoint,
    /// Geocoded position, if resolution has succeeded.
    pub location: Option<Coord<f64>>,
    /// Creation time in Unix seconds.
    pub created_at: i64,
    /// Last modification time in Unix seconds.
    pub updated_at: i64,
}

impl DeliveryRecord {
    /// Construct an un-geocoded record with zeroed timestamps.
    ///
    /// # Examples
    /// ```
    /// use courseplan_core::{DeliveryPoint, DeliveryRecord};
    ///
    /// let record = DeliveryRecord::new(7, DeliveryPoint::default());
    /// assert_eq!(record.id, 7);
    /// assert!(!record.is_geocoded());
    /// ```
    pub fn new(id: u64, point: DeliveryPoint) -> Self {
        Self {
            id,
            point,
            location: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Attach a geocoded position.
    #[must_use]
    pub fn with_location(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Latitude in decimal degrees, if geocoded.
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|coord| coord.y)
    }

    /// Longitude in decimal degrees, if geocoded.
    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|coord| coord.x)
    }

    /// Whether the record carries coordinates.
    pub fn is_geocoded(&self) -> bool {
        self.location.is_some()
    }

    /// Course label of the underlying point.
    pub fn course_number(&self) -> &str {
        &self.point.course_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn record() -> DeliveryRecord {
        DeliveryRecord::new(
            3,
            DeliveryPoint::new("2", "Sato", "C-9", "Osaka, Kita-ku", 50.0),
        )
    }

    #[rstest]
    fn new_records_are_not_geocoded(record: DeliveryRecord) {
        assert!(!record.is_geocoded());
        assert_eq!(record.latitude(), None);
        assert_eq!(record.longitude(), None);
    }

    #[rstest]
    fn location_maps_to_latitude_and_longitude(record: DeliveryRecord) {
        let geocoded = record.with_location(Coord {
            x: 135.5,
            y: 34.7,
        });
        assert!(geocoded.is_geocoded());
        assert_eq!(geocoded.latitude(), Some(34.7));
        assert_eq!(geocoded.longitude(), Some(135.5));
    }

    #[rstest]
    fn course_number_reads_through_to_point(record: DeliveryRecord) {
        assert_eq!(record.course_number(), "2");
    }
}
