//! Nominatim search API response types.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use geo::Coord;
use serde::Deserialize;

use super::ResolveError;

/// One entry of the `format=json` search response.
///
/// Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPlace {
    pub(crate) lat: String,
    pub(crate) lon: String,
    #[serde(default)]
    pub(crate) display_name: Option<String>,
}

impl SearchPlace {
    /// Parse the coordinate pair, rejecting non-finite or out-of-range values.
    pub(crate) fn location(&self) -> Result<Coord<f64>, ResolveError> {
        let invalid = || ResolveError::InvalidCoordinate {
            lat: self.lat.clone(),
            lon: self.lon.clone(),
        };
        let lat: f64 = self.lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = self.lon.trim().parse().map_err(|_| invalid())?;
        let in_range = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !in_range {
            return Err(invalid());
        }
        Ok(Coord { x: lon, y: lat })
    }
}
