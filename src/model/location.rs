use serde::{
    Deserialize,
    Serialize
};

use crate::model::modelerror::ModelError;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic point in decimal degrees with depth in km (positive down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    longitude: f64,
    latitude: f64,
    #[serde(default)]
    depth: f64
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Result<Location, ModelError> {
        ModelError::check_range("longitude", longitude, -180.0, 360.0)?;
        ModelError::check_range("latitude", latitude, -90.0, 90.0)?;
        Ok(Location { longitude, latitude, depth: 0.0 })
    }

    pub fn with_depth(self, depth: f64) -> Result<Location, ModelError> {
        ModelError::check_range("depth", depth, -5.0, 700.0)?;
        Ok(Location { depth, ..self })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Great-circle surface distance in km (haversine).
    pub fn horizontal_distance(&self, other: &Location) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// East / north offset of `self` from `origin` in km on a local
    /// equirectangular projection. Accurate over the few hundred km that
    /// matter for rupture geometry.
    pub fn local_km(&self, origin: &Location) -> (f64, f64) {
        let cos_lat = origin.latitude.to_radians().cos();
        let x = (self.longitude - origin.longitude).to_radians() * cos_lat * EARTH_RADIUS_KM;
        let y = (self.latitude - origin.latitude).to_radians() * EARTH_RADIUS_KM;
        (x, y)
    }

    /// Point `east` / `north` km away on the same local projection.
    pub fn offset_km(&self, east: f64, north: f64) -> Location {
        let cos_lat = self.latitude.to_radians().cos();
        Location {
            longitude: self.longitude + (east / (EARTH_RADIUS_KM * cos_lat)).to_degrees(),
            latitude: self.latitude + (north / EARTH_RADIUS_KM).to_degrees(),
            depth: self.depth
        }
    }
}
