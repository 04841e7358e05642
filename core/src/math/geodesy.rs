use crate::interface::LocationPoint;

/// Mean Earth radius used by the great-circle distance, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub struct GeodesyHelper;

impl GeodesyHelper {
    /// Great-circle (Haversine) distance in metres between two lat/lng pairs
    /// given in degrees.
    pub fn distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
        let d_lat = (lat2 - lat1).to_radians();
        let d_lng = (lng2 - lng1).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

pub fn haversine_distance(a: &LocationPoint, b: &LocationPoint) -> f64 {
    GeodesyHelper::distance_m(a.lat, a.lng, b.lat, b.lng)
}
