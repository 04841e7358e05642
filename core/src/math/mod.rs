pub mod geodesy;
pub mod stats;

pub use geodesy::{haversine_distance, GeodesyHelper, EARTH_RADIUS_M};
pub use stats::StatsHelper;
