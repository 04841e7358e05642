pub mod location;
pub mod report;

pub use location::{sort_chronologically, LocationPoint};
pub use report::{
    AltitudeSample, AltitudeSummary, DistanceSummary, PointProgress, ProcessedPoint, SpeedSample,
    SpeedSummary, TrajectoryReport,
};
