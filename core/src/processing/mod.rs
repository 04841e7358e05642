pub mod decimation;
pub mod progress;
pub mod speed;

pub use decimation::{filter_by_distance, total_distance, DecimationStage};
pub use progress::{track_progress, ProgressStage};
pub use speed::{average_speeds, window_size, SpeedStage};
