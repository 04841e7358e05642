pub mod duration;
pub mod parse;

pub use duration::{elapsed_ms, format_duration};
pub use parse::parse_utc;
