pub mod bridge;
pub mod error;
pub mod model;
