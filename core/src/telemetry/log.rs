use log::debug;

/// Per-stage log sink. Stage chatter stays at debug level so that request
/// handling does not flood the default `info` output.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        debug!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
