use log::{debug, info, warn};

use crate::interface::{Alert, AlertSink};

/// Thin wrapper over the `log` facade; also usable as a plain alert sink.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn detail(&self, message: &str) {
        debug!("{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for LogManager {
    fn emit(&mut self, alert: &Alert) {
        warn!("{}", alert);
    }
}
