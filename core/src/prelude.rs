use serde::{Deserialize, Serialize};

use crate::interface::{Alert, SweepKey};
use crate::processing::floor::FLOOR_WINDOW;

/// Detection thresholds shared by the averaged-frame and floor-rise paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Moving-average taps applied before baseline estimation (odd).
    pub smoothing_taps: usize,
    pub baseline_half_width_bins: usize,
    pub baseline_percentile: f64,
    pub hot_delta_db: f64,
    pub dji_mean_excess_db: f64,
    /// Falls back to `max(6, dji_mean_excess_db - 2)` when unset.
    pub fpv_mean_excess_db: Option<f64>,
    pub fpv_peak_excess_db: f64,
    pub persist_hits: usize,
    pub persist_window: usize,
    pub floor_alert_enabled: bool,
    pub floor_alert_rise_db: f64,
    pub floor_persist_hits: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            smoothing_taps: 3,
            baseline_half_width_bins: 5,
            baseline_percentile: 20.0,
            hot_delta_db: 6.0,
            dji_mean_excess_db: 8.0,
            fpv_mean_excess_db: None,
            fpv_peak_excess_db: 12.0,
            persist_hits: 2,
            persist_window: 5,
            floor_alert_enabled: true,
            floor_alert_rise_db: 10.0,
            floor_persist_hits: 2,
        }
    }
}

impl DetectorConfig {
    pub fn resolved_fpv_mean_excess_db(&self) -> f64 {
        self.fpv_mean_excess_db
            .unwrap_or_else(|| (self.dji_mean_excess_db - 2.0).max(6.0))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_taps == 0 || self.smoothing_taps % 2 == 0 {
            return Err(ConfigError::InvalidParameter(format!(
                "smoothing_taps must be odd, got {}",
                self.smoothing_taps
            )));
        }
        if !(0.0..=100.0).contains(&self.baseline_percentile) {
            return Err(ConfigError::InvalidParameter(format!(
                "baseline_percentile must be within 0..=100, got {}",
                self.baseline_percentile
            )));
        }
        if self.persist_window == 0 {
            return Err(ConfigError::InvalidParameter(
                "persist_window must be at least 1".into(),
            ));
        }
        if self.persist_hits == 0 || self.floor_persist_hits == 0 {
            return Err(ConfigError::InvalidParameter(
                "persist_hits and floor_persist_hits must be at least 1".into(),
            ));
        }
        if self.persist_hits > self.persist_window {
            return Err(ConfigError::InvalidParameter(format!(
                "persist_hits {} exceeds persist_window {}",
                self.persist_hits, self.persist_window
            )));
        }
        if self.floor_persist_hits > FLOOR_WINDOW {
            return Err(ConfigError::InvalidParameter(format!(
                "floor_persist_hits {} exceeds the {}-frame floor window",
                self.floor_persist_hits, FLOOR_WINDOW
            )));
        }
        Ok(())
    }
}

/// Input payload for a detection stage: one (possibly averaged) PSD frame.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    pub key: &'a SweepKey,
    pub frequencies_hz: &'a [f64],
    pub power_db: &'a [f64],
    pub timestamp: f64,
}

/// Output produced by each stage.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub alerts: Vec<Alert>,
    pub metadata: StageMetadata,
}

/// Per-pass bookkeeping used for telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub candidate_count: usize,
    pub accepted_count: usize,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Startup validation failures; the sweep never starts when one is raised.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("band list is empty")]
    EmptyBands,
    #[error("invalid band {low_mhz}-{high_mhz} MHz: low edge must be below high edge")]
    InvalidBand { low_mhz: u32, high_mhz: u32 },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Detection stage fed once per frame by the sweep scheduler.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &DetectorConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput<'_>) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fpv_mean_excess_defaults_from_dji_gate() {
        let mut config = DetectorConfig::default();
        assert_eq!(config.resolved_fpv_mean_excess_db(), 6.0);
        config.dji_mean_excess_db = 11.0;
        assert_eq!(config.resolved_fpv_mean_excess_db(), 9.0);
        config.fpv_mean_excess_db = Some(4.5);
        assert_eq!(config.resolved_fpv_mean_excess_db(), 4.5);
    }

    #[test]
    fn validate_rejects_even_smoothing() {
        let config = DetectorConfig {
            smoothing_taps: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter(_))
        ));
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unreachable_hit_counts() {
        let floor = DetectorConfig {
            floor_persist_hits: FLOOR_WINDOW + 1,
            ..Default::default()
        };
        assert!(matches!(
            floor.validate(),
            Err(ConfigError::InvalidParameter(_))
        ));
        let full_window = DetectorConfig {
            floor_persist_hits: FLOOR_WINDOW,
            ..Default::default()
        };
        assert!(full_window.validate().is_ok());

        let averaged = DetectorConfig {
            persist_hits: 6,
            persist_window: 5,
            ..Default::default()
        };
        assert!(averaged.validate().is_err());
    }
}
