pub mod synthetic;

pub use synthetic::SyntheticRadio;

use serde::{Deserialize, Serialize};

/// Receiver front-end settings applied once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub device_index: u32,
    pub lna_db: u32,
    pub vga_db: u32,
    pub amp_enabled: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            lna_db: 32,
            vga_db: 30,
            amp_enabled: false,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RadioError {
    #[error("no receiver at index {0}")]
    NotFound(u32),
    #[error("sample rate {0} Hz is outside the supported 2-20 MHz range")]
    UnsupportedSampleRate(f64),
    #[error("{stage} gain {value} dB is not a multiple of {step} within 0..={max}")]
    InvalidGain {
        stage: &'static str,
        value: u32,
        step: u32,
        max: u32,
    },
    #[error("front-end amplifier is not available on this receiver")]
    AmpUnsupported,
}

pub(crate) fn check_gain(
    stage: &'static str,
    value: u32,
    step: u32,
    max: u32,
) -> Result<u32, RadioError> {
    if value > max || value % step != 0 {
        return Err(RadioError::InvalidGain {
            stage,
            value,
            step,
            max,
        });
    }
    Ok(value)
}

/// Applies an optional setting; a failure is logged and the sweep carries on.
pub fn configure_best_effort(what: &str, result: Result<(), RadioError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("{} not applied: {}", what, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_steps_are_enforced() {
        assert_eq!(check_gain("LNA", 32, 8, 40), Ok(32));
        assert!(check_gain("LNA", 33, 8, 40).is_err());
        assert!(check_gain("VGA", 64, 2, 62).is_err());
        assert_eq!(check_gain("VGA", 0, 2, 62), Ok(0));
    }

    #[test]
    fn best_effort_reports_outcome() {
        assert!(configure_best_effort("amp", Ok(())));
        assert!(!configure_best_effort("amp", Err(RadioError::AmpUnsupported)));
    }
}
