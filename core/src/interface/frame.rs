use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interface::capture::CaptureError;
use crate::math::stats::StatsHelper;
use crate::prelude::ConfigError;

/// Inclusive frequency band in MHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Band {
    pub low_mhz: u32,
    pub high_mhz: u32,
}

impl Band {
    pub fn new(low_mhz: u32, high_mhz: u32) -> Result<Self, ConfigError> {
        let band = Self { low_mhz, high_mhz };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_mhz >= self.high_mhz {
            return Err(ConfigError::InvalidBand {
                low_mhz: self.low_mhz,
                high_mhz: self.high_mhz,
            });
        }
        Ok(())
    }

    pub fn low_hz(&self) -> u64 {
        u64::from(self.low_mhz) * 1_000_000
    }

    pub fn high_hz(&self) -> u64 {
        u64::from(self.high_mhz) * 1_000_000
    }

    pub fn midpoint_hz(&self) -> u64 {
        (self.low_hz() + self.high_hz()) / 2
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} MHz", self.low_mhz, self.high_mhz)
    }
}

/// Identity of one sweep position; keys the persistence history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SweepKey {
    pub band: Band,
    pub center_hz: u64,
}

impl SweepKey {
    pub fn new(band: Band, center_hz: u64) -> Self {
        Self { band, center_hz }
    }
}

/// One PSD frame as delivered by a capture provider.
#[derive(Debug, Clone)]
pub struct Frame {
    pub frequencies_hz: Vec<f64>,
    pub power_db: Vec<f64>,
    pub center_hz: u64,
    pub sample_rate_hz: f64,
    /// Tuned slice `(low, high)` in Hz.
    pub slice_hz: (f64, f64),
}

impl Frame {
    /// Builds a frame, rejecting mismatched lengths and non-ascending frequency axes.
    pub fn new(
        frequencies_hz: Vec<f64>,
        power_db: Vec<f64>,
        center_hz: u64,
        sample_rate_hz: f64,
    ) -> Result<Self, CaptureError> {
        if frequencies_hz.len() != power_db.len() {
            return Err(CaptureError::Malformed(format!(
                "{} frequencies for {} power bins",
                frequencies_hz.len(),
                power_db.len()
            )));
        }
        if frequencies_hz.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(CaptureError::Malformed(
                "frequency axis is not ascending".into(),
            ));
        }
        let half_span = sample_rate_hz / 2.0;
        let center = center_hz as f64;
        Ok(Self {
            frequencies_hz,
            power_db,
            center_hz,
            sample_rate_hz,
            slice_hz: (center - half_span, center + half_span),
        })
    }

    pub fn len(&self) -> usize {
        self.power_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power_db.is_empty()
    }

    /// Median power, used as the frame noise floor.
    pub fn floor_db(&self) -> Option<f64> {
        StatsHelper::median(&self.power_db)
    }

    pub fn peak_db(&self) -> Option<f64> {
        self.power_db.iter().copied().reduce(f64::max)
    }

    pub fn slice_mhz(&self) -> (f64, f64) {
        (self.slice_hz.0 / 1e6, self.slice_hz.1 / 1e6)
    }
}
