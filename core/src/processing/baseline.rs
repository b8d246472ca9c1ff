use crate::math::stats::StatsHelper;
use crate::prelude::DetectorConfig;

/// Smoothed power, its rolling low-percentile floor, and the excess between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineOutput {
    pub smoothed: Vec<f64>,
    pub baseline: Vec<f64>,
    pub excess: Vec<f64>,
}

/// Rolling-percentile noise-floor estimator.
///
/// A low percentile over `±half_width_bins` ignores narrow peaks, so the
/// baseline follows the broad floor rather than transient energy.
#[derive(Debug, Clone)]
pub struct BaselineEstimator {
    smoothing_taps: usize,
    half_width_bins: usize,
    percentile: f64,
    scratch: Vec<f64>,
}

impl BaselineEstimator {
    pub fn new(smoothing_taps: usize, half_width_bins: usize, percentile: f64) -> Self {
        Self {
            smoothing_taps,
            half_width_bins,
            percentile,
            scratch: Vec::with_capacity(2 * half_width_bins + 1),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.smoothing_taps,
            config.baseline_half_width_bins,
            config.baseline_percentile,
        )
    }

    pub fn estimate(&mut self, power_db: &[f64]) -> BaselineOutput {
        let smoothed = StatsHelper::moving_average(power_db, self.smoothing_taps);
        let n = smoothed.len();
        let mut baseline = Vec::with_capacity(n);
        for i in 0..n {
            let lo = i.saturating_sub(self.half_width_bins);
            let hi = (i + self.half_width_bins + 1).min(n);
            self.scratch.clear();
            self.scratch.extend_from_slice(&smoothed[lo..hi]);
            let value = StatsHelper::percentile_in_place(&mut self.scratch, self.percentile)
                .unwrap_or(smoothed[i]);
            baseline.push(value);
        }
        let excess = smoothed
            .iter()
            .zip(&baseline)
            .map(|(s, b)| s - b)
            .collect();
        BaselineOutput {
            smoothed,
            baseline,
            excess,
        }
    }
}

impl Default for BaselineEstimator {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}
