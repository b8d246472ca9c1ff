use serde::{Deserialize, Serialize};

use crate::processing::baseline::{BaselineEstimator, BaselineOutput};

/// Contiguous run of hot bins, described in MHz and dB of excess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Inclusive bin range.
    pub start_bin: usize,
    pub end_bin: usize,
    pub center_mhz: f64,
    pub width_mhz: f64,
    pub mean_excess_db: f64,
    pub peak_excess_db: f64,
    pub low_mhz: f64,
    pub high_mhz: f64,
}

impl Region {
    fn from_bins(frequencies_hz: &[f64], excess: &[f64], start: usize, end: usize) -> Self {
        let low_hz = frequencies_hz[start];
        let high_hz = frequencies_hz[end];
        let run = &excess[start..=end];
        let mean_excess_db = run.iter().sum::<f64>() / run.len() as f64;
        let peak_excess_db = run.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            start_bin: start,
            end_bin: end,
            center_mhz: 0.5 * (low_hz + high_hz) / 1e6,
            width_mhz: ((high_hz - low_hz) / 1e6).max(0.0),
            mean_excess_db,
            peak_excess_db,
            low_mhz: low_hz / 1e6,
            high_mhz: high_hz / 1e6,
        }
    }

    pub fn interval_mhz(&self) -> (f64, f64) {
        (self.low_mhz, self.high_mhz)
    }
}

/// Single region grown around the strongest smoothed bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakEstimate {
    pub peak_mhz: f64,
    /// Smoothed absolute power at the peak bin.
    pub peak_db: f64,
    pub region: Region,
}

/// Finds hot regions where excess over the baseline reaches `hot_delta_db`.
#[derive(Debug, Clone)]
pub struct RegionExtractor {
    baseline: BaselineEstimator,
    hot_delta_db: f64,
}

const MIN_BINS: usize = 3;

impl RegionExtractor {
    pub fn new(baseline: BaselineEstimator, hot_delta_db: f64) -> Self {
        Self {
            baseline,
            hot_delta_db,
        }
    }

    fn usable(frequencies_hz: &[f64], power_db: &[f64]) -> bool {
        power_db.len() >= MIN_BINS && frequencies_hz.len() == power_db.len()
    }

    /// Mask-based extraction over the whole frame. Degenerate frames yield no regions.
    pub fn extract(&mut self, frequencies_hz: &[f64], power_db: &[f64]) -> Vec<Region> {
        if !Self::usable(frequencies_hz, power_db) {
            return Vec::new();
        }
        let BaselineOutput { excess, .. } = self.baseline.estimate(power_db);
        Self::regions_from_excess(frequencies_hz, &excess, self.hot_delta_db)
    }

    /// Peak-anchored extraction: at most one region around the global maximum.
    pub fn extract_at_peak(
        &mut self,
        frequencies_hz: &[f64],
        power_db: &[f64],
    ) -> Option<PeakEstimate> {
        if !Self::usable(frequencies_hz, power_db) {
            return None;
        }
        let BaselineOutput {
            smoothed, excess, ..
        } = self.baseline.estimate(power_db);
        let peak = smoothed
            .iter()
            .enumerate()
            .fold(0, |best, (idx, value)| {
                if *value > smoothed[best] {
                    idx
                } else {
                    best
                }
            });

        let mut left = peak;
        while left > 0 && excess[left - 1] >= self.hot_delta_db {
            left -= 1;
        }
        let mut right = peak;
        while right + 1 < excess.len() && excess[right + 1] >= self.hot_delta_db {
            right += 1;
        }

        Some(PeakEstimate {
            peak_mhz: frequencies_hz[peak] / 1e6,
            peak_db: smoothed[peak],
            region: Region::from_bins(frequencies_hz, &excess, left, right),
        })
    }

    pub fn hot_mask(excess: &[f64], threshold_db: f64) -> Vec<bool> {
        excess.iter().map(|&e| e >= threshold_db).collect()
    }

    /// Maximal runs of `true`, as inclusive `(start, end)` bin pairs.
    pub fn contiguous_runs(mask: &[bool]) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        for (idx, &hot) in mask.iter().enumerate() {
            match (hot, start) {
                (true, None) => start = Some(idx),
                (false, Some(s)) => {
                    runs.push((s, idx - 1));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, mask.len() - 1));
        }
        runs
    }

    pub fn regions_from_excess(
        frequencies_hz: &[f64],
        excess: &[f64],
        threshold_db: f64,
    ) -> Vec<Region> {
        if !Self::usable(frequencies_hz, excess) {
            return Vec::new();
        }
        Self::contiguous_runs(&Self::hot_mask(excess, threshold_db))
            .into_iter()
            .map(|(start, end)| Region::from_bins(frequencies_hz, excess, start, end))
            .collect()
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new(BaselineEstimator::default(), 6.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 MHz bins starting at `start_mhz`.
    fn axis(start_mhz: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (start_mhz + i as f64) * 1e6).collect()
    }

    fn with_plateau(n: usize, from: usize, to: usize, level: f64) -> Vec<f64> {
        (0..n)
            .map(|i| if (from..=to).contains(&i) { level } else { -90.0 })
            .collect()
    }

    #[test]
    fn contiguous_runs_cover_edges() {
        let mask = [true, true, false, false, true, false, true];
        assert_eq!(
            RegionExtractor::contiguous_runs(&mask),
            vec![(0, 1), (4, 4), (6, 6)]
        );
        assert!(RegionExtractor::contiguous_runs(&[false, false]).is_empty());
    }

    #[test]
    fn regions_report_edges_width_and_excess() {
        let freqs = axis(2400.0, 6);
        let excess = [0.0, 7.0, 9.0, 8.0, 1.0, 6.0];
        let regions = RegionExtractor::regions_from_excess(&freqs, &excess, 6.0);
        assert_eq!(regions.len(), 2);
        let first = &regions[0];
        assert_eq!((first.start_bin, first.end_bin), (1, 3));
        assert_eq!(first.interval_mhz(), (2401.0, 2403.0));
        assert_eq!(first.width_mhz, 2.0);
        assert_eq!(first.center_mhz, 2402.0);
        assert_eq!(first.mean_excess_db, 8.0);
        assert_eq!(first.peak_excess_db, 9.0);
        assert_eq!(regions[1].width_mhz, 0.0);
    }

    #[test]
    fn narrow_emitter_is_extracted_from_power() {
        let freqs = axis(5700.0, 60);
        let power = with_plateau(60, 28, 31, -60.0);
        let mut extractor = RegionExtractor::new(BaselineEstimator::new(1, 5, 20.0), 6.0);
        let regions = extractor.extract(&freqs, &power);
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].start_bin, regions[0].end_bin), (28, 31));
        assert_eq!(regions[0].mean_excess_db, 30.0);
    }

    #[test]
    fn extraction_is_idempotent() {
        let freqs = axis(5700.0, 80);
        let power: Vec<f64> = (0..80)
            .map(|i| -90.0 + ((i * 13) % 7) as f64 + if (30..40).contains(&i) { 20.0 } else { 0.0 })
            .collect();
        let mut extractor = RegionExtractor::default();
        let first = extractor.extract(&freqs, &power);
        let second = extractor.extract(&freqs, &power);
        assert_eq!(first, second);
        assert_eq!(
            extractor.extract_at_peak(&freqs, &power),
            extractor.extract_at_peak(&freqs, &power)
        );
    }

    #[test]
    fn peak_region_grows_while_neighbours_are_hot() {
        let freqs = axis(5800.0, 40);
        let mut power = with_plateau(40, 18, 22, -60.0);
        power[20] = -50.0;
        let mut extractor = RegionExtractor::new(BaselineEstimator::new(1, 5, 20.0), 6.0);
        let estimate = extractor.extract_at_peak(&freqs, &power).unwrap();
        assert_eq!(estimate.peak_mhz, 5820.0);
        assert_eq!(estimate.peak_db, -50.0);
        assert_eq!((estimate.region.start_bin, estimate.region.end_bin), (18, 22));
        assert_eq!(estimate.region.width_mhz, 4.0);
    }

    #[test]
    fn degenerate_frames_yield_no_region() {
        let mut extractor = RegionExtractor::default();
        assert!(extractor.extract(&[1.0, 2.0], &[0.0, 9.0]).is_empty());
        assert!(extractor.extract_at_peak(&[1.0, 2.0], &[0.0, 9.0]).is_none());
        assert!(extractor
            .extract(&[1.0, 2.0, 3.0], &[0.0, 9.0])
            .is_empty());
    }
}
