pub struct StatsHelper;

impl StatsHelper {
    pub fn median(samples: &[f64]) -> Option<f64> {
        let mut scratch = samples.to_vec();
        Self::percentile_in_place(&mut scratch, 50.0)
    }

    /// Percentile `q` in `[0, 100]` with linear interpolation between order
    /// statistics. Reorders `scratch`.
    pub fn percentile_in_place(scratch: &mut [f64], q: f64) -> Option<f64> {
        if scratch.is_empty() {
            return None;
        }
        scratch.sort_unstable_by(|a, b| a.total_cmp(b));
        let rank = (q.clamp(0.0, 100.0) / 100.0) * (scratch.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let fraction = rank - lower as f64;
        Some(scratch[lower] + (scratch[upper] - scratch[lower]) * fraction)
    }

    /// Centered moving average; edge bins average over the truncated window.
    pub fn moving_average(samples: &[f64], taps: usize) -> Vec<f64> {
        if taps <= 1 || samples.is_empty() {
            return samples.to_vec();
        }
        let half = taps / 2;
        let n = samples.len();
        (0..n)
            .map(|i| {
                let lo = i.saturating_sub(half);
                let hi = (i + half + 1).min(n);
                samples[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0, 5.0];
        let p20 = StatsHelper::percentile_in_place(&mut values, 20.0).unwrap();
        assert!((p20 - 1.8).abs() < 1e-12);
        assert_eq!(StatsHelper::percentile_in_place(&mut values, 0.0), Some(1.0));
        assert_eq!(StatsHelper::percentile_in_place(&mut values, 100.0), Some(5.0));
        assert_eq!(StatsHelper::percentile_in_place(&mut [], 50.0), None);
    }

    #[test]
    fn median_handles_even_lengths() {
        assert_eq!(StatsHelper::median(&[1.0, 4.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(StatsHelper::median(&[7.0]), Some(7.0));
    }

    #[test]
    fn moving_average_truncates_edges() {
        let smoothed = StatsHelper::moving_average(&[3.0, 6.0, 9.0, 12.0], 3);
        assert_eq!(smoothed, vec![4.5, 6.0, 9.0, 10.5]);
        assert_eq!(StatsHelper::moving_average(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }

    #[test]
    fn median_of_empty_is_none() {
        assert_eq!(StatsHelper::median(&[]), None);
        assert_eq!(StatsHelper::median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }
}
