use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Welch PSD estimator that wraps the `rustfft` planner for reuse.
///
/// Segments are Hann-windowed, overlapped, and averaged with density
/// scaling. Output bins are shifted so index 0 is the most negative offset.
pub struct WelchEstimator {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    window_power: f64,
    scratch: Vec<Complex64>,
}

impl WelchEstimator {
    pub fn new(fft_size: usize) -> Self {
        let size = fft_size.max(4);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let window: Vec<f64> = (0..size)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / size as f64).cos())
            .collect();
        let window_power = window.iter().map(|w| w * w).sum();
        Self {
            fft,
            window,
            window_power,
            scratch: vec![Complex64::zero(); size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Baseband offsets in Hz matching the bin order of [`Self::estimate`].
    pub fn frequency_offsets(&self, sample_rate_hz: f64) -> Vec<f64> {
        let n = self.fft_size();
        let resolution = sample_rate_hz / n as f64;
        (0..n)
            .map(|i| (i as f64 - (n / 2) as f64) * resolution)
            .collect()
    }

    /// Returns the PSD in dB, or `None` when fewer than one segment of samples
    /// is available.
    pub fn estimate(
        &mut self,
        samples: &[Complex64],
        sample_rate_hz: f64,
        overlap_fraction: f64,
    ) -> Option<Vec<f64>> {
        let n = self.fft_size();
        if samples.len() < n || sample_rate_hz <= 0.0 {
            return None;
        }
        let overlap = (n as f64 * overlap_fraction.clamp(0.0, 0.99)) as usize;
        let step = (n - overlap).max(1);
        let segments = (samples.len() - n) / step + 1;

        let mut accum = vec![0.0f64; n];
        for segment in 0..segments {
            let offset = segment * step;
            for ((slot, &sample), &w) in self
                .scratch
                .iter_mut()
                .zip(&samples[offset..offset + n])
                .zip(&self.window)
            {
                *slot = sample * w;
            }
            self.fft.process(&mut self.scratch);
            for (acc, bin) in accum.iter_mut().zip(&self.scratch) {
                *acc += bin.norm_sqr();
            }
        }

        let scale = 1.0 / (sample_rate_hz * self.window_power * segments as f64);
        let mut psd_db: Vec<f64> = accum
            .iter()
            .map(|&p| 10.0 * (p * scale + 1e-15).log10())
            .collect();
        psd_db.rotate_right(n / 2);
        Some(psd_db)
    }
}
