use num_complex::Complex64;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, NormalError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Spectral shape of a simulated transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitterKind {
    /// Flat wideband plateau, as produced by OFDM video/telemetry links.
    Ofdm,
    /// FM video carrier whose energy tapers away from the center.
    AnalogVideo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: EmitterKind,
    pub center_mhz: f64,
    pub bandwidth_mhz: f64,
    /// Power spectral density above the noise floor.
    pub snr_db: f64,
    /// Probability that the emitter is keyed in any given frame.
    #[serde(default = "always_on")]
    pub duty_cycle: f64,
}

fn always_on() -> f64 {
    1.0
}

impl EmitterProfile {
    pub fn low_hz(&self) -> f64 {
        (self.center_mhz - self.bandwidth_mhz / 2.0) * 1e6
    }

    pub fn high_hz(&self) -> f64 {
        (self.center_mhz + self.bandwidth_mhz / 2.0) * 1e6
    }

    /// Relative amplitude at `freq_hz`, zero outside the occupied bandwidth.
    fn shape(&self, freq_hz: f64) -> f64 {
        let half = self.bandwidth_mhz * 1e6 / 2.0;
        let offset = (freq_hz - self.center_mhz * 1e6).abs();
        if half <= 0.0 || offset > half {
            return 0.0;
        }
        match self.kind {
            EmitterKind::Ofdm => 1.0,
            EmitterKind::AnalogVideo => (0.5 * (1.0 + (PI * offset / half).cos())).sqrt(),
        }
    }
}

/// Synthetic RF environment seen by the simulated receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Noise floor PSD in dB (arbitrary reference).
    pub noise_floor_db: f64,
    pub emitters: Vec<EmitterProfile>,
    /// Probability that a capture returns no data.
    pub dropout_probability: f64,
    /// Cap on synthesised samples per frame; at least one FFT segment is always produced.
    pub max_samples_per_frame: usize,
    /// Broadband floor rise applied after `floor_rise_after_frames` captures.
    pub floor_rise_db: f64,
    pub floor_rise_after_frames: Option<u64>,
    /// Sleep for the frame duration on each capture to pace like hardware.
    pub realtime: bool,
    pub amp_supported: bool,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            noise_floor_db: -100.0,
            emitters: Vec::new(),
            dropout_probability: 0.0,
            max_samples_per_frame: 1 << 16,
            floor_rise_db: 0.0,
            floor_rise_after_frames: None,
            realtime: true,
            amp_supported: true,
            seed: 0,
        }
    }
}

/// Circular complex Gaussian with total power `sigma^2`, split evenly over I and Q.
fn complex_normal(sigma: f64) -> Result<Normal<f64>, NormalError> {
    Normal::new(0.0, sigma / 2f64.sqrt())
}

fn draw(rng: &mut StdRng, dist: &Normal<f64>) -> Complex64 {
    Complex64::new(dist.sample(rng), dist.sample(rng))
}

/// Builds one frame's spectrum in FFT bin order for a slice tuned to
/// `center_hz`: complex Gaussian noise at `floor_db` plus every keyed emitter.
pub fn build_spectrum(
    rng: &mut StdRng,
    emitters: &[&EmitterProfile],
    center_hz: f64,
    sample_rate_hz: f64,
    size: usize,
    floor_db: f64,
) -> Result<Vec<Complex64>, NormalError> {
    let noise = complex_normal(10f64.powf(floor_db / 20.0))?;
    let resolution = sample_rate_hz / size as f64;
    (0..size)
        .map(|k| {
            let signed = if k < size.div_ceil(2) {
                k as f64
            } else {
                k as f64 - size as f64
            };
            let freq_hz = center_hz + signed * resolution;
            let mut bin = draw(rng, &noise);
            for emitter in emitters {
                let shape = emitter.shape(freq_hz);
                if shape > 0.0 {
                    let sigma = 10f64.powf((floor_db + emitter.snr_db) / 20.0) * shape;
                    bin += draw(rng, &complex_normal(sigma)?);
                }
            }
            Ok(bin)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ofdm() -> EmitterProfile {
        EmitterProfile {
            name: Some("link".into()),
            kind: EmitterKind::Ofdm,
            center_mhz: 2440.0,
            bandwidth_mhz: 10.0,
            snr_db: 20.0,
            duty_cycle: 1.0,
        }
    }

    #[test]
    fn emitter_shape_is_bounded_by_bandwidth() {
        let analog = EmitterProfile {
            kind: EmitterKind::AnalogVideo,
            ..ofdm()
        };
        assert_eq!(ofdm().shape(2440e6), 1.0);
        assert_eq!(ofdm().shape(2446e6), 0.0);
        assert!(analog.shape(2444e6) < analog.shape(2440e6));
        assert_eq!(ofdm().low_hz(), 2435e6);
        assert_eq!(ofdm().high_hz(), 2445e6);
    }

    #[test]
    fn spectrum_carries_emitter_energy() {
        let mut rng = StdRng::seed_from_u64(3);
        let emitter = ofdm();
        let spectrum =
            build_spectrum(&mut rng, &[&emitter], 2440e6, 20e6, 256, -100.0).unwrap();
        assert_eq!(spectrum.len(), 256);
        let power = |range: std::ops::Range<usize>| -> f64 {
            range.clone().map(|k| spectrum[k].norm_sqr()).sum::<f64>() / range.len() as f64
        };
        // Bins 0..50 sit inside the emitter, bins 100..150 lie outside the slice centre.
        assert!(power(0..50) > 10.0 * power(100..150));
    }

    #[test]
    fn noise_power_matches_floor() {
        let mut rng = StdRng::seed_from_u64(9);
        let spectrum = build_spectrum(&mut rng, &[], 5800e6, 20e6, 8192, -60.0).unwrap();
        let mean = spectrum.iter().map(|s| s.norm_sqr()).sum::<f64>() / spectrum.len() as f64;
        let db = 10.0 * mean.log10();
        assert!((db + 60.0).abs() < 0.5, "noise at {} dB", db);
    }

    #[test]
    fn non_finite_floor_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(build_spectrum(&mut rng, &[], 5800e6, 20e6, 16, f64::NAN).is_err());
    }

    #[test]
    fn scenario_yaml_uses_defaults() {
        let scenario: ScenarioConfig = serde_yaml::from_str(
            "emitters:\n  - kind: analog_video\n    center_mhz: 5800\n    bandwidth_mhz: 8\n    snr_db: 25\n",
        )
        .unwrap();
        assert_eq!(scenario.emitters.len(), 1);
        assert_eq!(scenario.emitters[0].duty_cycle, 1.0);
        assert_eq!(scenario.noise_floor_db, -100.0);
    }
}
