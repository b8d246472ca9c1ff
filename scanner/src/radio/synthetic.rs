use dronecore::interface::{CaptureError, CaptureProvider, CaptureRequest, CaptureResult, Frame};
use dronecore::math::WelchEstimator;
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rustfft::FftPlanner;
use std::thread;
use std::time::Duration;

use crate::generator::profile::{build_spectrum, EmitterProfile, ScenarioConfig};
use crate::radio::{check_gain, DeviceSettings, RadioError};

const LNA_STEP_DB: u32 = 8;
const LNA_MAX_DB: u32 = 40;
const VGA_STEP_DB: u32 = 2;
const VGA_MAX_DB: u32 = 62;
const AMP_GAIN_DB: f64 = 14.0;
const SAMPLE_RATE_RANGE_HZ: std::ops::RangeInclusive<f64> = 2e6..=20e6;

/// Software receiver that synthesises IQ for a scenario and returns Welch PSD frames.
pub struct SyntheticRadio {
    scenario: ScenarioConfig,
    sample_rate_hz: f64,
    tuned_hz: Option<u64>,
    gain_db: f64,
    amp_on: bool,
    frames: u64,
    rng: StdRng,
    planner: FftPlanner<f64>,
    estimator: Option<WelchEstimator>,
}

impl SyntheticRadio {
    pub fn open(
        device_index: u32,
        sample_rate_hz: f64,
        scenario: ScenarioConfig,
    ) -> Result<Self, RadioError> {
        if device_index != 0 {
            return Err(RadioError::NotFound(device_index));
        }
        if !SAMPLE_RATE_RANGE_HZ.contains(&sample_rate_hz) {
            return Err(RadioError::UnsupportedSampleRate(sample_rate_hz));
        }
        let rng = StdRng::seed_from_u64(scenario.seed);
        Ok(Self {
            scenario,
            sample_rate_hz,
            tuned_hz: None,
            gain_db: 0.0,
            amp_on: false,
            frames: 0,
            rng,
            planner: FftPlanner::new(),
            estimator: None,
        })
    }

    /// LNA and VGA gains; both must be accepted for the receiver to be usable.
    pub fn apply_gains(&mut self, settings: &DeviceSettings) -> Result<(), RadioError> {
        let lna = check_gain("LNA", settings.lna_db, LNA_STEP_DB, LNA_MAX_DB)?;
        let vga = check_gain("VGA", settings.vga_db, VGA_STEP_DB, VGA_MAX_DB)?;
        self.gain_db = f64::from(lna + vga);
        Ok(())
    }

    pub fn set_amp(&mut self, enabled: bool) -> Result<(), RadioError> {
        if enabled && !self.scenario.amp_supported {
            return Err(RadioError::AmpUnsupported);
        }
        self.amp_on = enabled;
        Ok(())
    }

    pub fn frames_generated(&self) -> u64 {
        self.frames
    }

    fn floor_db(&self) -> f64 {
        let mut floor = self.scenario.noise_floor_db + self.gain_db;
        if self.amp_on {
            floor += AMP_GAIN_DB;
        }
        if let Some(after) = self.scenario.floor_rise_after_frames {
            if self.frames > after {
                floor += self.scenario.floor_rise_db;
            }
        }
        floor
    }

    fn keyed_emitters(&mut self, center_hz: f64) -> Vec<EmitterProfile> {
        let half_span = self.sample_rate_hz / 2.0;
        let (low, high) = (center_hz - half_span, center_hz + half_span);
        let candidates: Vec<EmitterProfile> = self
            .scenario
            .emitters
            .iter()
            .filter(|e| e.high_hz() > low && e.low_hz() < high)
            .cloned()
            .collect();
        candidates
            .into_iter()
            .filter(|e| self.rng.gen_bool(e.duty_cycle.clamp(0.0, 1.0)))
            .collect()
    }

    fn synthesize(&mut self, center_hz: f64, samples: usize) -> CaptureResult<Vec<Complex64>> {
        let emitters = self.keyed_emitters(center_hz);
        let refs: Vec<&EmitterProfile> = emitters.iter().collect();
        let floor_db = self.floor_db();
        let mut buffer = build_spectrum(
            &mut self.rng,
            &refs,
            center_hz,
            self.sample_rate_hz,
            samples,
            floor_db,
        )
        .map_err(|err| CaptureError::Malformed(format!("noise floor {} dB: {}", floor_db, err)))?;
        let inverse = self.planner.plan_fft_inverse(samples);
        inverse.process(&mut buffer);
        // Scales the unnormalised inverse so the Welch density lands on floor_db.
        let scale = (self.sample_rate_hz / samples as f64).sqrt();
        buffer.iter_mut().for_each(|s| *s *= scale);
        Ok(buffer)
    }

    fn estimator(&mut self, fft_size: usize) -> &mut WelchEstimator {
        if self
            .estimator
            .as_ref()
            .map_or(true, |e| e.fft_size() != fft_size)
        {
            self.estimator = Some(WelchEstimator::new(fft_size));
        }
        self.estimator.get_or_insert_with(|| WelchEstimator::new(fft_size))
    }
}

impl CaptureProvider for SyntheticRadio {
    fn tune(&mut self, center_hz: u64) -> CaptureResult<()> {
        if center_hz == 0 {
            return Err(CaptureError::Device("cannot tune to 0 Hz".into()));
        }
        self.tuned_hz = Some(center_hz);
        Ok(())
    }

    fn capture(&mut self, request: &CaptureRequest) -> CaptureResult<Frame> {
        let center_hz = self
            .tuned_hz
            .ok_or_else(|| CaptureError::Device("capture requested before tuning".into()))?;
        if request.fft_size < 4 {
            return Err(CaptureError::Malformed(format!(
                "fft size {} is too small",
                request.fft_size
            )));
        }
        if self.scenario.realtime {
            thread::sleep(Duration::from_millis(u64::from(request.frame_duration_ms)));
        }
        self.frames += 1;
        if self.scenario.dropout_probability > 0.0
            && self
                .rng
                .gen_bool(self.scenario.dropout_probability.clamp(0.0, 1.0))
        {
            return Err(CaptureError::Unavailable(
                "receiver returned no samples".into(),
            ));
        }

        let wanted =
            (self.sample_rate_hz * f64::from(request.frame_duration_ms) / 1000.0) as usize;
        let cap = self.scenario.max_samples_per_frame.max(request.fft_size);
        let samples = wanted.clamp(request.fft_size, cap);
        let iq = self.synthesize(center_hz as f64, samples)?;

        let sample_rate_hz = self.sample_rate_hz;
        let estimator = self.estimator(request.fft_size);
        let power_db = estimator
            .estimate(&iq, sample_rate_hz, request.overlap_fraction)
            .ok_or_else(|| {
                CaptureError::Unavailable("not enough samples for one segment".into())
            })?;
        let frequencies_hz = estimator
            .frequency_offsets(sample_rate_hz)
            .into_iter()
            .map(|offset| offset + center_hz as f64)
            .collect();
        Frame::new(frequencies_hz, power_db, center_hz, sample_rate_hz)
    }
}
