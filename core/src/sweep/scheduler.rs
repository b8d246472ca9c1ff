use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::interface::{
    Alert, AlertSink, Band, CaptureProvider, CaptureRequest, Frame, SweepKey, SweepStatus,
};
use crate::prelude::{
    ConfigError, DetectorConfig, ProcessingStage, StageInput, StageOutput, StageResult,
};
use crate::processing::{FloorAlertMonitor, FrameAverager, PlateauDetector};
use crate::sweep::plan::{plan_sweep, BandPlan};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};

/// Receiver and timing parameters for the sweep loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub sample_rate_hz: f64,
    pub frame_duration_ms: u32,
    pub fft_size: usize,
    pub overlap_fraction: f64,
    pub averaging_frame_count: usize,
    pub dwell_seconds: f64,
    pub center_step_overlap: f64,
    pub bands: Vec<Band>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 20e6,
            frame_duration_ms: 100,
            fft_size: 4096,
            overlap_fraction: 0.5,
            averaging_frame_count: 2,
            dwell_seconds: 0.4,
            center_step_overlap: 0.75,
            bands: Vec::new(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz < 1.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.fft_size == 0 || self.averaging_frame_count == 0 {
            return Err(ConfigError::InvalidParameter(
                "fft_size and averaging_frame_count must be at least 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.overlap_fraction) {
            return Err(ConfigError::InvalidParameter(format!(
                "overlap_fraction must be within [0, 1), got {}",
                self.overlap_fraction
            )));
        }
        if !(self.center_step_overlap > 0.0 && self.center_step_overlap <= 1.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "center_step_overlap must be within (0, 1], got {}",
                self.center_step_overlap
            )));
        }
        self.dwell()?;
        Ok(())
    }

    /// Per-center dwell; rejects negative, non-finite and out-of-range values.
    pub fn dwell(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.dwell_seconds).map_err(|_| {
            ConfigError::InvalidParameter(format!(
                "dwell_seconds must be a non-negative duration, got {}",
                self.dwell_seconds
            ))
        })
    }

    pub fn span_hz(&self) -> u64 {
        self.sample_rate_hz as u64
    }
}

/// Cooperative stop flag, checked between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Drives capture and both detection paths across the configured bands.
///
/// Owns all detector state: the averaging buffer, the persistence history
/// inside the plateau detector, and the floor monitor.
pub struct SweepScheduler<P: CaptureProvider, S: AlertSink> {
    config: SweepConfig,
    dwell: Duration,
    plans: Vec<BandPlan>,
    provider: P,
    sink: S,
    averager: FrameAverager,
    plateau: PlateauDetector,
    floor: FloorAlertMonitor,
    metrics: MetricsRecorder,
    logger: LogManager,
    cancel: CancelToken,
}

impl<P: CaptureProvider, S: AlertSink> SweepScheduler<P, S> {
    pub fn new(
        config: SweepConfig,
        detector: &DetectorConfig,
        provider: P,
        sink: S,
        cancel: CancelToken,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        detector.validate()?;
        let dwell = config.dwell()?;
        let plans = plan_sweep(&config.bands, config.span_hz(), config.center_step_overlap)?;
        let plateau = PlateauDetector::with_config(detector)
            .map_err(|err| ConfigError::InvalidParameter(err.to_string()))?;
        Ok(Self {
            averager: FrameAverager::with_capacity(config.averaging_frame_count),
            config,
            dwell,
            plans,
            provider,
            sink,
            plateau,
            floor: FloorAlertMonitor::new(detector),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
            cancel,
        })
    }

    /// Releases detector state and hands back the provider and sink.
    pub fn into_parts(mut self) -> (P, S) {
        self.plateau.cleanup();
        self.floor.cleanup();
        (self.provider, self.sink)
    }

    /// Sweeps until the cancel token is set, wrapping from the last band to
    /// the first. Returns the final counters.
    pub fn run(&mut self) -> Metrics {
        let total_centers: usize = self.plans.iter().map(|p| p.centers_hz.len()).sum();
        self.logger.record(&format!(
            "sweeping {} band(s), {} center(s)",
            self.plans.len(),
            total_centers
        ));

        let mut band_index = 0;
        while !self.cancel.is_cancelled() {
            let BandPlan { band, centers_hz } = self.plans[band_index].clone();
            for center_hz in centers_hz {
                if self.cancel.is_cancelled() {
                    break;
                }
                self.dwell_at(band, center_hz);
            }
            band_index = (band_index + 1) % self.plans.len();
            self.averager.reset();
        }

        let metrics = self.metrics.snapshot();
        self.logger.record(&format!(
            "sweep stopped: {} frames, {} skipped, {} passes, {} alerts",
            metrics.frames_captured,
            metrics.frames_skipped,
            metrics.detection_passes,
            metrics.alerts_emitted
        ));
        metrics
    }

    fn dwell_at(&mut self, band: Band, center_hz: u64) {
        if let Err(err) = self.provider.tune(center_hz) {
            self.metrics.record_skipped();
            self.logger
                .warn(&format!("tune to {} Hz failed, skipping: {}", center_hz, err));
            return;
        }
        let started = Instant::now();
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            self.capture_once(band, center_hz);
            if started.elapsed() >= self.dwell {
                return;
            }
        }
    }

    fn capture_once(&mut self, band: Band, center_hz: u64) {
        let request = CaptureRequest {
            center_hz,
            frame_duration_ms: self.config.frame_duration_ms,
            fft_size: self.config.fft_size,
            overlap_fraction: self.config.overlap_fraction,
        };
        let started = Instant::now();
        let result = self.provider.capture(&request);
        let elapsed = started.elapsed();
        let budget = Duration::from_millis(u64::from(self.config.frame_duration_ms) * 2);
        if elapsed > budget {
            self.logger.warn(&format!(
                "capture at {} Hz took {} ms (budget {} ms)",
                center_hz,
                elapsed.as_millis(),
                budget.as_millis()
            ));
        }

        match result {
            Ok(frame) if !frame.is_empty() => self.process_frame(band, center_hz, frame),
            Ok(_) => {
                self.metrics.record_skipped();
                self.logger.detail("empty frame, skipping");
            }
            Err(err) => {
                self.metrics.record_skipped();
                self.logger.detail(&format!("skipping frame: {}", err));
            }
        }
    }

    /// Persistence is keyed on the scheduled center, not the center the
    /// provider reports back.
    fn process_frame(&mut self, band: Band, center_hz: u64, frame: Frame) {
        self.metrics.record_captured();
        let timestamp = unix_now();
        let key = SweepKey::new(band, center_hz);

        self.averager.push(&frame.power_db);
        if let Some(averaged) = self.averager.average() {
            self.metrics.record_pass();
            let output = self.plateau.execute(StageInput {
                key: &key,
                frequencies_hz: &frame.frequencies_hz,
                power_db: &averaged,
                timestamp,
            });
            self.dispatch("plateau", output);
        }

        let output = self.floor.execute(StageInput {
            key: &key,
            frequencies_hz: &frame.frequencies_hz,
            power_db: &frame.power_db,
            timestamp,
        });
        self.dispatch("floor", output);

        let metrics = self.metrics.snapshot();
        let status = SweepStatus {
            band,
            center_mhz: center_hz as f64 / 1e6,
            slice_mhz: frame.slice_mhz(),
            floor_db: frame.floor_db().unwrap_or(f64::NAN),
            peak_db: frame.peak_db().unwrap_or(f64::NAN),
            min_floor_db: self.floor.min_floor_db(),
            frames_captured: metrics.frames_captured,
            frames_skipped: metrics.frames_skipped,
        };
        self.sink.status(&status);
    }

    fn dispatch(&mut self, stage: &str, output: StageResult<StageOutput>) {
        match output {
            Ok(output) => {
                self.metrics.record_alerts(output.alerts.len());
                for alert in &output.alerts {
                    self.emit(alert);
                }
            }
            Err(err) => self.logger.warn(&format!("{} stage failed: {}", stage, err)),
        }
    }

    fn emit(&mut self, alert: &Alert) {
        self.logger.detail(&format!("{}", alert));
        self.sink.emit(alert);
    }
}
