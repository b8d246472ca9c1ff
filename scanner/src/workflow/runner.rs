use crate::gui_bridge::bridge::{status_bind_address, StatusBridge};
use crate::output::{JsonLinesSink, SinkSet, StreamSink};
use crate::radio::{configure_best_effort, SyntheticRadio};
use crate::workflow::config::{OutputFormat, ScannerConfig};
use anyhow::Context;
use dronecore::interface::{AlertSink, CaptureProvider, CaptureRequest, CaptureResult, Frame};
use dronecore::sweep::{CancelToken, SweepScheduler};
use dronecore::telemetry::{LogManager, Metrics};
use std::io;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub metrics: Metrics,
    pub frames_generated: u64,
}

/// Cancels the sweep once a fixed number of captures has been attempted.
struct FrameBudget<P> {
    inner: P,
    remaining: Option<u64>,
    cancel: CancelToken,
}

impl<P: CaptureProvider> FrameBudget<P> {
    fn new(inner: P, limit: Option<u64>, cancel: CancelToken) -> Self {
        if limit == Some(0) {
            cancel.cancel();
        }
        Self {
            inner,
            remaining: limit,
            cancel,
        }
    }
}

impl<P: CaptureProvider> CaptureProvider for FrameBudget<P> {
    fn tune(&mut self, center_hz: u64) -> CaptureResult<()> {
        self.inner.tune(center_hz)
    }

    fn capture(&mut self, request: &CaptureRequest) -> CaptureResult<Frame> {
        let result = self.inner.capture(request);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.cancel.cancel();
            }
        }
        result
    }
}

/// Cancels `cancel` after `seconds` from a background thread.
pub fn spawn_deadline(cancel: CancelToken, seconds: f64) {
    let Ok(duration) = Duration::try_from_secs_f64(seconds) else {
        log::warn!("ignoring invalid run duration {}", seconds);
        return;
    };
    thread::spawn(move || {
        thread::sleep(duration);
        cancel.cancel();
    });
}

#[derive(Clone)]
pub struct Runner {
    config: ScannerConfig,
}

impl Runner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Builds the sinks named in the output section and sweeps until cancelled.
    pub fn run(&self, cancel: CancelToken) -> anyhow::Result<RunSummary> {
        let sinks = self.build_sinks();
        self.run_with(cancel, sinks)
    }

    pub fn run_with<S: AlertSink>(
        &self,
        cancel: CancelToken,
        sink: S,
    ) -> anyhow::Result<RunSummary> {
        let config = &self.config;
        let mut radio = SyntheticRadio::open(
            config.device.device_index,
            config.sweep.sample_rate_hz,
            config.scenario.clone(),
        )
        .context("opening receiver")?;
        radio
            .apply_gains(&config.device)
            .context("applying receiver gains")?;
        if config.device.amp_enabled {
            configure_best_effort("front-end amplifier", radio.set_amp(true));
        }

        if let Some(seconds) = config.duration_secs {
            spawn_deadline(cancel.clone(), seconds);
        }
        let provider = FrameBudget::new(radio, config.max_frames, cancel.clone());
        let mut scheduler = SweepScheduler::new(
            config.sweep.clone(),
            &config.detector,
            provider,
            sink,
            cancel,
        )
        .context("configuring sweep")?;
        let metrics = scheduler.run();
        let (provider, _) = scheduler.into_parts();

        Ok(RunSummary {
            metrics,
            frames_generated: provider.inner.frames_generated(),
        })
    }

    fn build_sinks(&self) -> SinkSet {
        let output = &self.config.output;
        let mut sinks = SinkSet::new();
        match output.format {
            OutputFormat::Text => {
                sinks.push(Box::new(StreamSink::new(io::stdout(), output.status_line)))
            }
            OutputFormat::Json => sinks.push(Box::new(JsonLinesSink::new(io::stdout()))),
            OutputFormat::Log => sinks.push(Box::new(LogManager::new())),
        }
        if let Some(port) = output.serve {
            let bridge = StatusBridge::new(self.config.sweep.bands.clone());
            bridge.serve(status_bind_address(port));
            sinks.push(Box::new(bridge));
        }
        sinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{EmitterKind, EmitterProfile, ScenarioConfig};
    use dronecore::interface::{Alert, Band};
    use dronecore::prelude::DetectorConfig;
    use dronecore::sweep::SweepConfig;

    fn small_config(max_frames: u64) -> ScannerConfig {
        ScannerConfig {
            sweep: SweepConfig {
                sample_rate_hz: 20e6,
                frame_duration_ms: 10,
                fft_size: 256,
                averaging_frame_count: 1,
                dwell_seconds: 0.0,
                bands: vec![Band::new(5790, 5810).unwrap()],
                ..Default::default()
            },
            detector: DetectorConfig {
                baseline_half_width_bins: 100,
                ..Default::default()
            },
            scenario: ScenarioConfig {
                realtime: false,
                max_samples_per_frame: 4096,
                seed: 11,
                emitters: vec![EmitterProfile {
                    name: None,
                    kind: EmitterKind::AnalogVideo,
                    center_mhz: 5800.0,
                    bandwidth_mhz: 8.0,
                    snr_db: 25.0,
                    duty_cycle: 1.0,
                }],
                ..Default::default()
            },
            max_frames: Some(max_frames),
            ..Default::default()
        }
    }

    #[test]
    fn runner_stops_after_frame_budget() {
        let runner = Runner::new(small_config(6));
        let mut alerts: Vec<Alert> = Vec::new();
        let summary = runner.run_with(CancelToken::new(), &mut alerts).unwrap();
        assert_eq!(summary.frames_generated, 6);
        assert_eq!(
            summary.metrics.frames_captured + summary.metrics.frames_skipped,
            6
        );
        assert_eq!(summary.metrics.detection_passes, 6);
    }

    #[test]
    fn persistent_emitter_is_reported() {
        let runner = Runner::new(small_config(4));
        let mut alerts: Vec<Alert> = Vec::new();
        runner.run_with(CancelToken::new(), &mut alerts).unwrap();
        assert!(!alerts.is_empty());
        assert!(alerts
            .iter()
            .all(|a| a.label == dronecore::interface::SignalLabel::FpvAnalog));
    }

    #[test]
    fn invalid_gain_is_fatal() {
        let mut config = small_config(1);
        config.device.vga_db = 63;
        let err = Runner::new(config)
            .run_with(CancelToken::new(), Vec::<Alert>::new())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("applying receiver gains"));
    }

    #[test]
    fn unsupported_amp_is_not_fatal() {
        let mut config = small_config(2);
        config.device.amp_enabled = true;
        config.scenario.amp_supported = false;
        let summary = Runner::new(config)
            .run_with(CancelToken::new(), Vec::<Alert>::new())
            .unwrap();
        assert_eq!(summary.frames_generated, 2);
    }

    #[test]
    fn zero_frame_budget_never_captures() {
        let summary = Runner::new(small_config(0))
            .run_with(CancelToken::new(), Vec::<Alert>::new())
            .unwrap();
        assert_eq!(summary.frames_generated, 0);
    }

    #[test]
    fn bad_sweep_config_is_reported() {
        let mut config = small_config(1);
        config.sweep.bands.clear();
        let err = Runner::new(config)
            .run_with(CancelToken::new(), Vec::<Alert>::new())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("configuring sweep"));
    }
}
