use anyhow::Context;
use clap::Parser;
use dronecore::sweep::CancelToken;
use generator::template::ScenarioTemplate;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{parse_band_list, BandPreset, OutputFormat, ScannerConfig};
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod output;
mod radio;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Sweeps drone control and video bands and raises alerts")]
struct Args {
    /// Load a scanner config from YAML; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sweep a preset band set
    #[arg(long, value_enum)]
    auto: Option<BandPreset>,
    /// Custom bands as LOW:HIGH MHz pairs, e.g. 5738:5758,5645:5900
    #[arg(long)]
    bands: Option<String>,
    #[arg(long)]
    sample_rate: Option<f64>,
    /// Frame duration in milliseconds
    #[arg(long)]
    frame_ms: Option<u32>,
    #[arg(long)]
    nfft: Option<usize>,
    /// Welch segment overlap fraction
    #[arg(long)]
    overlap: Option<f64>,
    #[arg(long)]
    avg_frames: Option<usize>,
    /// Hot-bin threshold above the baseline, dB
    #[arg(long)]
    delta_db: Option<f64>,
    /// Mean excess a wide plateau needs, dB
    #[arg(long)]
    mean_excess_db: Option<f64>,
    /// Rolling-percentile half-width in bins
    #[arg(long)]
    nbins_baseline: Option<usize>,
    #[arg(long)]
    persist_hits: Option<usize>,
    #[arg(long)]
    persist_window: Option<usize>,
    #[arg(long)]
    floor_alert_rise_db: Option<f64>,
    #[arg(long)]
    floor_persist_hits: Option<usize>,
    #[arg(long, default_value_t = false)]
    no_floor_alert: bool,
    /// Seconds spent at each tuning center
    #[arg(long)]
    dwell: Option<f64>,
    /// Center step as a fraction of the sample rate
    #[arg(long)]
    center_overlap: Option<f64>,
    #[arg(long)]
    lna: Option<u32>,
    #[arg(long)]
    vga: Option<u32>,
    #[arg(long, default_value_t = false)]
    amp: bool,
    #[arg(long)]
    device_index: Option<u32>,
    /// Replace the configured emitters with a canned scenario
    #[arg(long, value_enum)]
    scenario: Option<ScenarioTemplate>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long, default_value_t = false)]
    status_line: bool,
    /// Serve /status and /events on 127.0.0.1:PORT
    #[arg(long)]
    serve: Option<u16>,
    /// Stop after this many captures
    #[arg(long)]
    frames: Option<u64>,
    #[arg(long)]
    duration_secs: Option<f64>,
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Args {
    fn into_config(self) -> anyhow::Result<ScannerConfig> {
        let mut config = match &self.config {
            Some(path) => ScannerConfig::load(path)?,
            None => ScannerConfig::default(),
        };

        if let Some(text) = &self.bands {
            config.sweep.bands = parse_band_list(text).context("parsing --bands")?;
        } else if let Some(preset) = self.auto {
            config.sweep.bands = preset.bands();
        }
        config.ensure_bands();

        let sweep = &mut config.sweep;
        override_with(&mut sweep.sample_rate_hz, self.sample_rate);
        override_with(&mut sweep.frame_duration_ms, self.frame_ms);
        override_with(&mut sweep.fft_size, self.nfft);
        override_with(&mut sweep.overlap_fraction, self.overlap);
        override_with(&mut sweep.averaging_frame_count, self.avg_frames);
        override_with(&mut sweep.dwell_seconds, self.dwell);
        override_with(&mut sweep.center_step_overlap, self.center_overlap);

        let detector = &mut config.detector;
        override_with(&mut detector.hot_delta_db, self.delta_db);
        override_with(&mut detector.dji_mean_excess_db, self.mean_excess_db);
        override_with(&mut detector.baseline_half_width_bins, self.nbins_baseline);
        override_with(&mut detector.persist_hits, self.persist_hits);
        override_with(&mut detector.persist_window, self.persist_window);
        override_with(&mut detector.floor_alert_rise_db, self.floor_alert_rise_db);
        override_with(&mut detector.floor_persist_hits, self.floor_persist_hits);
        if self.no_floor_alert {
            detector.floor_alert_enabled = false;
        }

        let device = &mut config.device;
        override_with(&mut device.lna_db, self.lna);
        override_with(&mut device.vga_db, self.vga);
        override_with(&mut device.device_index, self.device_index);
        device.amp_enabled |= self.amp;

        if let Some(template) = self.scenario {
            let built = template.build();
            config.scenario.emitters = built.emitters;
            config.scenario.dropout_probability = built.dropout_probability;
            config.scenario.floor_rise_db = built.floor_rise_db;
            config.scenario.floor_rise_after_frames = built.floor_rise_after_frames;
        }
        override_with(&mut config.scenario.seed, self.seed);

        override_with(&mut config.output.format, self.format);
        config.output.status_line |= self.status_line;
        if self.serve.is_some() {
            config.output.serve = self.serve;
        }
        if self.frames.is_some() {
            config.max_frames = self.frames;
        }
        if self.duration_secs.is_some() {
            config.duration_secs = self.duration_secs;
        }
        Ok(config)
    }
}

/// Cancels the sweep on Ctrl+C from a dedicated signal thread.
fn watch_ctrl_c(cancel: CancelToken) -> anyhow::Result<()> {
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    thread::spawn(move || {
        runtime.block_on(async {
            match signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Ctrl+C received, stopping sweep");
                    cancel.cancel();
                }
                Err(err) => log::error!("awaiting Ctrl+C failed: {}", err),
            }
        });
    });
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Args::parse().into_config()?;

    let bands: Vec<String> = config.sweep.bands.iter().map(|b| b.to_string()).collect();
    log::info!(
        "bands [{}], {:.1} MHz span, {} pt FFT, {} ms frames",
        bands.join(", "),
        config.sweep.sample_rate_hz / 1e6,
        config.sweep.fft_size,
        config.sweep.frame_duration_ms
    );

    let cancel = CancelToken::new();
    watch_ctrl_c(cancel.clone())?;

    let runner = Runner::new(config);
    let summary = runner.run(cancel)?;
    if runner.config().output.status_line {
        println!();
    }
    log::info!(
        "done: {} frames generated, {} captured, {} skipped, {} alerts",
        summary.frames_generated,
        summary.metrics.frames_captured,
        summary.metrics.frames_skipped,
        summary.metrics.alerts_emitted
    );
    Ok(())
}
