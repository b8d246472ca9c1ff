use anyhow::Context;
use clap::ValueEnum;
use dronecore::interface::Band;
use dronecore::prelude::{ConfigError, DetectorConfig};
use dronecore::sweep::SweepConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::ScenarioConfig;
use crate::radio::DeviceSettings;

/// Named band sets for the usual drone control and video links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPreset {
    /// Analog FPV video, 5650-5920 MHz.
    Fpv,
    /// DJI-style OFDM links in 2.4 GHz and 5.8 GHz.
    Dji,
    /// Both of the above.
    All,
}

impl BandPreset {
    pub fn bands(self) -> Vec<Band> {
        let fpv = Band {
            low_mhz: 5650,
            high_mhz: 5920,
        };
        let dji = [
            Band {
                low_mhz: 2400,
                high_mhz: 2483,
            },
            Band {
                low_mhz: 5725,
                high_mhz: 5850,
            },
        ];
        match self {
            BandPreset::Fpv => vec![fpv],
            BandPreset::Dji => dji.to_vec(),
            BandPreset::All => {
                let mut bands = vec![fpv];
                bands.extend(dji);
                bands
            }
        }
    }
}

/// Parses `low:high` MHz pairs separated by commas, e.g. `5738:5758,5645:5900`.
///
/// Malformed or inverted chunks are skipped with a warning; an empty result
/// is an error.
pub fn parse_band_list(text: &str) -> Result<Vec<Band>, ConfigError> {
    let bands: Vec<Band> = text
        .split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| match parse_band(chunk) {
            Some(band) => Some(band),
            None => {
                log::warn!("ignoring band '{}', expected LOW:HIGH in MHz", chunk);
                None
            }
        })
        .collect();
    if bands.is_empty() {
        return Err(ConfigError::EmptyBands);
    }
    Ok(bands)
}

fn parse_band(chunk: &str) -> Option<Band> {
    let (low, high) = chunk.split_once(':')?;
    let low = low.trim().parse().ok()?;
    let high = high.trim().parse().ok()?;
    Band::new(low, high).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    /// Alerts only go through the log facade.
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Redraw a one-line status readout after every frame.
    pub status_line: bool,
    /// Port for the HTTP status bridge on 127.0.0.1.
    pub serve: Option<u16>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            status_line: false,
            serve: None,
        }
    }
}

/// Everything the scanner needs, loadable from YAML with every section optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub sweep: SweepConfig,
    pub detector: DetectorConfig,
    pub device: DeviceSettings,
    pub scenario: ScenarioConfig,
    pub output: OutputConfig,
    /// Stop after this many capture attempts.
    pub max_frames: Option<u64>,
    pub duration_secs: Option<f64>,
}

impl ScannerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scanner config {}", path_ref.display()))?;
        let config: ScannerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scanner config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Falls back to every preset band when none were configured.
    pub fn ensure_bands(&mut self) {
        if self.sweep.bands.is_empty() {
            self.sweep.bands = BandPreset::All.bands();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn presets_cover_expected_bands() {
        assert_eq!(BandPreset::Fpv.bands(), vec![Band::new(5650, 5920).unwrap()]);
        assert_eq!(
            BandPreset::Dji.bands(),
            vec![
                Band::new(2400, 2483).unwrap(),
                Band::new(5725, 5850).unwrap()
            ]
        );
        assert_eq!(BandPreset::All.bands().len(), 3);
    }

    #[test]
    fn band_list_skips_malformed_chunks() {
        let bands = parse_band_list("5738:5758, nonsense ,5900:5645,5645:5900,").unwrap();
        assert_eq!(
            bands,
            vec![
                Band::new(5738, 5758).unwrap(),
                Band::new(5645, 5900).unwrap()
            ]
        );
        assert_eq!(parse_band_list("foo,1:1"), Err(ConfigError::EmptyBands));
        assert_eq!(parse_band_list(""), Err(ConfigError::EmptyBands));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"sweep:\n  fft_size: 1024\n  bands:\n    - {low_mhz: 2400, high_mhz: 2483}\ndetector:\n  hot_delta_db: 5.0\nmax_frames: 40\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ScannerConfig::load(&path).unwrap();
        assert_eq!(cfg.sweep.fft_size, 1024);
        assert_eq!(cfg.sweep.averaging_frame_count, 2);
        assert_eq!(cfg.sweep.bands.len(), 1);
        assert_eq!(cfg.detector.hot_delta_db, 5.0);
        assert_eq!(cfg.detector.persist_hits, 2);
        assert_eq!(cfg.max_frames, Some(40));
        assert_eq!(cfg.output.format, OutputFormat::Text);
    }

    #[test]
    fn missing_bands_fall_back_to_all_presets() {
        let mut cfg = ScannerConfig::default();
        cfg.ensure_bands();
        assert_eq!(cfg.sweep.bands, BandPreset::All.bands());
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = ScannerConfig::load("/nonexistent/scanner.yaml").unwrap_err();
        assert!(err.to_string().contains("reading scanner config"));
    }
}
