use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::generator::profile::{EmitterKind, EmitterProfile, ScenarioConfig};

/// Canned RF environments for the synthetic receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioTemplate {
    /// Noise only.
    Quiet,
    /// A DJI-style OFDM downlink in 2.4 GHz and an intermittent one in 5.8 GHz.
    Dji,
    /// Two analog FPV video channels.
    Fpv,
    /// Everything above plus a floor rise after a few hundred frames.
    Mixed,
}

fn emitter(
    name: &str,
    kind: EmitterKind,
    center_mhz: f64,
    bandwidth_mhz: f64,
    snr_db: f64,
    duty_cycle: f64,
) -> EmitterProfile {
    EmitterProfile {
        name: Some(name.to_string()),
        kind,
        center_mhz,
        bandwidth_mhz,
        snr_db,
        duty_cycle,
    }
}

fn dji_emitters() -> Vec<EmitterProfile> {
    vec![
        emitter("ocusync-2g4", EmitterKind::Ofdm, 2441.0, 18.0, 14.0, 1.0),
        emitter("ocusync-5g8", EmitterKind::Ofdm, 5787.0, 10.0, 12.0, 0.7),
    ]
}

fn fpv_emitters() -> Vec<EmitterProfile> {
    vec![
        emitter("raceband-r7", EmitterKind::AnalogVideo, 5880.0, 8.0, 22.0, 1.0),
        emitter("fatshark-f4", EmitterKind::AnalogVideo, 5800.0, 7.0, 18.0, 0.8),
    ]
}

impl ScenarioTemplate {
    pub fn build(self) -> ScenarioConfig {
        let base = ScenarioConfig::default();
        match self {
            ScenarioTemplate::Quiet => base,
            ScenarioTemplate::Dji => ScenarioConfig {
                emitters: dji_emitters(),
                ..base
            },
            ScenarioTemplate::Fpv => ScenarioConfig {
                emitters: fpv_emitters(),
                ..base
            },
            ScenarioTemplate::Mixed => {
                let mut emitters = dji_emitters();
                emitters.extend(fpv_emitters());
                ScenarioConfig {
                    emitters,
                    dropout_probability: 0.02,
                    floor_rise_db: 12.0,
                    floor_rise_after_frames: Some(300),
                    ..base
                }
            }
        }
    }
}
