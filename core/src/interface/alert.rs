use serde::{Deserialize, Serialize};
use std::fmt;

use crate::interface::frame::Band;

/// Coarse archetype assigned by the signal classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalLabel {
    FpvAnalog,
    DjiOfdm,
    Unclassified,
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SignalLabel::FpvAnalog => "FPV analog",
            SignalLabel::DjiOfdm => "DJI-style OFDM",
            SignalLabel::Unclassified => "unclassified signal",
        };
        f.write_str(text)
    }
}

/// What the alerting path measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AlertDetail {
    /// Persistent region from the averaged-frame path.
    Plateau {
        center_mhz: f64,
        width_mhz: f64,
        mean_excess_db: f64,
        peak_excess_db: f64,
    },
    /// Floor rise with a region estimated around the raw-frame peak.
    FloorPeak {
        peak_mhz: f64,
        peak_db: f64,
        width_mhz: f64,
    },
    /// Floor rise where no region could be estimated.
    FloorOnly { floor_db: f64, rise_db: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub label: SignalLabel,
    pub detail: AlertDetail,
}

impl Alert {
    pub fn new(timestamp: f64, label: SignalLabel, detail: AlertDetail) -> Self {
        Self {
            timestamp,
            label,
            detail,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            AlertDetail::Plateau {
                center_mhz,
                width_mhz,
                mean_excess_db,
                peak_excess_db,
            } => write!(
                f,
                "[ALERT] {} @ {:.3} MHz  ~{:.1} MHz  (mean +{:.1} dB, peak +{:.1} dB)",
                self.label, center_mhz, width_mhz, mean_excess_db, peak_excess_db
            ),
            AlertDetail::FloorPeak {
                peak_mhz,
                peak_db,
                width_mhz,
            } => write!(
                f,
                "[ALERT] {} @ {:.3} MHz  Peak {:.1} dB  ~{:.1} MHz",
                self.label, peak_mhz, peak_db, width_mhz
            ),
            AlertDetail::FloorOnly { floor_db, rise_db } => write!(
                f,
                "[ALERT] {}: floor {:.1} dB (+{:.1} dB)",
                self.label, floor_db, rise_db
            ),
        }
    }
}

/// Live per-frame readings handed to sinks that render a status view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepStatus {
    pub band: Band,
    pub center_mhz: f64,
    pub slice_mhz: (f64, f64),
    pub floor_db: f64,
    pub peak_db: f64,
    pub min_floor_db: Option<f64>,
    pub frames_captured: u64,
    pub frames_skipped: u64,
}

/// Destination for alerts. The sweep emits to whichever sink it was given.
pub trait AlertSink {
    fn emit(&mut self, alert: &Alert);

    fn status(&mut self, _status: &SweepStatus) {}
}

impl AlertSink for Vec<Alert> {
    fn emit(&mut self, alert: &Alert) {
        self.push(alert.clone());
    }
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn emit(&mut self, alert: &Alert) {
        (**self).emit(alert);
    }

    fn status(&mut self, status: &SweepStatus) {
        (**self).status(status);
    }
}

impl<S: AlertSink + ?Sized> AlertSink for &mut S {
    fn emit(&mut self, alert: &Alert) {
        (**self).emit(alert);
    }

    fn status(&mut self, status: &SweepStatus) {
        (**self).status(status);
    }
}
