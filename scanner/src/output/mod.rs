use chrono::{Local, TimeZone};
use dronecore::interface::{Alert, AlertSink, SweepStatus};
use serde::Serialize;
use std::io::Write;

fn clock(timestamp: f64) -> String {
    let secs = timestamp.floor() as i64;
    let nanos = ((timestamp - timestamp.floor()) * 1e9) as u32;
    match Local.timestamp_opt(secs, nanos).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// Human-readable alert stream with an optional single-line status readout.
pub struct StreamSink<W: Write> {
    out: W,
    status_line: bool,
    status_pending: bool,
}

impl<W: Write> StreamSink<W> {
    pub fn new(out: W, status_line: bool) -> Self {
        Self {
            out,
            status_line,
            status_pending: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(err) = self.out.write_fmt(text).and_then(|_| self.out.flush()) {
            log::warn!("alert output failed: {}", err);
        }
    }
}

impl<W: Write> AlertSink for StreamSink<W> {
    fn emit(&mut self, alert: &Alert) {
        if self.status_pending {
            self.write(format_args!("\n"));
            self.status_pending = false;
        }
        let stamp = clock(alert.timestamp);
        self.write(format_args!("{}  {}\n", stamp, alert));
    }

    fn status(&mut self, status: &SweepStatus) {
        if !self.status_line {
            return;
        }
        let min_floor = status
            .min_floor_db
            .map(|db| format!("{:.1}", db))
            .unwrap_or_else(|| "-".to_string());
        self.write(format_args!(
            "\r{} | center {:.1} MHz ({:.1}-{:.1}) | floor {:.1} dB (min {}) | peak {:.1} dB | frames {} (skipped {})   ",
            status.band,
            status.center_mhz,
            status.slice_mhz.0,
            status.slice_mhz.1,
            status.floor_db,
            min_floor,
            status.peak_db,
            status.frames_captured,
            status.frames_skipped
        ));
        self.status_pending = true;
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    time: String,
    #[serde(flatten)]
    alert: &'a Alert,
    message: String,
}

/// One JSON object per alert, for downstream tooling.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AlertSink for JsonLinesSink<W> {
    fn emit(&mut self, alert: &Alert) {
        let record = JsonRecord {
            time: clock(alert.timestamp),
            alert,
            message: alert.to_string(),
        };
        let written = serde_json::to_writer(&mut self.out, &record)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(err) = written {
            log::warn!("json alert output failed: {}", err);
        }
    }
}

/// Fans every alert and status update out to each configured sink.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn AlertSink + Send>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn AlertSink + Send>) {
        self.sinks.push(sink);
    }
}

impl AlertSink for SinkSet {
    fn emit(&mut self, alert: &Alert) {
        for sink in &mut self.sinks {
            sink.emit(alert);
        }
    }

    fn status(&mut self, status: &SweepStatus) {
        for sink in &mut self.sinks {
            sink.status(status);
        }
    }
}
