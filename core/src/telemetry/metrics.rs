use std::sync::Mutex;

/// Sweep counters, shareable with a status reader on another thread.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub frames_captured: u64,
    pub frames_skipped: u64,
    pub detection_passes: u64,
    pub alerts_emitted: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Metrics)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_captured(&self) {
        self.update(|m| m.frames_captured += 1);
    }

    pub fn record_skipped(&self) {
        self.update(|m| m.frames_skipped += 1);
    }

    pub fn record_pass(&self) {
        self.update(|m| m.detection_passes += 1);
    }

    pub fn record_alerts(&self, count: usize) {
        self.update(|m| m.alerts_emitted += count as u64);
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_captured();
        metrics.record_captured();
        metrics.record_skipped();
        metrics.record_pass();
        metrics.record_alerts(3);
        assert_eq!(
            metrics.snapshot(),
            Metrics {
                frames_captured: 2,
                frames_skipped: 1,
                detection_passes: 1,
                alerts_emitted: 3,
            }
        );
    }
}
