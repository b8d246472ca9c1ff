use std::collections::VecDeque;

use crate::interface::{Alert, AlertDetail, SignalLabel};
use crate::math::stats::StatsHelper;
use crate::prelude::{
    DetectorConfig, ProcessingStage, StageError, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::processing::baseline::BaselineEstimator;
use crate::processing::classify::SignalClassifier;
use crate::processing::region::RegionExtractor;

/// Number of recent frames the floor monitor votes over.
pub const FLOOR_WINDOW: usize = 5;

/// Band-agnostic floor-rise alarm fed with raw, non-averaged frames.
///
/// Tracks the lowest median power seen this run. A frame is a hit when its
/// median sits `rise_db` above that minimum; once `persist_hits` of the last
/// [`FLOOR_WINDOW`] frames are hits the monitor fires and clears its window.
#[derive(Debug, Clone)]
pub struct FloorAlertMonitor {
    enabled: bool,
    rise_db: f64,
    persist_hits: usize,
    min_floor_db_seen: Option<f64>,
    hits: VecDeque<bool>,
    extractor: RegionExtractor,
}

impl FloorAlertMonitor {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            enabled: config.floor_alert_enabled,
            rise_db: config.floor_alert_rise_db,
            persist_hits: config.floor_persist_hits,
            min_floor_db_seen: None,
            hits: VecDeque::with_capacity(FLOOR_WINDOW),
            extractor: RegionExtractor::new(
                BaselineEstimator::from_config(config),
                config.hot_delta_db,
            ),
        }
    }

    pub fn min_floor_db(&self) -> Option<f64> {
        self.min_floor_db_seen
    }

    pub fn pending_hits(&self) -> usize {
        self.hits.iter().filter(|&&hit| hit).count()
    }

    /// Feeds one raw frame; returns an alert when the rise has persisted.
    pub fn observe(
        &mut self,
        frequencies_hz: &[f64],
        power_db: &[f64],
        timestamp: f64,
    ) -> Option<Alert> {
        let floor_db = StatsHelper::median(power_db)?;
        let min_floor = match self.min_floor_db_seen {
            Some(min) if min <= floor_db => min,
            _ => {
                self.min_floor_db_seen = Some(floor_db);
                floor_db
            }
        };
        if !self.enabled {
            return None;
        }

        if self.hits.len() == FLOOR_WINDOW {
            self.hits.pop_front();
        }
        self.hits.push_back(floor_db >= min_floor + self.rise_db);
        if self.pending_hits() < self.persist_hits {
            return None;
        }
        self.hits.clear();

        let alert = match self.extractor.extract_at_peak(frequencies_hz, power_db) {
            Some(estimate) => Alert::new(
                timestamp,
                SignalClassifier::classify(estimate.peak_mhz, estimate.region.width_mhz),
                AlertDetail::FloorPeak {
                    peak_mhz: estimate.peak_mhz,
                    peak_db: estimate.peak_db,
                    width_mhz: estimate.region.width_mhz,
                },
            ),
            None => Alert::new(
                timestamp,
                SignalLabel::Unclassified,
                AlertDetail::FloorOnly {
                    floor_db,
                    rise_db: floor_db - min_floor,
                },
            ),
        };
        Some(alert)
    }
}

impl Default for FloorAlertMonitor {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

impl ProcessingStage for FloorAlertMonitor {
    fn initialize(&mut self, config: &DetectorConfig) -> StageResult<()> {
        config
            .validate()
            .map_err(|err| StageError::InvalidInput(err.to_string()))?;
        *self = Self::new(config);
        Ok(())
    }

    fn execute(&mut self, input: StageInput<'_>) -> StageResult<StageOutput> {
        if input.power_db.is_empty() {
            return Err(StageError::InvalidInput("no power bins to monitor".into()));
        }
        let alerts: Vec<Alert> = self
            .observe(input.frequencies_hz, input.power_db, input.timestamp)
            .into_iter()
            .collect();
        let metadata = StageMetadata {
            candidate_count: self.pending_hits(),
            accepted_count: alerts.len(),
            notes: self
                .min_floor_db_seen
                .map(|min| vec![format!("min floor {:.1} dB", min)])
                .unwrap_or_default(),
        };
        Ok(StageOutput { alerts, metadata })
    }

    fn cleanup(&mut self) {
        self.hits.clear();
        self.min_floor_db_seen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize) -> Vec<f64> {
        (0..n).map(|i| (5780.0 + i as f64) * 1e6).collect()
    }

    /// Flat floor at `floor_db` with a narrow carrier near the middle.
    fn frame(floor_db: f64) -> Vec<f64> {
        (0..41)
            .map(|i| if (18..=22).contains(&i) { floor_db + 30.0 } else { floor_db })
            .collect()
    }

    #[test]
    fn fires_on_second_qualifying_frame_then_waits_for_refill() {
        let mut monitor = FloorAlertMonitor::default();
        let freqs = axis(41);
        assert!(monitor.observe(&freqs, &frame(-90.0), 0.0).is_none());

        let fired: Vec<bool> = (1..=5)
            .map(|ts| monitor.observe(&freqs, &frame(-79.0), ts as f64).is_some())
            .collect();
        assert_eq!(fired, vec![false, true, false, true, false]);
    }

    #[test]
    fn alert_is_classified_from_raw_peak() {
        let mut monitor = FloorAlertMonitor::default();
        let freqs = axis(41);
        monitor.observe(&freqs, &frame(-90.0), 0.0);
        monitor.observe(&freqs, &frame(-79.0), 1.0);
        let alert = monitor.observe(&freqs, &frame(-79.0), 2.0).unwrap();
        assert_eq!(alert.label, SignalLabel::FpvAnalog);
        match alert.detail {
            AlertDetail::FloorPeak { width_mhz, .. } => assert_eq!(width_mhz, 6.0),
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn degenerate_frame_produces_floor_only_alert() {
        let mut monitor = FloorAlertMonitor::default();
        let freqs = [5800e6, 5801e6];
        monitor.observe(&freqs, &[-90.0, -90.0], 0.0);
        monitor.observe(&freqs, &[-78.0, -78.0], 1.0);
        let alert = monitor.observe(&freqs, &[-78.0, -78.0], 2.0).unwrap();
        assert_eq!(alert.label, SignalLabel::Unclassified);
        assert_eq!(
            alert.detail,
            AlertDetail::FloorOnly {
                floor_db: -78.0,
                rise_db: 12.0
            }
        );
    }

    #[test]
    fn minimum_floor_never_increases() {
        let mut monitor = FloorAlertMonitor::default();
        let freqs = axis(41);
        let mut previous = f64::INFINITY;
        for floor in [-80.0, -85.0, -70.0, -88.0, -60.0] {
            monitor.observe(&freqs, &frame(floor), 0.0);
            let min = monitor.min_floor_db().unwrap();
            assert!(min <= previous);
            previous = min;
        }
        assert_eq!(previous, -88.0);
    }

    #[test]
    fn disabled_monitor_tracks_floor_but_never_fires() {
        let config = DetectorConfig {
            floor_alert_enabled: false,
            ..Default::default()
        };
        let mut monitor = FloorAlertMonitor::new(&config);
        let freqs = axis(41);
        monitor.observe(&freqs, &frame(-90.0), 0.0);
        for ts in 1..6 {
            assert!(monitor.observe(&freqs, &frame(-60.0), ts as f64).is_none());
        }
        assert_eq!(monitor.min_floor_db(), Some(-90.0));
    }
}
