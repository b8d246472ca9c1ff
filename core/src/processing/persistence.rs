use std::collections::{HashMap, VecDeque};

use crate::interface::SweepKey;
use crate::processing::region::Region;

/// Minimum fractional overlap for two intervals to count as the same emitter.
pub const MIN_OVERLAP_FRACTION: f64 = 0.5;

type Interval = (f64, f64);

/// Intersection length over the shorter interval's length; zero when disjoint.
pub fn overlap_fraction(a: Interval, b: Interval) -> f64 {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if hi <= lo {
        return 0.0;
    }
    let shorter = (a.1 - a.0).min(b.1 - b.0);
    if shorter > 0.0 {
        (hi - lo) / shorter
    } else {
        0.0
    }
}

/// Cross-pass recurrence filter keyed by sweep position.
///
/// Each key keeps the accepted intervals of its last `window` passes. A region
/// persists once the current pass plus the historical passes holding an
/// overlapping interval reach `hits_required`.
#[derive(Debug, Clone)]
pub struct PersistenceTracker {
    hits_required: usize,
    window: usize,
    history: HashMap<SweepKey, VecDeque<Vec<Interval>>>,
}

impl PersistenceTracker {
    pub fn new(hits_required: usize, window: usize) -> Self {
        Self {
            hits_required,
            window: window.max(1),
            history: HashMap::new(),
        }
    }

    /// Returns the persistent subset of `accepted`, then records this pass.
    pub fn evaluate(&mut self, key: &SweepKey, accepted: &[Region]) -> Vec<Region> {
        let window = self.window;
        let hits_required = self.hits_required;
        let passes = self
            .history
            .entry(*key)
            .or_insert_with(|| VecDeque::with_capacity(window));

        let persistent = accepted
            .iter()
            .filter(|region| {
                let current = region.interval_mhz();
                let recurrences = passes
                    .iter()
                    .filter(|past| {
                        past.iter()
                            .any(|&interval| overlap_fraction(current, interval) >= MIN_OVERLAP_FRACTION)
                    })
                    .count();
                1 + recurrences >= hits_required
            })
            .cloned()
            .collect();

        if passes.len() == window {
            passes.pop_front();
        }
        passes.push_back(accepted.iter().map(Region::interval_mhz).collect());
        persistent
    }

    pub fn history_len(&self, key: &SweepKey) -> usize {
        self.history.get(key).map_or(0, VecDeque::len)
    }

    pub fn tracked_keys(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::Band;

    fn key(center_hz: u64) -> SweepKey {
        SweepKey::new(Band::new(2400, 2483).unwrap(), center_hz)
    }

    fn region(low_mhz: f64, high_mhz: f64) -> Region {
        Region {
            start_bin: 0,
            end_bin: 1,
            center_mhz: (low_mhz + high_mhz) / 2.0,
            width_mhz: high_mhz - low_mhz,
            mean_excess_db: 10.0,
            peak_excess_db: 14.0,
            low_mhz,
            high_mhz,
        }
    }

    #[test]
    fn overlap_uses_shorter_interval() {
        assert_eq!(overlap_fraction((0.0, 10.0), (5.0, 7.0)), 1.0);
        assert_eq!(overlap_fraction((0.0, 10.0), (5.0, 15.0)), 0.5);
        assert_eq!(overlap_fraction((0.0, 10.0), (10.0, 20.0)), 0.0);
        assert_eq!(overlap_fraction((3.0, 3.0), (0.0, 10.0)), 0.0);
    }

    #[test]
    fn recurring_region_fires_on_second_pass() {
        let mut tracker = PersistenceTracker::new(2, 5);
        let k = key(2_410_000_000);
        assert!(tracker.evaluate(&k, &[region(2430.0, 2450.0)]).is_empty());
        let fired = tracker.evaluate(&k, &[region(2433.0, 2452.0)]);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].low_mhz, 2433.0);
    }

    #[test]
    fn one_off_region_never_fires() {
        let mut tracker = PersistenceTracker::new(2, 5);
        let k = key(2_410_000_000);
        assert!(tracker.evaluate(&k, &[region(2430.0, 2450.0)]).is_empty());
        for _ in 0..6 {
            assert!(tracker.evaluate(&k, &[]).is_empty());
        }
        assert!(tracker.evaluate(&k, &[region(2460.0, 2475.0)]).is_empty());
    }

    #[test]
    fn history_is_keyed_by_sweep_position() {
        let mut tracker = PersistenceTracker::new(2, 5);
        assert!(tracker.evaluate(&key(1), &[region(2430.0, 2450.0)]).is_empty());
        assert!(tracker.evaluate(&key(2), &[region(2430.0, 2450.0)]).is_empty());
        assert_eq!(tracker.tracked_keys(), 2);
    }

    #[test]
    fn history_is_bounded_and_evicts_oldest() {
        let mut tracker = PersistenceTracker::new(2, 3);
        let k = key(7);
        tracker.evaluate(&k, &[region(2430.0, 2450.0)]);
        for _ in 0..3 {
            tracker.evaluate(&k, &[]);
        }
        assert_eq!(tracker.history_len(&k), 3);
        assert!(tracker.evaluate(&k, &[region(2430.0, 2450.0)]).is_empty());
    }

    #[test]
    fn each_past_pass_counts_once() {
        let mut tracker = PersistenceTracker::new(3, 5);
        let k = key(9);
        tracker.evaluate(&k, &[region(2430.0, 2450.0), region(2432.0, 2452.0)]);
        assert!(tracker.evaluate(&k, &[region(2431.0, 2451.0)]).is_empty());
        assert_eq!(tracker.evaluate(&k, &[region(2431.0, 2451.0)]).len(), 1);
    }
}
