use crate::interface::Band;
use crate::prelude::ConfigError;

/// Tuning centers for one band, in sweep order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandPlan {
    pub band: Band,
    pub centers_hz: Vec<u64>,
}

/// Centers whose `[c - span/2, c + span/2]` slices cover `band` without gaps.
///
/// Consecutive centers are `span * step_overlap` apart; the last one is pulled
/// back to `high - span/2` so the slice ends on the band edge. A span that
/// already covers the band yields the band midpoint alone.
pub fn centers_for_band(band: &Band, span_hz: u64, step_overlap: f64) -> Vec<u64> {
    let (low, high) = (band.low_hz(), band.high_hz());
    if span_hz == 0 || high <= low {
        return Vec::new();
    }
    if span_hz >= high - low {
        return vec![band.midpoint_hz()];
    }
    let half = span_hz / 2;
    let step = ((span_hz as f64 * step_overlap) as u64).max(1);
    let mut centers: Vec<u64> = (low..=high - span_hz)
        .step_by(step as usize)
        .map(|start| start + half)
        .collect();
    if centers.last().is_some_and(|&last| last + half < high) {
        centers.push(high - half);
    }
    centers
}

/// Validates the band list and expands every band into its centers.
pub fn plan_sweep(
    bands: &[Band],
    span_hz: u64,
    step_overlap: f64,
) -> Result<Vec<BandPlan>, ConfigError> {
    if bands.is_empty() {
        return Err(ConfigError::EmptyBands);
    }
    bands
        .iter()
        .map(|band| {
            band.validate()?;
            let mut centers_hz = centers_for_band(band, span_hz, step_overlap);
            if centers_hz.is_empty() {
                centers_hz.push(band.midpoint_hz());
            }
            Ok(BandPlan {
                band: *band,
                centers_hz,
            })
        })
        .collect()
}
