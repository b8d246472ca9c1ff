use crate::prelude::DetectorConfig;
use crate::processing::region::Region;

pub const PLATEAU_WIDTH_MHZ: (f64, f64) = (10.0, 40.0);
pub const ANALOG_WIDTH_MHZ: (f64, f64) = (4.0, 12.0);

/// Which acceptance profile a region matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeProfile {
    WidePlateau,
    AnalogWidth,
}

/// Shape filter applied to every extracted region before persistence.
#[derive(Debug, Clone)]
pub struct AcceptanceGate {
    dji_mean_excess_db: f64,
    fpv_mean_excess_db: f64,
    fpv_peak_excess_db: f64,
}

impl AcceptanceGate {
    pub fn new(dji_mean_excess_db: f64, fpv_mean_excess_db: f64, fpv_peak_excess_db: f64) -> Self {
        Self {
            dji_mean_excess_db,
            fpv_mean_excess_db,
            fpv_peak_excess_db,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.dji_mean_excess_db,
            config.resolved_fpv_mean_excess_db(),
            config.fpv_peak_excess_db,
        )
    }

    pub fn profile(&self, region: &Region) -> Option<ShapeProfile> {
        let width = region.width_mhz;
        let plateau = (PLATEAU_WIDTH_MHZ.0..=PLATEAU_WIDTH_MHZ.1).contains(&width)
            && region.mean_excess_db >= self.dji_mean_excess_db;
        if plateau {
            return Some(ShapeProfile::WidePlateau);
        }
        let analog = (ANALOG_WIDTH_MHZ.0..=ANALOG_WIDTH_MHZ.1).contains(&width)
            && (region.peak_excess_db >= self.fpv_peak_excess_db
                || region.mean_excess_db >= self.fpv_mean_excess_db);
        analog.then_some(ShapeProfile::AnalogWidth)
    }

    pub fn accepts(&self, region: &Region) -> bool {
        self.profile(region).is_some()
    }

    pub fn filter(&self, regions: Vec<Region>) -> Vec<Region> {
        regions.into_iter().filter(|r| self.accepts(r)).collect()
    }
}

impl Default for AcceptanceGate {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}
