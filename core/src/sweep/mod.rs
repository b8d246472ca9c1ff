pub mod plan;
pub mod scheduler;

pub use plan::{centers_for_band, plan_sweep, BandPlan};
pub use scheduler::{CancelToken, SweepConfig, SweepScheduler};
