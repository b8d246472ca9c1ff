//! Detection core for the drone RF sweep platform.
//!
//! Frames captured across configured bands are checked twice: averaged
//! frames go through baseline estimation, hot-region extraction, a shape
//! gate and cross-pass persistence; raw frames feed a floor-rise monitor.
//! Both paths label what they find by spectral width and carrier frequency.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod sweep;
pub mod telemetry;

pub use interface::{Alert, AlertSink, CaptureProvider, Frame};
pub use prelude::{DetectorConfig, ProcessingStage, StageInput, StageOutput};
pub use sweep::{CancelToken, SweepConfig, SweepScheduler};
