pub mod averager;
pub mod baseline;
pub mod classify;
pub mod floor;
pub mod gate;
pub mod persistence;
pub mod plateau;
pub mod region;

pub use averager::FrameAverager;
pub use baseline::{BaselineEstimator, BaselineOutput};
pub use classify::SignalClassifier;
pub use floor::FloorAlertMonitor;
pub use gate::{AcceptanceGate, ShapeProfile};
pub use persistence::PersistenceTracker;
pub use plateau::PlateauDetector;
pub use region::{PeakEstimate, Region, RegionExtractor};
