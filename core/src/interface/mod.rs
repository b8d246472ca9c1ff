pub mod alert;
pub mod capture;
pub mod frame;

pub use alert::{Alert, AlertDetail, AlertSink, SignalLabel, SweepStatus};
pub use capture::{CaptureError, CaptureProvider, CaptureRequest, CaptureResult};
pub use frame::{Band, Frame, SweepKey};
