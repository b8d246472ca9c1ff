use serde::{Deserialize, Serialize};

use crate::interface::frame::Frame;

/// Parameters for a single PSD capture at one tuning center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub center_hz: u64,
    pub frame_duration_ms: u32,
    pub fft_size: usize,
    pub overlap_fraction: f64,
}

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The provider produced no data for this frame.
    #[error("capture unavailable: {0}")]
    Unavailable(String),
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("device failure: {0}")]
    Device(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Source of PSD frames. Failures are per-frame and never end the sweep.
pub trait CaptureProvider {
    fn tune(&mut self, center_hz: u64) -> CaptureResult<()>;
    fn capture(&mut self, request: &CaptureRequest) -> CaptureResult<Frame>;
}

impl<P: CaptureProvider + ?Sized> CaptureProvider for Box<P> {
    fn tune(&mut self, center_hz: u64) -> CaptureResult<()> {
        (**self).tune(center_hz)
    }

    fn capture(&mut self, request: &CaptureRequest) -> CaptureResult<Frame> {
        (**self).capture(request)
    }
}

impl<P: CaptureProvider + ?Sized> CaptureProvider for &mut P {
    fn tune(&mut self, center_hz: u64) -> CaptureResult<()> {
        (**self).tune(center_hz)
    }

    fn capture(&mut self, request: &CaptureRequest) -> CaptureResult<Frame> {
        (**self).capture(request)
    }
}
