pub mod fft;
pub mod stats;

pub use fft::WelchEstimator;
pub use stats::StatsHelper;
