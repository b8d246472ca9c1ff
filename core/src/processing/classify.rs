use crate::interface::SignalLabel;

/// Analog FPV video channel plan, 5.8 GHz.
pub const FPV_ANALOG_MHZ: (f64, f64) = (5650.0, 5920.0);
/// Wideband digital links at 2.4 GHz and 5.8 GHz.
pub const DJI_OFDM_MHZ: [(f64, f64); 2] = [(2400.0, 2483.0), (5725.0, 5850.0)];
/// Width at which both rules apply; kept inclusive on both sides.
pub const WIDTH_SPLIT_MHZ: f64 = 10.0;

fn within((low, high): (f64, f64), freq_mhz: f64) -> bool {
    low <= freq_mhz && freq_mhz <= high
}

/// Labels a signal by its width and where it sits, not by the band being swept.
pub struct SignalClassifier;

impl SignalClassifier {
    pub fn classify(freq_mhz: f64, width_mhz: f64) -> SignalLabel {
        if width_mhz <= WIDTH_SPLIT_MHZ && within(FPV_ANALOG_MHZ, freq_mhz) {
            return SignalLabel::FpvAnalog;
        }
        if width_mhz >= WIDTH_SPLIT_MHZ
            && DJI_OFDM_MHZ.iter().any(|&range| within(range, freq_mhz))
        {
            return SignalLabel::DjiOfdm;
        }
        SignalLabel::Unclassified
    }
}
