//! Threshold flags.

use crate::table::Series;

/// Flag every value strictly greater than `threshold` with 1, everything else
/// (including NaN) with 0. The result carries the input's index.
pub fn derive_flag(amplitude: &Series<f64>, threshold: f64) -> Series<u8> {
    amplitude.map(|&v| u8::from(v > threshold))
}

/// Number of flagged rows.
pub fn count_flagged(flag: &Series<u8>) -> usize {
    flag.values().iter().filter(|&&v| v == 1).count()
}
