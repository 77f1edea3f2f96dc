//! Rounding and linear interpolation on the integer pixel lattice
//!
//! Rounding is half-up (`floor(x + 0.5)`) everywhere, for border
//! densification as well as for channel quantization.

use num_traits::{ToPrimitive, clamp};

/// Round to the nearest integer, with ties going towards positive infinity
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round a real value to the nearest lattice coordinate
///
/// Values beyond the `i32` range saturate.
pub fn round_to_lattice(value: f64) -> i32 {
    let rounded = round_half_up(value);
    rounded
        .to_i32()
        .unwrap_or(if rounded < 0.0 { i32::MIN } else { i32::MAX })
}

/// Point at fraction `step / steps` along the segment from `start` by `delta`
///
/// A zero `steps` count returns `start` unchanged.
pub fn lerp_lattice(start: [i32; 2], delta: [i32; 2], step: usize, steps: usize) -> [i32; 2] {
    if steps == 0 {
        return start;
    }
    let fraction = step as f64 / steps as f64;
    [
        round_to_lattice(fraction * f64::from(delta[0])) + start[0],
        round_to_lattice(fraction * f64::from(delta[1])) + start[1],
    ]
}

/// Quantize a solver value to an 8-bit channel
///
/// Rounds half-up, then clamps to `[0, 255]`. Non-finite values map to the
/// nearest bound, NaN to zero.
pub fn quantize_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    clamp(round_half_up(value), 0.0, 255.0).to_u8().unwrap_or(0)
}
