//! Tests for lattice rounding and channel quantization

#[cfg(test)]
mod tests {
    use poissonblend::math::interpolation::{
        lerp_lattice, quantize_channel, round_half_up, round_to_lattice,
    };

    // Tests ties round towards positive infinity
    // Verified by switching to f64::round
    #[test]
    fn test_round_half_up_ties() {
        assert!((round_half_up(2.5) - 3.0).abs() < f64::EPSILON);
        assert!((round_half_up(-2.5) - -2.0).abs() < f64::EPSILON);
        assert!((round_half_up(-0.5) - 0.0).abs() < f64::EPSILON);
        assert!((round_half_up(1.49) - 1.0).abs() < f64::EPSILON);
    }

    // Tests lattice rounding saturates outside the i32 range
    // Verified by wrapping through an `as` cast
    #[test]
    fn test_round_to_lattice_saturates() {
        assert_eq!(round_to_lattice(3.5), 4);
        assert_eq!(round_to_lattice(1e12), i32::MAX);
        assert_eq!(round_to_lattice(-1e12), i32::MIN);
    }

    // Tests interpolation endpoints and midpoint
    // Verified by dropping the start offset
    #[test]
    fn test_lerp_lattice_positions() {
        assert_eq!(lerp_lattice([4, 6], [6, -3], 0, 3), [4, 6]);
        assert_eq!(lerp_lattice([4, 6], [6, -3], 1, 3), [6, 5]);
        assert_eq!(lerp_lattice([4, 6], [6, -3], 3, 3), [10, 3]);
        assert_eq!(lerp_lattice([1, 1], [5, 5], 2, 0), [1, 1]);
    }

    // Tests quantization rounds, clamps and maps NaN to zero
    // Verified by truncating instead of rounding
    #[test]
    fn test_quantize_channel() {
        assert_eq!(quantize_channel(127.5), 128);
        assert_eq!(quantize_channel(127.49), 127);
        assert_eq!(quantize_channel(-20.0), 0);
        assert_eq!(quantize_channel(300.0), 255);
        assert_eq!(quantize_channel(f64::INFINITY), 255);
        assert_eq!(quantize_channel(f64::NAN), 0);
    }
}
