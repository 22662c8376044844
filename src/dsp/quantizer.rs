//! # Quantizer (Corruption)
//!
//! A bit crusher: the amplitude axis is cut into `2^bits` steps per unit and
//! every sample is floored onto a step.
//!
//! ```text
//! bits  = 16 - 14 * amount        (16 bits at 0.0, 2 bits at 1.0)
//! steps = 2^bits
//! y     = floor(x * steps) / steps
//! ```
//!
//! `floor` rounds toward negative infinity, so a small negative input lands
//! one full step below zero while a small positive one lands on zero. That
//! asymmetry is part of the sound and is kept.
//!
//! Unlike the other three stages, this one has no state.

use super::{is_bypassed, map_linear};

/// Effective bit depth for an amount. Fractional depths are allowed.
#[inline]
pub fn bit_depth(amount: f32) -> f32 {
    map_linear(amount, 16.0, 2.0)
}

#[inline]
pub fn quantize(input: f32, amount: f32) -> f32 {
    if is_bypassed(amount) {
        return input;
    }

    let steps = 2.0_f32.powf(bit_depth(amount));
    (input * steps).floor() / steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_is_identity() {
        for input in [-1.0, -0.333, 0.0, 0.1234567, 0.9, 1.0] {
            assert_eq!(quantize(input, 0.0), input);
            assert_eq!(quantize(input, 0.01), input);
        }
    }

    /// At full amount there are 4 levels per unit, negative inputs included.
    #[test]
    fn test_two_bit_table() {
        let table = [
            (0.9, 0.75),
            (0.75, 0.75),
            (0.74, 0.5),
            (0.3, 0.25),
            (0.1, 0.0),
            (0.0, 0.0),
            (-0.1, -0.25),
            (-0.25, -0.25),
            (-0.26, -0.5),
            (-0.9, -1.0),
            (1.0, 1.0),
        ];
        for (input, expected) in table {
            let out = quantize(input, 1.0);
            assert_eq!(out, expected, "quantize({input}) = {out}, expected {expected}");
            assert_eq!(out.to_bits(), ((input * 4.0_f32).floor() / 4.0).to_bits());
        }
    }

    #[test]
    fn test_bit_depth_is_inverted() {
        assert!((bit_depth(0.0) - 16.0).abs() < 1e-6);
        assert!((bit_depth(1.0) - 2.0).abs() < 1e-6);
        assert!(bit_depth(0.25) > bit_depth(0.75));
    }

    /// The error never exceeds one step, and always rounds down.
    #[test]
    fn test_error_is_within_one_step() {
        let amount = 0.5;
        let step = 1.0 / 2.0_f32.powf(bit_depth(amount));
        for i in -100..=100 {
            let input = i as f32 / 97.0;
            let out = quantize(input, amount);
            assert!(out <= input);
            assert!(input - out < step + 1e-6);
        }
    }
}
