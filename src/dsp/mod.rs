//! # DSP (Digital Signal Processing) Core
//!
//! Four lo-fi stages run in series on every sample, in this fixed order:
//!
//! - **`decimator`** (Glitch): holds a captured sample for a random number
//!   of output samples, lowering the effective sample rate.
//! - **`quantizer`** (Corruption): a stateless bit crusher.
//! - **`tremolo`** (Malware): amplitude modulation whose rate is re-randomized
//!   on every sample.
//! - **`feedback_delay`** (Neuronic): a short echo that writes its own output
//!   back into the **`delay_line`**.
//!
//! **`chain`** owns all of the state above and sequences the stages.

pub mod chain;
pub mod decimator;
pub mod delay_line;
pub mod feedback_delay;
pub mod quantizer;
pub mod tremolo;

/// Amounts at or below this value bypass a stage entirely.
pub const BYPASS_THRESHOLD: f32 = 0.01;

#[inline]
pub fn is_bypassed(amount: f32) -> bool {
    amount <= BYPASS_THRESHOLD
}

/// Maps a `[0, 1]` control value linearly onto `[out_min, out_max]`.
///
/// `out_max` may be smaller than `out_min`, which inverts the mapping (the
/// quantizer uses this to go from 16 bits down to 2). Values outside `[0, 1]`
/// extrapolate; nothing is clamped here.
#[inline]
pub fn map_linear(value: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + value * (out_max - out_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_threshold_is_inclusive() {
        assert!(is_bypassed(0.0));
        assert!(is_bypassed(0.01));
        assert!(!is_bypassed(0.0101));
        assert!(!is_bypassed(1.0));
    }

    #[test]
    fn test_map_linear_endpoints() {
        assert!((map_linear(0.0, 1.0, 100.0) - 1.0).abs() < 1e-6);
        assert!((map_linear(1.0, 1.0, 100.0) - 100.0).abs() < 1e-6);
        assert!((map_linear(0.5, 16.0, 2.0) - 9.0).abs() < 1e-6);
    }
}
