//! # Decimator (Glitch)
//!
//! Sample-rate reduction by zero-order hold: capture one input sample, then
//! repeat it for a random number of output samples before capturing again.
//! The hold length is redrawn on every capture from `[1, max_hold]`, where
//! `max_hold` grows linearly with the amount (1 at 0.0, 100 at 1.0). Random
//! hold lengths make the "staircase" irregular, which is what gives the stage
//! its stuttering character instead of a steady lower sample rate.
//!
//! The hold state survives bypass: turning the amount down and back up again
//! resumes the hold that was in progress.

use rand::Rng;

use super::{is_bypassed, map_linear};

/// Per-channel hold state. One instance per channel, owned by the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelHoldState {
    /// The most recently captured input sample.
    held_sample: f32,

    /// Output samples left before the next capture. Zero or less means
    /// "capture on the next sample".
    samples_remaining: i32,
}

impl ChannelHoldState {
    pub fn held_sample(&self) -> f32 {
        self.held_sample
    }

    pub fn samples_remaining(&self) -> i32 {
        self.samples_remaining
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Longest hold, in samples, for a given amount.
#[inline]
pub fn max_hold_samples(amount: f32) -> u32 {
    (map_linear(amount, 1.0, 100.0) as u32).max(1)
}

/// Run one sample through the decimator.
pub fn decimate<R: Rng + ?Sized>(
    input: f32,
    amount: f32,
    state: &mut ChannelHoldState,
    rng: &mut R,
) -> f32 {
    if is_bypassed(amount) {
        return input;
    }

    if state.samples_remaining <= 0 {
        state.held_sample = input;
        state.samples_remaining = rng.random_range(1..=max_hold_samples(amount)) as i32;
    }

    state.samples_remaining -= 1;
    state.held_sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_max_hold_mapping() {
        assert_eq!(max_hold_samples(0.0), 1);
        assert_eq!(max_hold_samples(0.5), 50);
        assert_eq!(max_hold_samples(1.0), 100);
    }

    /// Bypassed: the input passes through and the state is left alone.
    #[test]
    fn test_bypass_is_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut state = ChannelHoldState::default();

        for i in 0..64 {
            let input = (i as f32 * 0.37).sin();
            assert_eq!(decimate(input, 0.01, &mut state, &mut rng), input);
        }
        assert_eq!(state, ChannelHoldState::default());
    }

    /// Distinct inputs make every capture visible, so runs of equal output
    /// samples are exactly the drawn hold lengths.
    #[test]
    fn test_hold_runs_are_bounded() {
        for (seed, amount) in [(7, 0.02), (8, 0.3), (9, 0.5), (10, 1.0)] {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut state = ChannelHoldState::default();
            let max_hold = max_hold_samples(amount) as usize;

            let output: Vec<f32> = (0..10_000)
                .map(|i| decimate(i as f32, amount, &mut state, &mut rng))
                .collect();

            let mut run = 1;
            for pair in output.windows(2) {
                if pair[0] == pair[1] {
                    run += 1;
                } else {
                    assert!(run >= 1 && run <= max_hold, "run of {run} > {max_hold}");
                    run = 1;
                }
            }
            assert!(run <= max_hold);
        }
    }

    /// The first active sample is always captured.
    #[test]
    fn test_first_sample_is_captured() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut state = ChannelHoldState::default();

        let out = decimate(0.42, 1.0, &mut state, &mut rng);
        assert_eq!(out, 0.42);
        assert_eq!(state.held_sample(), 0.42);
        assert!((0..100).contains(&state.samples_remaining()));
    }

    /// A hold interrupted by bypass resumes where it left off.
    #[test]
    fn test_hold_resumes_after_bypass() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut state = ChannelHoldState::default();

        decimate(0.9, 1.0, &mut state, &mut rng);
        let remaining = state.samples_remaining();
        if remaining == 0 {
            // Drew a 1-sample hold; nothing to resume.
            return;
        }

        decimate(-0.5, 0.0, &mut state, &mut rng);
        assert_eq!(state.samples_remaining(), remaining);

        let out = decimate(-0.5, 1.0, &mut state, &mut rng);
        assert_eq!(out, 0.9);
        assert_eq!(state.samples_remaining(), remaining - 1);
    }
}
