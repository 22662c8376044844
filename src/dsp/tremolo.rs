//! # Tremolo (Malware)
//!
//! Amplitude modulation by a sine oscillator whose rate is re-randomized on
//! every sample:
//!
//! ```text
//! freq      = (1 + 14 * amount) + rand[0, 1) * 10 * amount    Hz
//! modulator = 0.5 * sin(phase) + 0.5                          in [0, 1]
//! y         = x * (1 - amount) + x * modulator * amount
//! phase    += 2π * freq / sample_rate   (mod 2π)
//! ```
//!
//! The jitter is not smoothed, so the phase increment changes from one
//! sample to the next and the modulator is not a clean LFO. That instability
//! is the effect.
//!
//! There is one oscillator for the whole plugin. The chain asks it for one
//! modulator value per sample frame and applies that value to every channel.

use std::f32::consts::TAU;

use rand::Rng;

use super::{is_bypassed, map_linear};

/// Upper bound of the per-sample jitter at amount 1.0, in Hz.
pub const MAX_JITTER_HZ: f32 = 10.0;

/// Base modulation rate before jitter, 1 Hz to 15 Hz.
#[inline]
pub fn base_frequency(amount: f32) -> f32 {
    map_linear(amount, 1.0, 15.0)
}

/// The shared oscillator phase, in `[0, 2π)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TremoloPhase {
    phase: f32,
}

impl TremoloPhase {
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Modulator for the current sample frame, then advance the phase by a
    /// freshly jittered increment.
    ///
    /// Returns `None` (and leaves the phase alone) when bypassed.
    pub fn next_modulator<R: Rng + ?Sized>(
        &mut self,
        amount: f32,
        sample_rate: f32,
        rng: &mut R,
    ) -> Option<f32> {
        if is_bypassed(amount) {
            return None;
        }

        let jitter = rng.random::<f32>() * MAX_JITTER_HZ * amount;
        let frequency = base_frequency(amount) + jitter;

        let modulator = 0.5 * self.phase.sin() + 0.5;

        self.phase = (self.phase + TAU * frequency / sample_rate).rem_euclid(TAU);
        // `rem_euclid` can round up to exactly TAU.
        if self.phase >= TAU {
            self.phase = 0.0;
        }

        Some(modulator)
    }
}

/// Dry/wet crossfade between `input` and `input * modulator`.
#[inline]
pub fn apply(input: f32, amount: f32, modulator: f32) -> f32 {
    let dry = input;
    let wet = input * modulator;
    dry * (1.0 - amount) + wet * amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_bypass_does_not_advance_phase() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut phase = TremoloPhase::default();

        for _ in 0..32 {
            assert_eq!(phase.next_modulator(0.005, 48_000.0, &mut rng), None);
        }
        assert_eq!(phase.phase(), 0.0);
    }

    /// With phase 0 the modulator sits at its midpoint.
    #[test]
    fn test_first_sample_at_full_amount_halves_input() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut phase = TremoloPhase::default();

        let modulator = phase.next_modulator(1.0, 48_000.0, &mut rng).unwrap();
        assert!((modulator - 0.5).abs() < 1e-6);

        let out = apply(0.8, 1.0, modulator);
        assert!((out - 0.4).abs() < 1e-6, "Expected 0.4, got {out}");
        assert!(phase.phase() > 0.0);
    }

    #[test]
    fn test_phase_increment_is_within_jitter_range() {
        let sample_rate = 48_000.0;
        let amount = 0.6;
        let min_step = TAU * base_frequency(amount) / sample_rate;
        let max_step = TAU * (base_frequency(amount) + MAX_JITTER_HZ * amount) / sample_rate;

        let mut rng = SmallRng::seed_from_u64(3);
        let mut phase = TremoloPhase::default();
        for _ in 0..1000 {
            let before = phase.phase();
            phase.next_modulator(amount, sample_rate, &mut rng);
            let step = (phase.phase() - before).rem_euclid(TAU);
            assert!(step >= min_step - 1e-5 && step <= max_step + 1e-5, "step {step}");
        }
    }

    #[test]
    fn test_phase_stays_wrapped() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut phase = TremoloPhase::default();

        // A low sample rate makes every step large.
        for _ in 0..10_000 {
            let modulator = phase.next_modulator(1.0, 100.0, &mut rng).unwrap();
            assert!((0.0..=1.0).contains(&modulator));
            assert!((0.0..TAU).contains(&phase.phase()));
        }
    }

    #[test]
    fn test_apply_crossfade() {
        // Fully wet follows the modulator, half wet sits in between.
        assert!((apply(1.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
        assert!((apply(1.0, 0.5, 0.0) - 0.5).abs() < 1e-6);
        assert!((apply(-0.6, 0.5, 1.0) + 0.6).abs() < 1e-6);
    }
}
