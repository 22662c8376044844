//! # Feedback Delay (Neuronic)
//!
//! A short echo, from 1 sample up to the full delay line (100 ms), mixed in
//! at no more than 50% wet:
//!
//! ```text
//! delayed = line[offset - delay]
//! y       = x * (1 - 0.5 * amount) + delayed * (0.5 * amount)
//! line[offset] = y + 0.5 * delayed
//! ```
//!
//! The value written back already contains the wet mix, plus another half of
//! the delayed sample on top. Per trip around the loop a delayed sample is
//! therefore scaled by `0.5 + 0.5 * amount`; at amount 1.0 the echoes never
//! decay.

use super::delay_line::DelayTap;
use super::{is_bypassed, map_linear};

/// Largest share of the delayed signal in the output.
pub const MAX_WET: f32 = 0.5;

/// Share of the delayed sample fed back on top of the output.
pub const FEEDBACK: f32 = 0.5;

/// Delay length in samples, or `None` when the stage is bypassed.
///
/// Also `None` for a zero-capacity line so callers never form an index
/// modulo zero. Active delays are in `[1, capacity]`.
pub fn delay_in_samples(amount: f32, capacity: usize) -> Option<usize> {
    if is_bypassed(amount) || capacity == 0 {
        return None;
    }

    // 1 sample at amount 0, the full line at amount 1. The clamp only bites
    // for amounts outside [0, 1], and guarantees the read index can always
    // be formed without underflow.
    let delay = map_linear(amount, 1.0, capacity as f32) as usize;
    Some(delay.clamp(1, capacity))
}

/// Run one sample through the delay for the sample at `offset` within the
/// current host buffer. `delay` comes from [`delay_in_samples`].
#[inline]
pub fn process(
    input: f32,
    amount: f32,
    delay: usize,
    tap: &mut DelayTap<'_>,
    offset: usize,
) -> f32 {
    // Step 1: READ the sample from `delay` samples ago. This has to happen
    // before the write: at the full-length delay both land on the same slot.
    let delayed = tap.read(offset, delay);

    // Step 2: MIX. The wet share tops out at 50%, so even at full amount
    // the dry signal stays as loud as the echo.
    let wet = MAX_WET * amount;
    let output = input * (1.0 - wet) + delayed * wet;

    // Step 3: WRITE the mixed output back, with another half of the
    // delayed sample on top. That extra term is the feedback: it is what
    // makes the echo repeat instead of sounding once.
    tap.write(offset, output + FEEDBACK * delayed);

    output
}

/// How long the delay keeps ringing after the input goes silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// Bypassed: no tail at all.
    None,
    /// Samples until the echoes have dropped by 60 dB.
    Samples(u32),
    /// The loop gain is 1 or more and the echoes never die out.
    Infinite,
}

/// Tail length for an amount and delay line capacity.
///
/// Each trip around the loop scales the echo by `g = 0.5 + 0.5 * amount`;
/// reaching -60 dB takes `log(0.001) / log(g) = -3 / log10(g)` trips of
/// `delay` samples each.
pub fn tail(amount: f32, capacity: usize) -> Tail {
    let Some(delay) = delay_in_samples(amount, capacity) else {
        return Tail::None;
    };

    let loop_gain = FEEDBACK + MAX_WET * amount;
    if loop_gain >= 0.999 {
        return Tail::Infinite;
    }

    let repeats = -3.0 / loop_gain.log10();
    Tail::Samples((repeats * delay as f32).ceil() as u32)
}
