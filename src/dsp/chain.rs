//! # Effect Chain
//!
//! Owns every piece of DSP state and runs the four stages in series:
//!
//! ```text
//! x ──► Decimator ──► Quantizer ──► Tremolo ──► Feedback Delay ──► y
//!       (per-channel   (stateless)   (shared       (per-channel
//!        hold state)                  phase)         delay line)
//! ```
//!
//! The chain is either `Unprepared` or `Prepared`. `prepare()` allocates the
//! delay line for a sample rate and channel count and zeroes all state;
//! `release()` frees it again. `process()` only touches audio in the
//! `Prepared` state, and never allocates.
//!
//! Parameters are read exactly once per call to `process()`. Buffers are
//! walked one sample frame at a time: the tremolo oscillator produces one
//! modulator per frame, which every channel then shares, so stereo channels
//! are modulated identically.

use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;
use rand::rngs::SmallRng;
use rand::Rng;
use thiserror::Error;

use super::decimator::{self, ChannelHoldState};
use super::delay_line::DelayLine;
use super::feedback_delay::{self, Tail};
use super::quantizer;
use super::tremolo::{self, TremoloPhase};

/// Mono or stereo.
pub const MAX_CHANNELS: usize = 2;

/// Longest echo the feedback delay can produce.
pub const MAX_DELAY_SECONDS: f32 = 0.1;

/// Read access to the four effect amounts, each nominally in `[0, 1]`.
///
/// Implemented by the plugin's parameter struct. The chain never writes
/// through it.
pub trait ParameterSource {
    fn glitch(&self) -> f32;
    fn corruption(&self) -> f32;
    fn malware(&self) -> f32;
    fn neuronic(&self) -> f32;
}

/// The parameter values used for one buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterSnapshot {
    pub glitch: f32,
    pub corruption: f32,
    pub malware: f32,
    pub neuronic: f32,
}

impl ParameterSnapshot {
    pub fn capture(source: &(impl ParameterSource + ?Sized)) -> Self {
        Self {
            glitch: source.glitch(),
            corruption: source.corruption(),
            malware: source.malware(),
            neuronic: source.neuronic(),
        }
    }
}

impl ParameterSource for ParameterSnapshot {
    fn glitch(&self) -> f32 {
        self.glitch
    }

    fn corruption(&self) -> f32 {
        self.corruption
    }

    fn malware(&self) -> f32 {
        self.malware
    }

    fn neuronic(&self) -> f32 {
        self.neuronic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PrepareError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),
    #[error("a sample rate of {0} Hz leaves no room for the delay line")]
    ZeroDelayCapacity(f32),
    #[error("unsupported channel count {0}, expected 1 to {max}", max = MAX_CHANNELS)]
    UnsupportedChannelCount(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("process() called before prepare()")]
    NotPrepared,
    #[error("buffer has {got} channels but the chain was prepared for {prepared}")]
    TooManyChannels { got: usize, prepared: usize },
}

/// State that only exists between `prepare()` and `release()`.
struct PreparedState {
    sample_rate: f32,
    max_block_size: usize,
    delay_line: DelayLine,
    holds: [ChannelHoldState; MAX_CHANNELS],
    tremolo: TremoloPhase,
}

enum Lifecycle {
    Unprepared,
    Prepared(PreparedState),
}

/// The glitch effect chain.
///
/// `R` is the random source shared by the decimator and the tremolo. The
/// plugin uses an OS-seeded [`SmallRng`]; tests pass a fixed seed.
pub struct GlitchChain<R = SmallRng> {
    lifecycle: Lifecycle,
    rng: R,
    /// Parameters read by the most recent `process()` call.
    snapshot: ParameterSnapshot,
}

impl<R: Rng> GlitchChain<R> {
    pub fn new(rng: R) -> Self {
        Self {
            lifecycle: Lifecycle::Unprepared,
            rng,
            snapshot: ParameterSnapshot::default(),
        }
    }

    /// Allocate the delay line and zero all state.
    ///
    /// Can be called again at any time to change the configuration. On error
    /// the chain is left `Unprepared`.
    pub fn prepare(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<(), PrepareError> {
        self.lifecycle = Lifecycle::Unprepared;

        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(PrepareError::UnsupportedChannelCount(num_channels));
        }
        let capacity = NonZeroUsize::new((MAX_DELAY_SECONDS * sample_rate) as usize)
            .ok_or(PrepareError::ZeroDelayCapacity(sample_rate))?;

        self.lifecycle = Lifecycle::Prepared(PreparedState {
            sample_rate,
            max_block_size,
            delay_line: DelayLine::new(num_channels, capacity),
            holds: [ChannelHoldState::default(); MAX_CHANNELS],
            tremolo: TremoloPhase::default(),
        });

        Ok(())
    }

    /// Free the delay line.
    pub fn release(&mut self) {
        self.lifecycle = Lifecycle::Unprepared;
    }

    /// Silence the delay line and zero hold counters and phase, keeping the
    /// current allocation. Does nothing when unprepared.
    pub fn reset(&mut self) {
        if let Lifecycle::Prepared(state) = &mut self.lifecycle {
            state.delay_line.clear();
            for hold in &mut state.holds {
                hold.reset();
            }
            state.tremolo.reset();
        }
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Prepared(_))
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.prepared().map(|state| state.sample_rate)
    }

    /// Samples per channel in the delay line; 0 when unprepared.
    pub fn delay_capacity(&self) -> usize {
        self.prepared().map_or(0, |state| state.delay_line.capacity())
    }

    pub fn num_channels(&self) -> usize {
        self.prepared().map_or(0, |state| state.delay_line.num_channels())
    }

    pub fn write_cursor(&self) -> Option<usize> {
        self.prepared().map(|state| state.delay_line.write_cursor())
    }

    pub fn hold_state(&self, channel: usize) -> Option<ChannelHoldState> {
        self.prepared().and_then(|state| state.holds.get(channel).copied())
    }

    pub fn tremolo_phase(&self) -> Option<f32> {
        self.prepared().map(|state| state.tremolo.phase())
    }

    pub fn last_snapshot(&self) -> ParameterSnapshot {
        self.snapshot
    }

    /// Effect tail for the parameters of the last processed buffer.
    pub fn tail(&self) -> Tail {
        feedback_delay::tail(self.snapshot.neuronic, self.delay_capacity())
    }

    fn prepared(&self) -> Option<&PreparedState> {
        match &self.lifecycle {
            Lifecycle::Prepared(state) => Some(state),
            Lifecycle::Unprepared => None,
        }
    }

    /// Process one host buffer in place, one slice per channel.
    ///
    /// Contract violations never touch memory outside the delay line:
    /// - unprepared: the buffer is left as it is;
    /// - more channels than prepared: the extra channels are silenced.
    ///
    /// Both still return an error so the caller can report them.
    pub fn process(
        &mut self,
        buffer: &mut [&mut [f32]],
        params: &(impl ParameterSource + ?Sized),
    ) -> Result<(), ProcessError> {
        self.snapshot = ParameterSnapshot::capture(params);
        let snapshot = self.snapshot;

        let Lifecycle::Prepared(state) = &mut self.lifecycle else {
            return Err(ProcessError::NotPrepared);
        };

        // Channels past the prepared count have no hold state and no delay
        // line to work with. Rather than index out of bounds, silence them.
        let num_buffer_channels = buffer.len();
        let prepared_channels = state.delay_line.num_channels();
        let (active, excess) = buffer.split_at_mut(num_buffer_channels.min(prepared_channels));
        for channel in excess.iter_mut() {
            channel.fill(0.0);
        }

        // nih_plug hands us equally long channels; taking the shortest keeps
        // `samples[offset]` in bounds even if a caller doesn't.
        let num_frames = active.iter().map(|channel| channel.len()).min().unwrap_or(0);
        nih_debug_assert!(num_frames <= state.max_block_size);

        // The delay length depends only on the knob, so it is worked out once
        // for the whole buffer. `None` means the delay stage is bypassed: it
        // neither reads from nor writes to the line.
        let delay = feedback_delay::delay_in_samples(snapshot.neuronic, state.delay_line.capacity());

        for offset in 0..num_frames {
            // One tremolo step per frame, shared by every channel. Drawing it
            // per channel would give left and right different jitter and
            // advance the phase twice as fast in stereo.
            let modulator =
                state.tremolo.next_modulator(snapshot.malware, state.sample_rate, &mut self.rng);

            for (channel_idx, (samples, hold)) in
                active.iter_mut().zip(state.holds.iter_mut()).enumerate()
            {
                let mut sample = samples[offset];

                // Step 1: GLITCH. Either capture this sample or keep repeating
                // the one captured earlier. Each channel holds independently.
                sample = decimator::decimate(sample, snapshot.glitch, hold, &mut self.rng);

                // Step 2: CORRUPTION. Snap the (possibly held) value onto a
                // coarse amplitude grid.
                sample = quantizer::quantize(sample, snapshot.corruption);

                // Step 3: MALWARE. Scale by this frame's modulator, blended
                // with the dry signal by the knob amount.
                if let Some(modulator) = modulator {
                    sample = tremolo::apply(sample, snapshot.malware, modulator);
                }

                // Step 4: NEURONIC. Mix in the echo from `delay` samples ago and
                // write the result (plus feedback) back into the line. The
                // write lands at `write_cursor + offset`; the cursor itself
                // only moves after the whole buffer is done.
                if let Some(delay) = delay {
                    if let Some(mut tap) = state.delay_line.channel_mut(channel_idx) {
                        sample = feedback_delay::process(
                            sample,
                            snapshot.neuronic,
                            delay,
                            &mut tap,
                            offset,
                        );
                    }
                }

                // In-place processing: the output replaces the input.
                samples[offset] = sample;
            }
        }

        // Step 5: ADVANCE the shared write cursor by the buffer length. This
        // happens even when the delay is bypassed, so re-enabling it later
        // reads from where the line "would have been".
        state.delay_line.advance(num_frames);

        if excess.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::TooManyChannels {
                got: num_buffer_channels,
                prepared: prepared_channels,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
