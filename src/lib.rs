//! # Neuronic Glitch — A Lo-Fi AU/VST3/CLAP Effect
//!
//! Four deliberately crude distortions in series, each on its own knob and
//! each switched off when its knob is at (or within 1% of) zero.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──► [Glitch]  ──► [Corruption] ──► [Malware]  ──► [Neuronic] ──► Output
//!           random         bit crusher      jittery        feedback
//!           sample &       16 → 2 bits      tremolo        echo ≤ 100 ms
//!           hold                                              │    ▲
//!                                                             ▼    │
//!                                                          [Delay Line]
//! ```
//!
//! All of the signal processing lives in [`dsp`]. This file is the host
//! shell: it tells the host which layouts we support, forwards the
//! lifecycle callbacks to the effect chain and reports the echo tail.

pub mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::chain::GlitchChain;
use dsp::feedback_delay::Tail;
use nih_plug::prelude::*;
use params::GlitchParams;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Only used if the OS cannot hand out a random seed.
const FALLBACK_SEED: u64 = 0x6e65_7572_6f6e_6963;

struct NeuronicGlitch {
    params: Arc<GlitchParams>,

    /// The effect chain and all of its state. Owned by the audio thread;
    /// the host serializes `initialize()`/`deactivate()` against `process()`.
    chain: GlitchChain,
}

impl Default for NeuronicGlitch {
    fn default() -> Self {
        // Seeded once from the OS so no two instances glitch alike.
        let rng = SmallRng::try_from_os_rng().unwrap_or_else(|err| {
            nih_warn!("OS random source unavailable ({err}), using a fixed seed");
            SmallRng::seed_from_u64(FALLBACK_SEED)
        });

        Self {
            params: Arc::new(GlitchParams::default()),
            chain: GlitchChain::new(rng),
        }
    }
}

impl Plugin for NeuronicGlitch {
    const NAME: &'static str = "Neuronic Glitch";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most tracks are stereo, then mono.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per buffer, so there is nothing to gain from
    // having the host split buffers at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the delay line for the host's sample rate and channel count.
    ///
    /// Returning `false` makes the host reject the configuration.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_output_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        match self.chain.prepare(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
            num_channels,
        ) {
            Ok(()) => {
                nih_log!(
                    "prepared at {} Hz, {} channel(s), {} sample delay line",
                    buffer_config.sample_rate,
                    num_channels,
                    self.chain.delay_capacity()
                );
                true
            }
            Err(err) => {
                nih_error!("cannot prepare effect chain: {err}");
                false
            }
        }
    }

    /// Playback stopped (or just initialized): drop any echoes and holds
    /// still in flight.
    fn reset(&mut self) {
        self.chain.reset();
    }

    fn deactivate(&mut self) {
        self.chain.release();
        nih_log!("released delay line");
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        if let Err(err) = self.chain.process(buffer.as_slice(), self.params.as_ref()) {
            nih_debug_assert_failure!("{}", err);
        }

        // Keep the host calling us while echoes are still audible after the
        // input goes quiet.
        match self.chain.tail() {
            Tail::None => ProcessStatus::Normal,
            Tail::Samples(samples) => ProcessStatus::Tail(samples),
            Tail::Infinite => ProcessStatus::KeepAlive,
        }
    }
}

impl ClapPlugin for NeuronicGlitch {
    const CLAP_ID: &'static str = "com.loveless-audio.neuronic-glitch";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Random sample-and-hold, bit crushing, jittery tremolo and a short feedback echo");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Distortion,
        ClapFeature::Glitch,
    ];
}

impl Vst3Plugin for NeuronicGlitch {
    const VST3_CLASS_ID: [u8; 16] = *b"NeuronicGlitch01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Distortion];
}

nih_export_clap!(NeuronicGlitch);
nih_export_vst3!(NeuronicGlitch);

// AUv2 entry point for Logic Pro.
clap_wrapper::export_auv2!();
