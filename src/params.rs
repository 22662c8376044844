//! # Plugin Parameters
//!
//! Four amounts, one per effect stage, each a plain `0.0..=1.0` control
//! shown as a percentage. The `#[id]` strings are what the host stores in
//! presets and project files; they must never change once published.
//!
//! None of them are smoothed. The effect chain reads each value once at the
//! start of a buffer and holds it for the whole buffer, so a smoother would
//! never be advanced anyway.

use nih_plug::prelude::*;

use crate::dsp::chain::ParameterSource;

/// Default for every amount: half way.
const DEFAULT_AMOUNT: f32 = 0.5;

#[derive(Params)]
pub struct GlitchParams {
    /// **Glitch**: random sample-and-hold. Higher amounts allow longer holds
    /// (up to 100 samples), so the signal stutters more.
    #[id = "glitch"]
    pub glitch: FloatParam,

    /// **Corruption**: bit crushing from 16 bits (0%) down to 2 bits (100%).
    #[id = "corruption"]
    pub corruption: FloatParam,

    /// **Malware**: tremolo with a rate that jitters on every sample.
    /// Sets both the depth and the base rate (1-15 Hz).
    #[id = "malware"]
    pub malware: FloatParam,

    /// **Neuronic**: feedback echo from 1 sample up to 100 ms, at most 50% wet.
    #[id = "neuronic"]
    pub neuronic: FloatParam,
}

fn amount_param(name: &str) -> FloatParam {
    FloatParam::new(
        name,
        DEFAULT_AMOUNT,
        FloatRange::Linear { min: 0.0, max: 1.0 },
    )
    .with_unit("%")
    .with_value_to_string(formatters::v2s_f32_percentage(1))
    .with_string_to_value(formatters::s2v_f32_percentage())
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self {
            glitch: amount_param("Glitch"),
            corruption: amount_param("Corruption"),
            malware: amount_param("Malware"),
            neuronic: amount_param("Neuronic"),
        }
    }
}

impl ParameterSource for GlitchParams {
    fn glitch(&self) -> f32 {
        self.glitch.value()
    }

    fn corruption(&self) -> f32 {
        self.corruption.value()
    }

    fn malware(&self) -> f32 {
        self.malware.value()
    }

    fn neuronic(&self) -> f32 {
        self.neuronic.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::chain::ParameterSnapshot;

    #[test]
    fn test_defaults_are_half_way() {
        let params = GlitchParams::default();
        let snapshot = ParameterSnapshot::capture(&params);

        assert_eq!(
            snapshot,
            ParameterSnapshot {
                glitch: 0.5,
                corruption: 0.5,
                malware: 0.5,
                neuronic: 0.5,
            }
        );
    }

    #[test]
    fn test_param_ids_are_stable() {
        let params = GlitchParams::default();
        let ids: Vec<String> = params
            .param_map()
            .into_iter()
            .map(|(id, _, _)| id)
            .collect();

        assert_eq!(ids, ["glitch", "corruption", "malware", "neuronic"]);
    }
}
