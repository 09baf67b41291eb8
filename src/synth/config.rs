use super::error::SynthError;
use super::SEMITONE_RATIO;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine construction parameters. Everything here is fixed for the engine's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Size of the voice pool.
    pub max_voices: usize,
    /// Number of note events the control context may queue between two ticks.
    pub event_capacity: usize,
    pub instrument_slots: usize,
    /// Gain applied to each voice before summing, to leave headroom.
    pub voice_gain: f32,
    /// Gain applied to the summed signal.
    pub output_gain: f32,
    pub tuning: Tuning,
    /// Length of the visualization ring, in samples.
    pub scope_len: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_voices: 32,
            event_capacity: 16,
            instrument_slots: 16,
            voice_gain: 0.7,
            output_gain: 0.3,
            tuning: Tuning::default(),
            scope_len: 1024,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.max_voices == 0 {
            return Err(SynthError::Config("max_voices must be at least 1".into()));
        }
        if self.event_capacity == 0 {
            return Err(SynthError::Config("event_capacity must be at least 1".into()));
        }
        if self.instrument_slots == 0 || self.instrument_slots > u8::MAX as usize + 1 {
            return Err(SynthError::Config(format!(
                "instrument_slots must be between 1 and 256, got {}",
                self.instrument_slots
            )));
        }
        if !self.voice_gain.is_finite() || !self.output_gain.is_finite() {
            return Err(SynthError::Config("gains must be finite".into()));
        }
        if !(self.tuning.reference_pitch.is_finite() && self.tuning.reference_pitch > 0.0) {
            return Err(SynthError::Config(format!(
                "reference_pitch must be positive, got {}",
                self.tuning.reference_pitch
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SynthError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SynthError::Config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file, falling back to defaults when the file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SynthError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loading synth config from {}", path.display());
                Self::from_json(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(SynthError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }
}

/// Twelve-tone equal temperament anchored at `reference_note` = `reference_pitch` Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub reference_pitch: f32,
    pub reference_note: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            reference_pitch: 440.0,
            reference_note: 69,
        }
    }
}

impl Tuning {
    pub fn frequency(&self, note: u8) -> f32 {
        let steps = note as i32 - self.reference_note as i32;
        self.reference_pitch * SEMITONE_RATIO.powi(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_temperament() {
        let tuning = Tuning::default();
        assert!((tuning.frequency(69) - 440.0).abs() < 1e-3);
        assert!((tuning.frequency(81) - 880.0).abs() < 1e-2);
        assert!((tuning.frequency(57) - 220.0).abs() < 1e-2);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SynthConfig::from_json(r#"{ "max_voices": 2 }"#).unwrap();
        assert_eq!(config.max_voices, 2);
        assert_eq!(config.event_capacity, 16);
        assert!(SynthConfig::from_json(r#"{ "max_voices": 0 }"#).is_err());
    }
}
