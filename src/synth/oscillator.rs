use super::waveform::Waveform;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Oscillator settings for one operator slot of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorConfig {
    pub waveform: Waveform,
    pub amplitude: f32,
    /// Multiplier applied to the voice's base pitch.
    pub frequency_ratio: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            amplitude: 1.0,
            frequency_ratio: 1.0,
        }
    }
}

/// Phase-accumulating oscillator. Phase is kept in `[0, TAU)`.
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    config: OscillatorConfig,
    frequency: f32,
    phase: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the frequency; the phase restarts at zero unless this is a retrigger.
    pub fn trigger(&mut self, frequency: f32, retrigger: bool) {
        self.frequency = frequency;
        if !retrigger {
            self.phase = 0.0;
        }
    }

    pub fn configure(&mut self, config: &OscillatorConfig) {
        self.config = *config;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// A non-finite step (e.g. an overflowing frequency) restarts the phase at zero.
    pub fn update(&mut self, dt: f32) {
        let phase = self.phase + dt * self.frequency * TAU;
        if !phase.is_finite() {
            self.phase = 0.0;
            return;
        }
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        self.phase = match phase.rem_euclid(TAU) {
            p if p >= TAU => 0.0,
            p => p,
        };
    }

    pub fn evaluate(&self, phase_offset: f32) -> f32 {
        if !self.phase.is_finite() || !phase_offset.is_finite() {
            return 0.0;
        }
        self.config.waveform.evaluate(self.phase + phase_offset) * self.config.amplitude
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}
