use super::envelope::{Envelope, EnvelopeConfig, EnvelopeStage};
use super::oscillator::{Oscillator, OscillatorConfig};
use serde::{Deserialize, Serialize};

/// Configuration for one operator slot: its envelope plus its oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub envelope: EnvelopeConfig,
    pub oscillator: OscillatorConfig,
}

/// One envelope + oscillator pair. Produces a single modulatable signal.
#[derive(Debug, Clone, Default)]
pub struct Operator {
    envelope: Envelope,
    oscillator: Oscillator,
    base_frequency: f32,
}

impl Operator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&mut self, base_frequency: f32, config: &OperatorConfig, retrigger: bool) {
        self.base_frequency = base_frequency;
        self.oscillator.configure(&config.oscillator);
        self.oscillator
            .trigger(base_frequency * config.oscillator.frequency_ratio, retrigger);
        if retrigger {
            self.envelope.configure(&config.envelope);
            self.envelope.retrigger();
        } else {
            self.envelope.trigger(&config.envelope);
        }
    }

    /// Restarts the envelope only; oscillator phase and pitch are untouched.
    pub fn retrigger(&mut self) {
        self.envelope.retrigger();
    }

    pub fn release(&mut self) {
        self.envelope.release();
    }

    /// Picks up parameter edits made since the last tick.
    pub fn configure(&mut self, config: &OperatorConfig) {
        self.envelope.configure(&config.envelope);
        self.oscillator.configure(&config.oscillator);
        self.oscillator
            .set_frequency(self.base_frequency * config.oscillator.frequency_ratio);
    }

    /// Advances both halves; the oscillator keeps running through the release.
    /// Returns whether the envelope is still active.
    pub fn update(&mut self, dt: f32) -> bool {
        let active = self.envelope.update(dt);
        self.oscillator.update(dt);
        active
    }

    pub fn evaluate(&self, modulation: f32) -> f32 {
        let level = self.envelope.evaluate();
        if level == 0.0 {
            return 0.0;
        }
        level * self.oscillator.evaluate(modulation)
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }
}
