use serde::{Deserialize, Serialize};

/// Envelope timing and levels. Durations are in seconds, levels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub attack_level: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.05,
            attack_level: 1.0,
            decay: 0.3,
            sustain: 0.7,
            release: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    #[default]
    Idle,
}

/// Per-operator level generator.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    config: EnvelopeConfig,
    level: f32,
    stage: EnvelopeStage,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `config` and starts a fresh attack from silence.
    pub fn trigger(&mut self, config: &EnvelopeConfig) {
        self.config = *config;
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
    }

    /// Restarts the attack from the current level so legato restrikes don't click.
    pub fn retrigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    pub fn release(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Rebinds the configuration without touching stage or level.
    pub fn configure(&mut self, config: &EnvelopeConfig) {
        self.config = *config;
    }

    /// Advances by `dt` seconds. Returns `false` once the envelope is idle.
    pub fn update(&mut self, dt: f32) -> bool {
        let c = &self.config;
        match self.stage {
            EnvelopeStage::Attack => {
                let target = c.attack_level.clamp(0.0, 1.0);
                if c.attack > 0.0 {
                    self.level += dt / c.attack;
                } else {
                    self.level = self.level.max(target);
                }
                if self.level >= target {
                    self.level = self.level.min(target);
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                let sustain = c.sustain.clamp(0.0, 1.0);
                if c.decay > 0.0 {
                    self.level -= dt / c.decay;
                }
                if c.decay <= 0.0 || self.level <= sustain {
                    self.level = sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = c.sustain.clamp(0.0, 1.0);
            }
            EnvelopeStage::Release => {
                if c.release > 0.0 {
                    self.level -= dt / c.release;
                }
                if c.release <= 0.0 || self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
            EnvelopeStage::Idle => {}
        }
        self.stage != EnvelopeStage::Idle
    }

    pub fn evaluate(&self) -> f32 {
        if self.stage == EnvelopeStage::Idle {
            0.0
        } else {
            self.level
        }
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_idle(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }
}
