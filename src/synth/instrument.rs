//! Live-editable timbres.
//!
//! Instruments are read by the audio context every tick while the control context
//! edits them, so every field is stored in an atomic. Floats are kept as their bit
//! patterns in `AtomicU32`, and the whole [`Algorithm`] is packed into one `AtomicU64`
//! so a topology change is never observed half-applied. Individual operator fields may
//! change between two reads of the same tick; that only costs a possible click.

use super::algorithm::Algorithm;
use super::envelope::EnvelopeConfig;
use super::operator::OperatorConfig;
use super::oscillator::OscillatorConfig;
use super::preset::InstrumentPreset;
use super::waveform::{CycleDirection, Waveform};
use super::OP_COUNT;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;

/// Largest frequency multiple an operator may run at.
pub const MAX_FREQUENCY_RATIO: f32 = 64.0;

#[derive(Debug, Default)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Parameters of one operator slot, editable from any thread.
#[derive(Debug, Default)]
pub struct OperatorParams {
    attack: AtomicF32,
    attack_level: AtomicF32,
    decay: AtomicF32,
    sustain: AtomicF32,
    release: AtomicF32,
    waveform: AtomicU8,
    amplitude: AtomicF32,
    frequency_ratio: AtomicF32,
}

impl OperatorParams {
    fn new(config: &OperatorConfig) -> Self {
        let params = Self::default();
        params.store(config);
        params
    }

    /// Reads the current values. An unrecognised waveform code reads back as silence.
    pub fn load(&self) -> OperatorConfig {
        let (waveform, amplitude) = match Waveform::from_code(self.waveform.load(Ordering::Relaxed)) {
            Some(waveform) => (waveform, self.amplitude.load()),
            None => (Waveform::Sine, 0.0),
        };
        OperatorConfig {
            envelope: EnvelopeConfig {
                attack: self.attack.load(),
                attack_level: self.attack_level.load(),
                decay: self.decay.load(),
                sustain: self.sustain.load(),
                release: self.release.load(),
            },
            oscillator: OscillatorConfig {
                waveform,
                amplitude,
                frequency_ratio: self.frequency_ratio.load(),
            },
        }
    }

    pub fn store(&self, config: &OperatorConfig) {
        self.set_envelope(&config.envelope);
        self.set_waveform(config.oscillator.waveform);
        self.set_amplitude(config.oscillator.amplitude);
        self.set_frequency_ratio(config.oscillator.frequency_ratio);
    }

    pub fn set_envelope(&self, envelope: &EnvelopeConfig) {
        self.set_attack(envelope.attack);
        self.set_attack_level(envelope.attack_level);
        self.set_decay(envelope.decay);
        self.set_sustain(envelope.sustain);
        self.set_release(envelope.release);
    }

    pub fn set_attack(&self, seconds: f32) {
        self.attack.store(sanitize_duration(seconds));
    }

    pub fn set_attack_level(&self, level: f32) {
        self.attack_level.store(sanitize_level(level));
    }

    pub fn set_decay(&self, seconds: f32) {
        self.decay.store(sanitize_duration(seconds));
    }

    pub fn set_sustain(&self, level: f32) {
        self.sustain.store(sanitize_level(level));
    }

    pub fn set_release(&self, seconds: f32) {
        self.release.store(sanitize_duration(seconds));
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.code(), Ordering::Relaxed);
    }

    pub fn waveform(&self) -> Option<Waveform> {
        Waveform::from_code(self.waveform.load(Ordering::Relaxed))
    }

    pub fn cycle_waveform(&self, direction: CycleDirection) {
        let waveform = self.waveform().unwrap_or_default().cycle(direction);
        self.set_waveform(waveform);
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        self.amplitude
            .store(if amplitude.is_finite() { amplitude } else { 0.0 });
    }

    /// Ratios above [`MAX_FREQUENCY_RATIO`] are clamped; negative or non-finite ones
    /// are ignored.
    pub fn set_frequency_ratio(&self, ratio: f32) {
        if !ratio.is_finite() || ratio < 0.0 {
            log::warn!("Ignoring invalid frequency ratio {ratio}");
            return;
        }
        self.frequency_ratio.store(ratio.min(MAX_FREQUENCY_RATIO));
    }
}

fn sanitize_duration(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

fn sanitize_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Everything a voice needs from its instrument for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentSnapshot {
    pub algorithm: Algorithm,
    pub operators: [OperatorConfig; OP_COUNT],
    pub velocity_sensitivity: f32,
}

/// A named timbre: an algorithm plus one configuration per operator slot.
#[derive(Debug)]
pub struct Instrument {
    name: Mutex<String>,
    algorithm: AtomicU64,
    operators: [OperatorParams; OP_COUNT],
    velocity_sensitivity: AtomicF32,
}

impl Instrument {
    pub fn new(name: &str, algorithm: Algorithm) -> Self {
        Self {
            name: Mutex::new(name.to_string()),
            algorithm: AtomicU64::new(algorithm.to_bits()),
            operators: std::array::from_fn(|_| OperatorParams::new(&OperatorConfig::default())),
            velocity_sensitivity: AtomicF32::new(0.0),
        }
    }

    pub fn from_preset(preset: &InstrumentPreset) -> Self {
        let instrument = Self::new(&preset.name, preset.algorithm);
        instrument.load(preset);
        instrument
    }

    /// Control-side only; never called from the audio context.
    pub fn name(&self) -> String {
        match self.name.lock() {
            Ok(name) => name.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_name(&self, name: &str) {
        match self.name.lock() {
            Ok(mut guard) => *guard = name.to_string(),
            Err(poisoned) => *poisoned.into_inner() = name.to_string(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        Algorithm::from_bits(self.algorithm.load(Ordering::Acquire))
    }

    pub fn set_algorithm(&self, algorithm: Algorithm) {
        self.algorithm.store(algorithm.to_bits(), Ordering::Release);
    }

    pub fn operator(&self, index: usize) -> Option<&OperatorParams> {
        self.operators.get(index)
    }

    pub fn operator_config(&self, index: usize) -> Option<OperatorConfig> {
        self.operators.get(index).map(OperatorParams::load)
    }

    pub fn set_operator_config(&self, index: usize, config: &OperatorConfig) {
        match self.operators.get(index) {
            Some(params) => params.store(config),
            None => log::warn!("Operator index {index} out of bounds ({OP_COUNT} operators)"),
        }
    }

    pub fn velocity_sensitivity(&self) -> f32 {
        self.velocity_sensitivity.load()
    }

    pub fn set_velocity_sensitivity(&self, sensitivity: f32) {
        self.velocity_sensitivity.store(sanitize_level(sensitivity));
    }

    pub fn cycle_waveforms(&self, direction: CycleDirection) {
        for params in &self.operators {
            params.cycle_waveform(direction);
        }
    }

    pub fn snapshot(&self) -> InstrumentSnapshot {
        InstrumentSnapshot {
            algorithm: self.algorithm(),
            operators: std::array::from_fn(|i| self.operators[i].load()),
            velocity_sensitivity: self.velocity_sensitivity(),
        }
    }

    /// Overwrites every parameter with the preset's values.
    pub fn load(&self, preset: &InstrumentPreset) {
        self.set_name(&preset.name);
        self.set_algorithm(preset.algorithm);
        for (params, config) in self.operators.iter().zip(preset.operators.iter()) {
            params.store(config);
        }
        self.set_velocity_sensitivity(preset.velocity_sensitivity);
    }

    pub fn to_preset(&self) -> InstrumentPreset {
        let snapshot = self.snapshot();
        InstrumentPreset {
            name: self.name(),
            algorithm: snapshot.algorithm,
            operators: snapshot.operators,
            velocity_sensitivity: snapshot.velocity_sensitivity,
        }
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Self::from_preset(&InstrumentPreset::default())
    }
}
