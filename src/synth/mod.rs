pub mod algorithm;
pub mod config;
pub mod core;
pub mod envelope;
pub mod error;
pub mod instrument;
pub mod note;
pub mod operator;
pub mod oscillator;
pub mod preset;
pub mod scope;
pub mod voice;
pub mod waveform;

pub use self::algorithm::Algorithm;
pub use self::config::{SynthConfig, Tuning};
pub use self::core::{InstrumentBank, Synth, SynthHandle, CHANNEL_COUNT};
pub use self::error::{AlgorithmError, PresetError, SynthError};
pub use self::instrument::{Instrument, InstrumentSnapshot, OperatorParams};
pub use self::preset::InstrumentPreset;
pub use self::waveform::{CycleDirection, Waveform};

/// Operators per voice.
pub const OP_COUNT: usize = 6;

/// Frequency ratio between adjacent semitones in twelve-tone equal temperament.
pub const SEMITONE_RATIO: f32 = 1.059463094359;
