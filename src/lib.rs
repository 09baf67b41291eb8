//! Polyphonic FM synthesis engine.
//!
//! [`synth::Synth::new`] returns two halves: a [`synth::SynthHandle`] for the control
//! context (note events, instrument edits) and the [`synth::Synth`] engine that the
//! audio context ticks once per sample with `update` followed by `evaluate`.

pub mod synth;

#[cfg(feature = "native")]
pub mod audio;
#[cfg(feature = "native")]
pub mod input;
#[cfg(feature = "native")]
pub mod runtime;
