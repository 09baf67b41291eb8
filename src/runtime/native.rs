use crate::audio::{AudioBackend, CpalBackend};
use crate::input::KeyboardHandler;
use crate::synth::{Synth, SynthConfig, SynthError};
use std::time::Duration;

/// Hands the engine to the audio backend and runs the keyboard loop as the control
/// context on the calling thread until Escape is pressed.
pub fn start(config: SynthConfig) -> Result<(), SynthError> {
    let (mut handle, synth) = Synth::new(config)?;

    let mut audio_backend = CpalBackend::new(synth);
    audio_backend.start();

    let mut keyboard_handler = KeyboardHandler::new();
    let mut last_voice_count = 0;

    loop {
        keyboard_handler.update(&mut handle);
        if keyboard_handler.quit_requested() {
            break;
        }

        let voices = handle.active_voice_count();
        if voices != last_voice_count {
            log::debug!("{voices} active voices");
            last_voice_count = voices;
        }

        std::thread::sleep(Duration::from_millis(5));
    }

    audio_backend.stop();
    log::info!(
        "Stopped ({} events dropped, {} notes without a free voice)",
        handle.dropped_events(),
        handle.dropped_notes()
    );
    Ok(())
}
