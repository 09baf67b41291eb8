use crate::synth::{CycleDirection, SynthHandle};
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::collections::HashMap;

const VELOCITY: u8 = 100;
const CHANNEL: u8 = 0;

/// Computer-keyboard piano. Acts as the control context: turns key transitions into
/// note events and waveform edits on the instrument played by channel 0.
pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_note: HashMap<Keycode, u8>,
    control_keys: HashMap<Keycode, bool>,
    quit_requested: bool,
}

impl KeyboardHandler {
    pub fn new() -> Self {
        let key_to_note: HashMap<Keycode, u8> = [
            // Bottom row - natural notes
            (Keycode::A, 57),         // A3
            (Keycode::S, 59),         // B3
            (Keycode::D, 60),         // C4
            (Keycode::F, 62),         // D4
            (Keycode::G, 64),         // E4
            (Keycode::H, 65),         // F4
            (Keycode::J, 67),         // G4
            (Keycode::K, 69),         // A4
            (Keycode::L, 71),         // B4
            (Keycode::Semicolon, 72), // C5
            // Top row - sharps
            (Keycode::W, 58),
            (Keycode::R, 61),
            (Keycode::T, 63),
            (Keycode::U, 66),
            (Keycode::I, 68),
            (Keycode::O, 70),
            (Keycode::LeftBracket, 73),
        ]
        .into_iter()
        .collect();

        let key_states = key_to_note.keys().map(|key| (*key, false)).collect();
        let control_keys = [(Keycode::Comma, false), (Keycode::Dot, false)]
            .into_iter()
            .collect();

        Self {
            device_state: DeviceState::new(),
            key_states,
            key_to_note,
            control_keys,
            quit_requested: false,
        }
    }

    pub fn update(&mut self, synth: &mut SynthHandle) {
        let keys: Vec<Keycode> = self.device_state.get_keys();
        if keys.contains(&Keycode::Escape) {
            self.quit_requested = true;
        }

        for (key, note) in &self.key_to_note {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).copied().unwrap_or(false);
            if is_pressed == was_pressed {
                continue;
            }

            if is_pressed {
                log::debug!("Key '{:?}' pressed - note on {}", key, note);
                synth.trigger(*note, CHANNEL, VELOCITY);
            } else {
                log::debug!("Key '{:?}' released - note off {}", key, note);
                synth.release(*note, CHANNEL, 0);
            }
            self.key_states.insert(*key, is_pressed);
        }

        for key in [Keycode::Comma, Keycode::Dot] {
            let is_pressed = keys.contains(&key);
            let was_pressed = self.control_keys.get(&key).copied().unwrap_or(false);

            if is_pressed && !was_pressed {
                let direction = if key == Keycode::Comma {
                    CycleDirection::Backward
                } else {
                    CycleDirection::Forward
                };
                Self::cycle_waveforms(synth, direction);
            }
            self.control_keys.insert(key, is_pressed);
        }
    }

    /// Set once Escape has been pressed.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn cycle_waveforms(synth: &SynthHandle, direction: CycleDirection) {
        let Some(slot) = synth.instruments().slot_for_channel(CHANNEL) else {
            return;
        };
        if let Some(instrument) = synth.instrument(slot) {
            instrument.cycle_waveforms(direction);
            let waveform = instrument.operator(0).and_then(|op| op.waveform());
            log::info!("Cycled waveforms {:?}, operator 0 now {:?}", direction, waveform);
        }
    }
}

impl Default for KeyboardHandler {
    fn default() -> Self {
        Self::new()
    }
}
