use super::algorithm::Algorithm;
use super::config::Tuning;
use super::instrument::InstrumentSnapshot;
use super::operator::Operator;
use super::OP_COUNT;

/// One sounding instance of an instrument, bound to a note.
///
/// Voices live in the engine's fixed arena and are only ever re-bound, never created
/// or destroyed while the engine runs.
#[derive(Debug, Clone)]
pub struct Voice {
    operators: [Operator; OP_COUNT],
    /// Last output of each operator; modulation taps and feedback read from here.
    outputs: [f32; OP_COUNT],
    algorithm: Algorithm,
    instrument: usize,
    pub active: bool,
    pub note_number: u8,
    pub note_velocity: u8,
    pub note_frequency: f32,
    velocity_scale: f32,
}

impl Voice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the voice to `instrument` and starts every operator from phase zero.
    pub fn trigger(
        &mut self,
        note: u8,
        velocity: u8,
        instrument: usize,
        snapshot: &InstrumentSnapshot,
        tuning: &Tuning,
    ) {
        self.instrument = instrument;
        self.algorithm = snapshot.algorithm;
        self.note_number = note;
        self.note_velocity = velocity;
        self.note_frequency = tuning.frequency(note);
        self.velocity_scale = velocity_to_scale(velocity, snapshot.velocity_sensitivity);
        self.outputs = [0.0; OP_COUNT];

        for (op, config) in self.operators.iter_mut().zip(snapshot.operators.iter()) {
            op.trigger(self.note_frequency, config, false);
        }
        self.active = true;
    }

    /// Legato restrike: envelopes restart from their current level, phase and pitch
    /// carry on.
    pub fn retrigger(&mut self) {
        for op in self.operators.iter_mut() {
            op.retrigger();
        }
    }

    pub fn release(&mut self) {
        for op in self.operators.iter_mut() {
            op.release();
        }
    }

    /// Advances every operator by `dt`. The voice stays active while at least one
    /// output operator's envelope is still running; modulators alone don't keep it alive.
    pub fn update(&mut self, dt: f32, snapshot: &InstrumentSnapshot) -> bool {
        if !self.active {
            return false;
        }
        self.algorithm = snapshot.algorithm;
        self.velocity_scale = velocity_to_scale(self.note_velocity, snapshot.velocity_sensitivity);

        let mut playing = false;
        for (i, op) in self
            .operators
            .iter_mut()
            .enumerate()
            .take(self.algorithm.operator_count())
        {
            op.configure(&snapshot.operators[i]);
            let running = op.update(dt);
            playing |= running && self.algorithm.is_output(i);
        }
        self.active = playing;
        playing
    }

    /// Evaluates the algorithm for one sample.
    ///
    /// Operators run from the highest index down, so every source `m > i` has already
    /// produced this tick's value when operator `i` reads it, while `m == i` still holds
    /// the previous tick's value (one-sample feedback delay). The mix is divided by the
    /// number of output operators.
    pub fn evaluate(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let count = self.algorithm.operator_count();
        let mut output = 0.0;
        let mut carriers = 0u32;
        for i in (0..count).rev() {
            let mods = self.algorithm.modulation_mask(i);
            let mut modulation = 0.0;
            if mods != 0 {
                for m in i..count {
                    if mods & (1 << m) != 0 {
                        modulation += self.outputs[m];
                    }
                }
            }
            self.outputs[i] = self.operators[i].evaluate(modulation);

            if self.algorithm.is_output(i) {
                output += self.outputs[i];
                carriers += 1;
            }
        }

        if carriers == 0 {
            return 0.0;
        }
        output / carriers as f32
    }

    /// Clears the binding so the voice can go back to the pool.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Mix gain derived from the note velocity; 1.0 when the instrument ignores velocity.
    pub fn velocity_scale(&self) -> f32 {
        self.velocity_scale
    }

    pub fn instrument(&self) -> usize {
        self.instrument
    }

    pub fn operator(&self, index: usize) -> Option<&Operator> {
        self.operators.get(index)
    }

    pub fn operator_outputs(&self) -> &[f32; OP_COUNT] {
        &self.outputs
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            operators: std::array::from_fn(|_| Operator::new()),
            outputs: [0.0; OP_COUNT],
            algorithm: Algorithm::simple(),
            instrument: 0,
            active: false,
            note_number: 0,
            note_velocity: 0,
            note_frequency: 0.0,
            velocity_scale: 1.0,
        }
    }
}

/// Blends between a flat response and a `(velocity / 127)^1.5` curve.
fn velocity_to_scale(velocity: u8, sensitivity: f32) -> f32 {
    let normalized = velocity.min(127) as f32 / 127.0;
    let sensitivity = sensitivity.clamp(0.0, 1.0);
    1.0 - sensitivity + sensitivity * normalized.powf(1.5)
}
