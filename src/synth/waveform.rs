use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    ClampedSine,
    AbsoluteSine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::ClampedSine,
        Waveform::AbsoluteSine,
    ];

    /// Evaluates the raw (unscaled) waveform at `phase` radians.
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::AbsoluteSine => phase.sin().abs(),
            Waveform::ClampedSine => phase.sin().clamp(0.0, 1.0),
            Waveform::Square => {
                if phase.rem_euclid(2.0 * PI) <= PI {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
            Waveform::ClampedSine => 2,
            Waveform::AbsoluteSine => 3,
        }
    }

    /// Maps a stored waveform code back to a waveform. Unknown codes yield `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Square,
            Waveform::Square => Waveform::ClampedSine,
            Waveform::ClampedSine => Waveform::AbsoluteSine,
            Waveform::AbsoluteSine => Waveform::Sine,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Waveform::Sine => Waveform::AbsoluteSine,
            Waveform::Square => Waveform::Sine,
            Waveform::ClampedSine => Waveform::Square,
            Waveform::AbsoluteSine => Waveform::ClampedSine,
        }
    }

    pub fn cycle(self, direction: CycleDirection) -> Self {
        match direction {
            CycleDirection::Forward => self.next(),
            CycleDirection::Backward => self.previous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_and_unknown_is_none() {
        for waveform in Waveform::ALL {
            assert_eq!(Waveform::from_code(waveform.code()), Some(waveform));
        }
        assert_eq!(Waveform::from_code(4), None);
        assert_eq!(Waveform::from_code(255), None);
    }

    #[test]
    fn cycling_visits_every_waveform() {
        let mut waveform = Waveform::Sine;
        for _ in 0..4 {
            assert_eq!(waveform.next().previous(), waveform);
            waveform = waveform.cycle(CycleDirection::Forward);
        }
        assert_eq!(waveform, Waveform::Sine);
    }

    #[test]
    fn shapes_match_their_definitions() {
        let a = 1.5 * PI;
        assert!((Waveform::Sine.evaluate(a) + 1.0).abs() < 1e-6);
        assert!((Waveform::AbsoluteSine.evaluate(a) - 1.0).abs() < 1e-6);
        assert_eq!(Waveform::ClampedSine.evaluate(a), 0.0);
        assert_eq!(Waveform::Square.evaluate(a), -1.0);
        assert_eq!(Waveform::Square.evaluate(0.5), 1.0);
        assert_eq!(Waveform::Square.evaluate(PI), 1.0);
    }

    #[test]
    fn square_wraps_phase_outside_one_cycle() {
        // Negative modulation lands in the second half of the cycle.
        assert_eq!(Waveform::Square.evaluate(-0.5), -1.0);
        assert_eq!(Waveform::Square.evaluate(-PI - 0.5), 1.0);
        // Past one cycle it starts over.
        assert_eq!(Waveform::Square.evaluate(2.0 * PI + 0.5), 1.0);
        assert_eq!(Waveform::Square.evaluate(3.0 * PI + 0.5), -1.0);
    }
}
