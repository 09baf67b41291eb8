use std::fmt;

#[derive(Debug)]
pub enum SynthError {
    Algorithm(AlgorithmError),
    Preset(PresetError),
    Config(String),
}

/// Reasons an operator topology is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    OperatorCount { count: usize, max: usize },
    /// Operator `operator` takes modulation from a lower index `source`.
    ForwardModulation { operator: usize, source: usize },
    SourceOutOfRange { operator: usize, source: usize, count: usize },
    UnusedSlotModulated { operator: usize },
    NoOutputs,
    OutputOutOfRange { output: usize, count: usize },
}

#[derive(Debug)]
pub enum PresetError {
    Truncated { offset: usize },
    UnexpectedTag { expected: u8, found: u8, offset: usize },
    UnknownWaveform { operator: usize, code: u8 },
    TrailingBytes { offset: usize },
    Algorithm(AlgorithmError),
    Json(serde_json::Error),
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::Algorithm(e) => write!(f, "Algorithm error: {e}"),
            SynthError::Preset(e) => write!(f, "Preset error: {e}"),
            SynthError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for SynthError {}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmError::OperatorCount { count, max } => {
                write!(f, "Operator count {count} must be between 1 and {max}")
            }
            AlgorithmError::ForwardModulation { operator, source } => write!(
                f,
                "Operator {operator} cannot be modulated by lower-index operator {source}"
            ),
            AlgorithmError::SourceOutOfRange {
                operator,
                source,
                count,
            } => write!(
                f,
                "Operator {operator} is modulated by operator {source}, but only {count} operators are in use"
            ),
            AlgorithmError::UnusedSlotModulated { operator } => {
                write!(f, "Unused operator slot {operator} has modulation sources")
            }
            AlgorithmError::NoOutputs => write!(f, "Algorithm has no output operators"),
            AlgorithmError::OutputOutOfRange { output, count } => write!(
                f,
                "Output operator {output} out of bounds for {count} operators"
            ),
        }
    }
}

impl std::error::Error for AlgorithmError {}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::Truncated { offset } => write!(f, "Preset data truncated at byte {offset}"),
            PresetError::UnexpectedTag {
                expected,
                found,
                offset,
            } => write!(
                f,
                "Expected tag '{}' at byte {offset}, found 0x{found:02x}",
                *expected as char
            ),
            PresetError::UnknownWaveform { operator, code } => {
                write!(f, "Operator {operator} has unknown waveform code {code}")
            }
            PresetError::TrailingBytes { offset } => {
                write!(f, "Unexpected trailing data at byte {offset}")
            }
            PresetError::Algorithm(e) => write!(f, "{e}"),
            PresetError::Json(e) => write!(f, "JSON: {e}"),
        }
    }
}

impl std::error::Error for PresetError {}

impl From<AlgorithmError> for SynthError {
    fn from(e: AlgorithmError) -> Self {
        SynthError::Algorithm(e)
    }
}

impl From<PresetError> for SynthError {
    fn from(e: PresetError) -> Self {
        SynthError::Preset(e)
    }
}

impl From<AlgorithmError> for PresetError {
    fn from(e: AlgorithmError) -> Self {
        PresetError::Algorithm(e)
    }
}

impl From<serde_json::Error> for PresetError {
    fn from(e: serde_json::Error) -> Self {
        PresetError::Json(e)
    }
}
