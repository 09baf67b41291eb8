//! Instrument export formats.
//!
//! JSON goes through serde. The binary form is little-endian and tag-prefixed:
//!
//! ```text
//! 'A' count:u8 mods:[u8; count] outs:u8
//! 'O' attack:f32 attack_level:f32 decay:f32 sustain:f32 release:f32
//!     waveform:u8 amplitude:f32 frequency_ratio:f32        (repeated `count` times)
//! ```

use super::algorithm::Algorithm;
use super::envelope::EnvelopeConfig;
use super::error::PresetError;
use super::operator::OperatorConfig;
use super::oscillator::OscillatorConfig;
use super::waveform::Waveform;
use super::OP_COUNT;
use serde::{Deserialize, Serialize};

const ALGORITHM_TAG: u8 = b'A';
const OPERATOR_TAG: u8 = b'O';
/// Bytes per operator block, tag included.
pub const OPERATOR_BLOCK_LEN: usize = 1 + 5 * 4 + 1 + 4 + 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentPreset {
    pub name: String,
    pub algorithm: Algorithm,
    pub operators: [OperatorConfig; OP_COUNT],
    pub velocity_sensitivity: f32,
}

impl Default for InstrumentPreset {
    fn default() -> Self {
        let mut operators = [OperatorConfig::default(); OP_COUNT];
        for (op, ratio) in operators.iter_mut().zip([1.0, 2.0, 1.0, 3.0, 1.0, 1.0]) {
            op.oscillator.frequency_ratio = ratio;
        }
        Self {
            name: "Init".to_string(),
            algorithm: Algorithm::default(),
            operators,
            velocity_sensitivity: 0.0,
        }
    }
}

impl InstrumentPreset {
    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Binary export. Only the operators the algorithm uses are written; the name and
    /// velocity sensitivity are not part of this format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let count = self.algorithm.operator_count();
        let mut buffer = Vec::with_capacity(3 + count + count * OPERATOR_BLOCK_LEN);

        buffer.push(ALGORITHM_TAG);
        buffer.push(count as u8);
        buffer.extend_from_slice(self.algorithm.mods());
        buffer.push(self.algorithm.outs());

        for op in &self.operators[..count] {
            buffer.push(OPERATOR_TAG);
            let env = &op.envelope;
            for value in [env.attack, env.attack_level, env.decay, env.sustain, env.release] {
                buffer.extend_from_slice(&value.to_le_bytes());
            }
            buffer.push(op.oscillator.waveform.code());
            buffer.extend_from_slice(&op.oscillator.amplitude.to_le_bytes());
            buffer.extend_from_slice(&op.oscillator.frequency_ratio.to_le_bytes());
        }

        log::debug!("Serialized preset '{}' into {} bytes", self.name, buffer.len());
        buffer
    }

    /// Parses the binary form. Operator slots past the algorithm's count take defaults.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PresetError> {
        let mut reader = Reader { bytes, offset: 0 };

        reader.expect_tag(ALGORITHM_TAG)?;
        let count = reader.u8()? as usize;
        let mut mods = Vec::with_capacity(count);
        for _ in 0..count {
            mods.push(reader.u8()?);
        }
        let outs = reader.u8()?;
        let algorithm = Algorithm::new(count, &mods, outs)?;

        let mut operators = [OperatorConfig::default(); OP_COUNT];
        for (index, op) in operators.iter_mut().take(count).enumerate() {
            reader.expect_tag(OPERATOR_TAG)?;
            let envelope = EnvelopeConfig {
                attack: reader.f32()?,
                attack_level: reader.f32()?,
                decay: reader.f32()?,
                sustain: reader.f32()?,
                release: reader.f32()?,
            };
            let code = reader.u8()?;
            let waveform = Waveform::from_code(code)
                .ok_or(PresetError::UnknownWaveform { operator: index, code })?;
            let oscillator = OscillatorConfig {
                waveform,
                amplitude: reader.f32()?,
                frequency_ratio: reader.f32()?,
            };
            *op = OperatorConfig {
                envelope,
                oscillator,
            };
        }

        if reader.offset != bytes.len() {
            return Err(PresetError::TrailingBytes {
                offset: reader.offset,
            });
        }

        Ok(Self {
            name: String::new(),
            algorithm,
            operators,
            velocity_sensitivity: 0.0,
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], PresetError> {
        let end = self.offset + N;
        let chunk = self
            .bytes
            .get(self.offset..end)
            .ok_or(PresetError::Truncated {
                offset: self.bytes.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        self.offset = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, PresetError> {
        Ok(self.take::<1>()?[0])
    }

    fn f32(&mut self) -> Result<f32, PresetError> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }

    fn expect_tag(&mut self, expected: u8) -> Result<(), PresetError> {
        let offset = self.offset;
        let found = self.u8()?;
        if found != expected {
            return Err(PresetError::UnexpectedTag {
                expected,
                found,
                offset,
            });
        }
        Ok(())
    }
}
