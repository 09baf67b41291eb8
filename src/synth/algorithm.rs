use super::error::AlgorithmError;
use super::OP_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator-modulation topology and output mix.
///
/// Bit `m` of `mods[i]` routes operator `m`'s output into operator `i`'s phase. Sources
/// always sit at an equal or higher index than the operator they modulate, so a single
/// descending pass over the operators resolves every dependency; `m == i` is
/// self-feedback and reads the previous sample. Bit `i` of `outs` mixes operator `i`
/// into the voice output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAlgorithm", into = "RawAlgorithm")]
pub struct Algorithm {
    operator_count: u8,
    mods: [u8; OP_COUNT],
    outs: u8,
}

#[derive(Serialize, Deserialize)]
struct RawAlgorithm {
    operator_count: u8,
    mods: Vec<u8>,
    outs: u8,
}

impl Algorithm {
    /// Validates and builds an algorithm. `mods` lists one mask per operator in use.
    pub fn new(operator_count: usize, mods: &[u8], outs: u8) -> Result<Self, AlgorithmError> {
        if operator_count == 0 || operator_count > OP_COUNT {
            return Err(AlgorithmError::OperatorCount {
                count: operator_count,
                max: OP_COUNT,
            });
        }
        if mods.len() > OP_COUNT {
            return Err(AlgorithmError::OperatorCount {
                count: mods.len(),
                max: OP_COUNT,
            });
        }

        let mut masks = [0u8; OP_COUNT];
        for (operator, &mask) in mods.iter().enumerate() {
            if mask != 0 && operator >= operator_count {
                return Err(AlgorithmError::UnusedSlotModulated { operator });
            }
            for source in 0..8 {
                if mask & (1 << source) == 0 {
                    continue;
                }
                if source < operator {
                    return Err(AlgorithmError::ForwardModulation { operator, source });
                }
                if source >= operator_count {
                    return Err(AlgorithmError::SourceOutOfRange {
                        operator,
                        source,
                        count: operator_count,
                    });
                }
            }
            masks[operator] = mask;
        }

        if outs == 0 {
            return Err(AlgorithmError::NoOutputs);
        }
        if let Some(output) = (operator_count..8).find(|&bit| outs & (1 << bit) != 0) {
            return Err(AlgorithmError::OutputOutOfRange {
                output,
                count: operator_count,
            });
        }

        Ok(Self {
            operator_count: operator_count as u8,
            mods: masks,
            outs,
        })
    }

    /// One carrier, no modulation.
    pub fn simple() -> Self {
        Self {
            operator_count: 1,
            mods: [0; OP_COUNT],
            outs: 0b1,
        }
    }

    /// Operator 1 modulates carrier 0.
    pub fn stack_2() -> Self {
        let mut mods = [0; OP_COUNT];
        mods[0] = 0b10;
        Self {
            operator_count: 2,
            mods,
            outs: 0b1,
        }
    }

    /// A single carrier feeding back into itself.
    pub fn feedback_1() -> Self {
        let mut mods = [0; OP_COUNT];
        mods[0] = 0b1;
        Self {
            operator_count: 1,
            mods,
            outs: 0b1,
        }
    }

    /// Two carriers (0 and 2). Operator 1 modulates 0 and feeds back into itself;
    /// operator 3 modulates 2.
    pub fn dual_pair() -> Self {
        Self {
            operator_count: 4,
            mods: [0b0010, 0b0010, 0b1000, 0b0000, 0, 0],
            outs: 0b0101,
        }
    }

    /// Six operators in the classic "algorithm 1" layout: a 2-stack and a 4-stack with
    /// feedback on the top operator.
    pub fn dx7_1() -> Self {
        Self {
            operator_count: 6,
            mods: [0b000010, 0, 0b001000, 0b010000, 0b100000, 0b100000],
            outs: 0b000101,
        }
    }

    pub fn operator_count(&self) -> usize {
        (self.operator_count as usize).min(OP_COUNT)
    }

    pub fn mods(&self) -> &[u8] {
        &self.mods[..self.operator_count()]
    }

    /// Modulation sources of `operator`, or 0 when out of range.
    pub fn modulation_mask(&self, operator: usize) -> u8 {
        self.mods.get(operator).copied().unwrap_or(0)
    }

    pub fn outs(&self) -> u8 {
        self.outs
    }

    pub fn is_output(&self, operator: usize) -> bool {
        operator < 8 && self.outs & (1 << operator) != 0
    }

    pub fn output_count(&self) -> u32 {
        self.outs.count_ones()
    }

    /// Packs the whole topology into one word so it can be swapped atomically.
    pub fn to_bits(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes[0] = self.operator_count;
        bytes[1..1 + OP_COUNT].copy_from_slice(&self.mods);
        bytes[7] = self.outs;
        u64::from_le_bytes(bytes)
    }

    /// Unpacks a word produced by [`Algorithm::to_bits`]. Not validated: evaluation
    /// only ever reads in-range sources, so a malformed word degrades to silence.
    pub(crate) fn from_bits(bits: u64) -> Self {
        let bytes = bits.to_le_bytes();
        let mut mods = [0u8; OP_COUNT];
        mods.copy_from_slice(&bytes[1..1 + OP_COUNT]);
        Self {
            operator_count: bytes[0].min(OP_COUNT as u8),
            mods,
            outs: bytes[7],
        }
    }

    /// Distance of each operator from the output stage (carriers are 0).
    pub fn depths(&self) -> [u8; OP_COUNT] {
        let mut depth = [0u8; OP_COUNT];
        let count = self.operator_count();
        // Sources always have a higher index, so one ascending pass settles them.
        for i in 0..count {
            for m in (i + 1)..count {
                if self.mods[i] & (1 << m) != 0 {
                    depth[m] = depth[m].max(depth[i] + 1);
                }
            }
        }
        depth
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::dx7_1()
    }
}

impl TryFrom<RawAlgorithm> for Algorithm {
    type Error = AlgorithmError;

    fn try_from(raw: RawAlgorithm) -> Result<Self, Self::Error> {
        Algorithm::new(raw.operator_count as usize, &raw.mods, raw.outs)
    }
}

impl From<Algorithm> for RawAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        Self {
            operator_count: algorithm.operator_count,
            mods: algorithm.mods().to_vec(),
            outs: algorithm.outs,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm ({} operators):", self.operator_count())?;
        for i in 0..self.operator_count() {
            write!(f, "  Operator {i}")?;
            let sources: Vec<String> = (i..self.operator_count())
                .filter(|&m| self.mods[i] & (1 << m) != 0)
                .map(|m| {
                    if m == i {
                        "self (feedback)".to_string()
                    } else {
                        format!("Operator {m}")
                    }
                })
                .collect();
            if !sources.is_empty() {
                write!(f, " ← {}", sources.join(", "))?;
            }
            if self.is_output(i) {
                write!(f, " → OUT")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
