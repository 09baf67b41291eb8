use polyfm::synth::algorithm::Algorithm;
use polyfm::synth::error::{AlgorithmError, PresetError};
use polyfm::synth::instrument::Instrument;
use polyfm::synth::preset::{InstrumentPreset, OPERATOR_BLOCK_LEN};
use polyfm::synth::waveform::Waveform;
use polyfm::synth::OP_COUNT;

fn bell() -> InstrumentPreset {
    let mut preset = InstrumentPreset {
        name: "Bell".to_string(),
        algorithm: Algorithm::dual_pair(),
        velocity_sensitivity: 0.5,
        ..InstrumentPreset::default()
    };
    for (i, op) in preset.operators.iter_mut().enumerate() {
        op.envelope.attack = 0.001 * (i + 1) as f32;
        op.envelope.release = 1.5;
        op.oscillator.frequency_ratio = 1.0 + i as f32 * 0.5;
    }
    preset.operators[1].oscillator.waveform = Waveform::AbsoluteSine;
    preset.operators[3].oscillator.amplitude = 0.25;
    preset
}

#[test]
fn test_json_round_trip() {
    let preset = bell();
    let json = preset.to_json().unwrap();
    assert!(json.contains("\"Bell\""));
    assert_eq!(InstrumentPreset::from_json(&json).unwrap(), preset);
}

#[test]
fn test_json_fills_missing_fields_with_defaults() {
    let preset = InstrumentPreset::from_json(r#"{ "name": "Sparse" }"#).unwrap();
    assert_eq!(preset.name, "Sparse");
    assert_eq!(preset.algorithm, Algorithm::default());
    assert_eq!(preset.operators, InstrumentPreset::default().operators);
}

#[test]
fn test_json_rejects_invalid_algorithm() {
    let json = r#"{ "algorithm": { "operator_count": 2, "mods": [0, 1], "outs": 1 } }"#;
    assert!(matches!(
        InstrumentPreset::from_json(json),
        Err(PresetError::Json(_))
    ));
}

#[test]
fn test_binary_layout() {
    let preset = InstrumentPreset::default();
    let count = preset.algorithm.operator_count();
    let bytes = preset.to_bytes();

    let header = 3 + count;
    assert_eq!(OPERATOR_BLOCK_LEN, 30);
    assert_eq!(bytes.len(), header + count * OPERATOR_BLOCK_LEN);
    assert_eq!(bytes[0], b'A');
    assert_eq!(bytes[1] as usize, count);
    assert_eq!(&bytes[2..2 + count], preset.algorithm.mods());
    assert_eq!(bytes[2 + count], preset.algorithm.outs());

    for i in 0..count {
        let block = header + i * OPERATOR_BLOCK_LEN;
        assert_eq!(bytes[block], b'O', "operator {i} tag");
        let attack = f32::from_le_bytes(bytes[block + 1..block + 5].try_into().unwrap());
        assert_eq!(attack, preset.operators[i].envelope.attack);
        assert_eq!(bytes[block + 21], preset.operators[i].oscillator.waveform.code());
        let ratio = f32::from_le_bytes(bytes[block + 26..block + 30].try_into().unwrap());
        assert_eq!(ratio, preset.operators[i].oscillator.frequency_ratio);
    }
}

#[test]
fn test_binary_round_trip_keeps_used_operators() {
    let preset = bell();
    let count = preset.algorithm.operator_count();
    let decoded = InstrumentPreset::from_bytes(&preset.to_bytes()).unwrap();

    assert_eq!(decoded.algorithm, preset.algorithm);
    assert_eq!(&decoded.operators[..count], &preset.operators[..count]);
    // Not carried by the binary form.
    assert!(decoded.name.is_empty());
    assert_eq!(decoded.velocity_sensitivity, 0.0);
    for op in &decoded.operators[count..OP_COUNT] {
        assert_eq!(*op, Default::default());
    }
}

#[test]
fn test_binary_errors() {
    let bytes = InstrumentPreset::default().to_bytes();

    assert!(matches!(
        InstrumentPreset::from_bytes(&bytes[..bytes.len() - 1]),
        Err(PresetError::Truncated { .. })
    ));
    assert!(matches!(
        InstrumentPreset::from_bytes(&[]),
        Err(PresetError::Truncated { .. })
    ));

    let mut bad_tag = bytes.clone();
    bad_tag[0] = b'X';
    assert!(matches!(
        InstrumentPreset::from_bytes(&bad_tag),
        Err(PresetError::UnexpectedTag {
            expected: b'A',
            found: b'X',
            offset: 0
        })
    ));

    let count = bytes[1] as usize;
    let mut bad_waveform = bytes.clone();
    bad_waveform[3 + count + 21] = 9;
    assert!(matches!(
        InstrumentPreset::from_bytes(&bad_waveform),
        Err(PresetError::UnknownWaveform {
            operator: 0,
            code: 9
        })
    ));

    // Operator 1 modulated by operator 0.
    let mut bad_algorithm = bytes.clone();
    bad_algorithm[3] = 0b1;
    assert!(matches!(
        InstrumentPreset::from_bytes(&bad_algorithm),
        Err(PresetError::Algorithm(AlgorithmError::ForwardModulation {
            operator: 1,
            source: 0
        }))
    ));

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        InstrumentPreset::from_bytes(&trailing),
        Err(PresetError::TrailingBytes { offset }) if offset == bytes.len()
    ));
}

#[test]
fn test_instrument_load_and_export() {
    let preset = bell();
    let instrument = Instrument::from_preset(&preset);
    assert_eq!(instrument.name(), "Bell");
    assert_eq!(instrument.algorithm(), Algorithm::dual_pair());
    assert_eq!(instrument.to_preset(), preset);

    instrument.load(&InstrumentPreset::default());
    assert_eq!(instrument.to_preset(), InstrumentPreset::default());
}
