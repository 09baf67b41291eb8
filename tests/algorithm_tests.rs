use polyfm::synth::algorithm::Algorithm;
use polyfm::synth::error::AlgorithmError;
use polyfm::synth::OP_COUNT;

#[test]
fn test_builtin_algorithms_pass_validation() {
    for algorithm in [
        Algorithm::simple(),
        Algorithm::stack_2(),
        Algorithm::feedback_1(),
        Algorithm::dual_pair(),
        Algorithm::dx7_1(),
    ] {
        let rebuilt = Algorithm::new(algorithm.operator_count(), algorithm.mods(), algorithm.outs());
        assert_eq!(rebuilt, Ok(algorithm), "{algorithm}");
    }
}

#[test]
fn test_rejects_modulation_from_lower_index() {
    // Operator 2 modulated by operator 0 would need a forward pass.
    let result = Algorithm::new(3, &[0, 0, 0b001], 0b001);
    assert_eq!(
        result,
        Err(AlgorithmError::ForwardModulation {
            operator: 2,
            source: 0
        })
    );
}

#[test]
fn test_rejects_out_of_range_indices() {
    assert_eq!(
        Algorithm::new(0, &[], 0b1),
        Err(AlgorithmError::OperatorCount {
            count: 0,
            max: OP_COUNT
        })
    );
    assert!(matches!(
        Algorithm::new(OP_COUNT + 1, &[], 0b1),
        Err(AlgorithmError::OperatorCount { .. })
    ));
    assert_eq!(
        Algorithm::new(2, &[0b100], 0b1),
        Err(AlgorithmError::SourceOutOfRange {
            operator: 0,
            source: 2,
            count: 2
        })
    );
    assert_eq!(
        Algorithm::new(2, &[0, 0, 0b100], 0b1),
        Err(AlgorithmError::UnusedSlotModulated { operator: 2 })
    );
    assert_eq!(
        Algorithm::new(2, &[0b10, 0], 0b100),
        Err(AlgorithmError::OutputOutOfRange {
            output: 2,
            count: 2
        })
    );
    assert_eq!(Algorithm::new(2, &[0b10, 0], 0), Err(AlgorithmError::NoOutputs));
}

#[test]
fn test_self_feedback_is_allowed() {
    let algorithm = Algorithm::new(2, &[0b11, 0b10], 0b1).unwrap();
    assert_eq!(algorithm.modulation_mask(0), 0b11);
    assert_eq!(algorithm.modulation_mask(1), 0b10);
    assert_eq!(algorithm.modulation_mask(OP_COUNT + 3), 0);
    assert!(algorithm.is_output(0));
    assert!(!algorithm.is_output(1));
    assert_eq!(algorithm.output_count(), 1);
}

#[test]
fn test_packed_form_round_trips() {
    let algorithm = Algorithm::dx7_1();
    let json = serde_json::to_string(&algorithm).unwrap();
    let back: Algorithm = serde_json::from_str(&json).unwrap();
    assert_eq!(back, algorithm);
    assert_ne!(algorithm.to_bits(), Algorithm::dual_pair().to_bits());
}

#[test]
fn test_deserializing_invalid_topology_fails() {
    let json = r#"{ "operator_count": 2, "mods": [0, 1], "outs": 1 }"#;
    assert!(serde_json::from_str::<Algorithm>(json).is_err());
}

#[test]
fn test_depths_follow_modulation_chains() {
    let depths = Algorithm::dx7_1().depths();
    assert_eq!(depths, [0, 1, 0, 1, 2, 3]);

    let depths = Algorithm::dual_pair().depths();
    assert_eq!(&depths[..4], &[0, 1, 0, 1]);
}

#[test]
fn test_display_lists_sources_and_outputs() {
    let text = Algorithm::dual_pair().to_string();
    println!("{text}");
    assert!(text.contains("Operator 0 ← Operator 1 → OUT"));
    assert!(text.contains("Operator 1 ← self (feedback)"));
}
