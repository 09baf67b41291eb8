use polyfm::synth::envelope::{Envelope, EnvelopeConfig, EnvelopeStage};

const DT: f32 = 1.0 / 48_000.0;

fn config() -> EnvelopeConfig {
    EnvelopeConfig {
        attack: 0.01,
        attack_level: 0.9,
        decay: 0.02,
        sustain: 0.4,
        release: 0.03,
    }
}

/// Runs `env` until it leaves `stage`, checking every step with `check(previous, current)`.
fn run_stage(env: &mut Envelope, stage: EnvelopeStage, check: impl Fn(f32, f32)) {
    let mut previous = env.level();
    for _ in 0..1_000_000 {
        if env.stage() != stage {
            return;
        }
        env.update(DT);
        check(previous, env.level());
        previous = env.level();
    }
    panic!("envelope stuck in {stage:?}");
}

#[test]
fn test_stages_are_monotonic_and_land_exactly() {
    let cfg = config();
    let mut env = Envelope::new();
    env.trigger(&cfg);
    assert_eq!(env.stage(), EnvelopeStage::Attack);
    assert_eq!(env.level(), 0.0);

    run_stage(&mut env, EnvelopeStage::Attack, |prev, cur| assert!(cur >= prev));
    assert_eq!(env.stage(), EnvelopeStage::Decay);
    assert_eq!(env.level(), cfg.attack_level);

    run_stage(&mut env, EnvelopeStage::Decay, |prev, cur| assert!(cur <= prev));
    assert_eq!(env.stage(), EnvelopeStage::Sustain);
    assert_eq!(env.level(), cfg.sustain);

    for _ in 0..100 {
        assert!(env.update(DT));
        assert_eq!(env.evaluate(), cfg.sustain);
    }

    env.release();
    run_stage(&mut env, EnvelopeStage::Release, |prev, cur| assert!(cur <= prev));
    assert_eq!(env.stage(), EnvelopeStage::Idle);
    assert_eq!(env.level(), 0.0);
}

#[test]
fn test_idle_is_silent_for_any_dt() {
    let mut env = Envelope::new();
    env.trigger(&config());
    env.release();
    while env.update(DT) {}

    for dt in [0.0, DT, 1.0, 1000.0] {
        assert!(!env.update(dt));
        assert_eq!(env.evaluate(), 0.0);
    }
    env.release();
    assert!(!env.update(DT));
}

#[test]
fn test_zero_durations_jump_to_next_stage() {
    let cfg = EnvelopeConfig {
        attack: 0.0,
        attack_level: 1.0,
        decay: 0.0,
        sustain: 0.5,
        release: 0.0,
    };
    let mut env = Envelope::new();
    env.trigger(&cfg);

    assert!(env.update(DT));
    assert_eq!(env.stage(), EnvelopeStage::Decay);
    assert_eq!(env.level(), 1.0);

    assert!(env.update(DT));
    assert_eq!(env.stage(), EnvelopeStage::Sustain);
    assert_eq!(env.level(), 0.5);

    env.release();
    assert!(!env.update(DT));
    assert_eq!(env.evaluate(), 0.0);
}

#[test]
fn test_retrigger_restarts_attack_from_current_level() {
    let cfg = config();
    let mut env = Envelope::new();
    env.trigger(&cfg);
    run_stage(&mut env, EnvelopeStage::Attack, |_, _| {});
    run_stage(&mut env, EnvelopeStage::Decay, |_, _| {});
    env.release();
    for _ in 0..100 {
        env.update(DT);
    }
    let level = env.level();
    assert!(level > 0.0 && level < cfg.sustain);

    env.retrigger();
    assert_eq!(env.stage(), EnvelopeStage::Attack);
    assert_eq!(env.level(), level);
    env.update(DT);
    assert!(env.level() > level);
}

#[test]
fn test_sustain_follows_live_edits() {
    let mut cfg = config();
    let mut env = Envelope::new();
    env.trigger(&cfg);
    run_stage(&mut env, EnvelopeStage::Attack, |_, _| {});
    run_stage(&mut env, EnvelopeStage::Decay, |_, _| {});

    cfg.sustain = 0.25;
    env.configure(&cfg);
    env.update(DT);
    assert_eq!(env.evaluate(), 0.25);
}

#[test]
fn test_sub_sample_attack_lands_on_attack_level() {
    let cfg = EnvelopeConfig {
        attack: 1e-6,
        attack_level: 1.0,
        decay: 0.5,
        sustain: 0.5,
        release: 0.5,
    };
    let mut env = Envelope::new();
    env.trigger(&cfg);

    assert!(env.update(DT));
    assert_eq!(env.stage(), EnvelopeStage::Decay);
    assert_eq!(env.level(), 1.0);

    run_stage(&mut env, EnvelopeStage::Decay, |_, cur| assert!(cur <= 1.0));
    assert_eq!(env.level(), 0.5);
}
