//! End-to-end closed-loop scenarios.

use bs_controls::{Gains, PidConfig, PidVariant};
use bs_sim::{
    ConstantOffset, Engine, NoiseConfig, Phase, PlantConfig, RunOptions, SimConfig, UniformJitter,
};

fn boiler_config() -> SimConfig {
    SimConfig {
        plant: PlantConfig {
            initial_temp_c: 80.0,
            ambient_temp_c: 27.0,
            ..PlantConfig::default()
        },
        controller: PidConfig::default()
            .with_variant(PidVariant::IncrementalErrorForm)
            .with_gains(Gains::new(30.0, 0.7, 0.0)),
        ..SimConfig::default()
    }
}

#[test]
fn tracks_target_from_eighty_degrees() {
    let mut engine = Engine::new(boiler_config()).unwrap();
    let record = engine.run(&RunOptions::default()).unwrap();

    assert_eq!(record.len(), 6000);
    assert!(
        record.max_temperature() <= 115.0,
        "overshoot to {}",
        record.max_temperature()
    );
    for step in &record.steps()[record.len() - 50..] {
        assert!(
            (step.temperature_c - 100.0).abs() <= 2.0,
            "t={} T={}",
            step.time_s,
            step.temperature_c
        );
    }
    // Once the first control period has charged the element, warm-up is
    // monotonic until the boiler is close to target.
    let temps = record.temperatures();
    let near = temps
        .iter()
        .position(|t| *t >= 98.0)
        .expect("never reached 98 degrees");
    for k in 11..near {
        assert!(
            temps[k] >= temps[k - 1],
            "cooled at t={} ({} -> {})",
            record.steps()[k].time_s,
            temps[k - 1],
            temps[k]
        );
    }
    assert!(record.steps().iter().all(|s| (0.0..=100.0).contains(&s.duty)));
    assert!(
        record
            .steps()
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.heater_fraction))
    );
}

#[test]
fn shot_dips_then_recovers() {
    let mut engine = Engine::new(boiler_config()).unwrap();
    let opts = RunOptions::default().with_shot(460.0, 490.0);
    let record = engine.run(&opts).unwrap();

    let during: Vec<_> = record
        .steps()
        .iter()
        .filter(|s| s.time_s >= 460.0 && s.time_s < 490.0)
        .collect();
    let lowest = during
        .iter()
        .map(|s| s.temperature_c)
        .fold(f64::INFINITY, f64::min);
    assert!(lowest < 100.0, "no dip during the shot, lowest {lowest}");

    assert!(record.steps().iter().any(|s| s.phase == Phase::Shot));
    assert!(record.steps().iter().any(|s| s.phase == Phase::PostShot));
    assert_eq!(record.last().unwrap().phase, Phase::Recovered);

    for step in &record.steps()[record.len() - 50..] {
        assert!((step.temperature_c - 100.0).abs() <= 2.0);
    }
}

#[test]
fn shot_draw_matches_disturbance_free_run_until_start() {
    let mut engine = Engine::new(boiler_config()).unwrap();
    let plain = engine.run(&RunOptions::default()).unwrap();
    let shot = engine
        .run(&RunOptions::default().with_shot(460.0, 490.0))
        .unwrap();
    assert_eq!(plain.steps()[..4600], shot.steps()[..4600]);
    assert!(shot.steps()[4600].temperature_c < plain.steps()[4600].temperature_c);
}

#[test]
fn repeated_runs_are_identical() {
    let mut engine = Engine::new(boiler_config()).unwrap();
    let a = engine.run(&RunOptions::default()).unwrap();
    let b = engine.run(&RunOptions::default()).unwrap();
    assert_eq!(a, b);

    let mut noisy = Engine::new(boiler_config())
        .unwrap()
        .with_noise(Box::new(UniformJitter::new(0.5, 42).unwrap()));
    let a = noisy.run(&RunOptions::default()).unwrap();
    let b = noisy.run(&RunOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.steps(), plain_steps().as_slice());
}

fn plain_steps() -> Vec<bs_sim::StepRecord> {
    let mut engine = Engine::new(boiler_config()).unwrap();
    engine.run(&RunOptions::default()).unwrap().steps().to_vec()
}

#[test]
fn configured_noise_is_seeded() {
    let mut config = boiler_config();
    config.noise = Some(NoiseConfig {
        amplitude_c: 0.5,
        seed: 42,
    });
    let mut from_config = Engine::new(config).unwrap();
    let mut injected = Engine::new(boiler_config())
        .unwrap()
        .with_noise(Box::new(UniformJitter::new(0.5, 42).unwrap()));
    assert_eq!(
        from_config.run(&RunOptions::default()).unwrap(),
        injected.run(&RunOptions::default()).unwrap()
    );
}

#[test]
fn sensor_offset_shifts_settling_point() {
    let mut engine = Engine::new(boiler_config())
        .unwrap()
        .with_noise(Box::new(ConstantOffset(1.5)));
    let record = engine.run(&RunOptions::default()).unwrap();
    let tail = &record.steps()[record.len() - 50..];
    let mean = tail.iter().map(|s| s.temperature_c).sum::<f64>() / tail.len() as f64;
    assert!(mean < 99.5, "settled at {mean}");
}

#[test]
fn jsonl_dump_has_one_line_per_step() {
    let mut engine = Engine::new(boiler_config()).unwrap();
    let opts = RunOptions {
        duration_s: 5.0,
        ..RunOptions::default()
    };
    let record = engine.run(&opts).unwrap();
    let mut buf = Vec::new();
    record.write_jsonl(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 50);
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["phase"], "idle");
    assert_eq!(first["time_s"], 0.0);
}
