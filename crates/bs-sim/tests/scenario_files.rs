//! The bundled scenario files load and run.

use std::path::PathBuf;

use bs_controls::PidVariant;
use bs_sim::{ControlMode, Engine, Scenario};

fn scenarios_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // repo root
    path.push("scenarios");
    path
}

#[test]
fn all_scenarios_load_and_run() {
    let mut entries: Vec<_> = std::fs::read_dir(scenarios_dir())
        .expect("scenarios directory")
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    entries.sort();
    assert!(!entries.is_empty());

    for path in entries {
        let scenario = Scenario::from_yaml_file(&path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        let mut engine = Engine::new(scenario.config.clone()).unwrap();
        let record = engine.run(&scenario.run).unwrap();
        assert!(!record.is_empty(), "{}", path.display());
        assert!(
            record.temperatures().iter().all(|t| t.is_finite()),
            "{}",
            path.display()
        );
    }
}

#[test]
fn shot_scenario_fields() {
    let scenario = Scenario::from_yaml_file(&scenarios_dir().join("02_shot.yaml")).unwrap();
    assert_eq!(
        scenario.config.controller.variant,
        PidVariant::AsymmetricMeasurementForm
    );
    assert_eq!(scenario.config.controller.kp_rising, Some(15.0));
    assert_eq!(scenario.run.shot.unwrap().start_s, 460.0);
    assert_eq!(scenario.config.noise.unwrap().seed, 7);
}

#[test]
fn thermostat_scenario_holds_band() {
    let scenario = Scenario::from_yaml_file(&scenarios_dir().join("03_thermostat.yaml")).unwrap();
    assert!(matches!(scenario.config.mode, ControlMode::Thermostat(_)));
    let mut engine = Engine::new(scenario.config).unwrap();
    let record = engine.run(&scenario.run).unwrap();
    let temps = record.temperatures();
    let tail = &temps[temps.len() - 600..];
    assert!(tail.iter().all(|t| (95.0..=110.0).contains(t)));
}
