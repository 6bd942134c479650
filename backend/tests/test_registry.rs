//! Registry integration tests: naming semantics and JSON persistence.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use waitlist_simulator_core_rs::{
    config_hash, CpraThreshold, RegistryError, ScenarioParameters, ScenarioRegistry, XenoSupply,
};

fn params(threshold: CpraThreshold, horizon_years: u32) -> ScenarioParameters {
    ScenarioParameters {
        threshold,
        graft_failure_multiplier: 1.0,
        post_transplant_death_multiplier: 1.0,
        xeno_supply: XenoSupply::baseline(),
        horizon_years,
    }
}

fn scratch_file(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "waitlist_registry_{}_{}_{}.json",
        tag,
        std::process::id(),
        nanos
    ))
}

#[test]
fn test_save_load_round_trip() {
    let path = scratch_file("round_trip");

    let mut registry = ScenarioRegistry::default();
    registry
        .register(&params(CpraThreshold::Cpra85, 10), Some("baseline_85"), false)
        .unwrap();
    registry
        .register(&params(CpraThreshold::Cpra95, 5), None, false)
        .unwrap();
    registry.save(&path).unwrap();

    let restored = ScenarioRegistry::load(&path).unwrap();
    assert_eq!(restored, registry);
    assert_eq!(
        restored.get("baseline_85").unwrap(),
        &params(CpraThreshold::Cpra85, 10)
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_missing_file_yields_empty_registry() {
    let path = scratch_file("missing");
    let registry = ScenarioRegistry::load(&path).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_load_rejects_malformed_file() {
    let path = scratch_file("malformed");
    std::fs::write(&path, "not json").unwrap();

    let err = ScenarioRegistry::load(&path).unwrap_err();
    assert!(matches!(err, RegistryError::Format(_)));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_registration_survives_persistence() {
    let path = scratch_file("reregister");

    let mut registry = ScenarioRegistry::default();
    let name = registry
        .register(&params(CpraThreshold::Cpra80, 10), None, false)
        .unwrap();
    registry.save(&path).unwrap();

    // A fresh load resolves the same configuration to the same name.
    let mut restored = ScenarioRegistry::load(&path).unwrap();
    let resolved = restored
        .register(&params(CpraThreshold::Cpra80, 10), None, false)
        .unwrap();
    assert_eq!(resolved, name);
    assert_eq!(restored.len(), 1);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_hash_distinguishes_every_parameter() {
    let base = params(CpraThreshold::Cpra85, 10);

    let mut other = base;
    other.graft_failure_multiplier = 1.5;
    assert_ne!(config_hash(&base), config_hash(&other));

    let mut other = base;
    other.xeno_supply = XenoSupply::Absolute {
        organs_per_year: 2_000.0,
    };
    assert_ne!(config_hash(&base), config_hash(&other));

    let mut other = base;
    other.threshold = CpraThreshold::Cpra95;
    assert_ne!(config_hash(&base), config_hash(&other));
}

#[test]
fn test_name_conflict_and_overwrite_flow() {
    let mut registry = ScenarioRegistry::default();
    registry
        .register(&params(CpraThreshold::Cpra85, 10), Some("exp_main"), false)
        .unwrap();

    // Same name, different configuration: rejected without overwrite.
    let err = registry
        .register(&params(CpraThreshold::Cpra85, 20), Some("exp_main"), false)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NameTaken(_)));

    // With overwrite the name is rebound.
    registry
        .register(&params(CpraThreshold::Cpra85, 20), Some("exp_main"), true)
        .unwrap();
    assert_eq!(
        registry.get("exp_main").unwrap(),
        &params(CpraThreshold::Cpra85, 20)
    );
}
