//! Scenario configuration registry
//!
//! Hosts that precompute trajectories need a stable identity for each
//! parameter set: "which named dataset corresponds to this configuration?"
//! The registry keeps a bidirectional mapping between human-readable names
//! and parameter sets, persisted as a JSON document:
//!
//! - `name_to_config`: name → full parameter set
//! - `config_to_name`: SHA-256 of the canonical parameter encoding → name
//!
//! Registering the same configuration twice returns the existing name;
//! reusing a name for a different configuration is rejected unless
//! overwriting is requested. Names can be caller-chosen or generated
//! (`exp_` plus eight hex characters).
//!
//! The simulation engine never consults the registry; it exists for hosts
//! that resolve parameter tuples to precomputed datasets.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::models::params::ScenarioParameters;

/// Registry failures
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying file read/write failure
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Registry file is not valid JSON for this schema
    #[error("registry format error: {0}")]
    Format(#[from] serde_json::Error),

    /// Name already maps to a different configuration
    #[error("name '{0}' is already registered with a different configuration")]
    NameTaken(String),

    /// No configuration registered under the name
    #[error("no configuration registered under name '{0}'")]
    NotFound(String),
}

/// Content hash of a parameter set
///
/// SHA-256 over the canonical JSON encoding; struct field order makes the
/// encoding deterministic.
pub fn config_hash(params: &ScenarioParameters) -> String {
    let json = serde_json::to_string(params)
        .expect("scenario parameters always serialize");

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bidirectional name ↔ configuration mapping
///
/// # Example
/// ```
/// use waitlist_simulator_core_rs::{
///     CpraThreshold, ScenarioParameters, ScenarioRegistry, XenoSupply,
/// };
///
/// let params = ScenarioParameters {
///     threshold: CpraThreshold::Cpra85,
///     graft_failure_multiplier: 1.0,
///     post_transplant_death_multiplier: 1.0,
///     xeno_supply: XenoSupply::baseline(),
///     horizon_years: 10,
/// };
///
/// let mut registry = ScenarioRegistry::default();
/// let name = registry
///     .register(&params, Some("baseline_85"), false)
///     .unwrap();
/// assert_eq!(name, "baseline_85");
///
/// // Same configuration resolves to the existing name.
/// let again = registry.register(&params, None, false).unwrap();
/// assert_eq!(again, "baseline_85");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRegistry {
    name_to_config: BTreeMap<String, ScenarioParameters>,
    config_to_name: BTreeMap<String, String>,
}

impl ScenarioRegistry {
    /// Load a registry from a JSON file
    ///
    /// A missing file yields an empty registry, so first use needs no
    /// setup step.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Persist the registry to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Register a configuration, returning its name
    ///
    /// - Configuration already registered: returns the existing name
    ///   (regardless of the requested name) unless `overwrite` remaps it.
    /// - Requested name bound to a different configuration: error unless
    ///   `overwrite`.
    /// - No name requested: a fresh `exp_<8 hex>` name is generated.
    pub fn register(
        &mut self,
        params: &ScenarioParameters,
        name: Option<&str>,
        overwrite: bool,
    ) -> Result<String, RegistryError> {
        let hash = config_hash(params);

        if let Some(existing) = self.config_to_name.get(&hash) {
            let existing = existing.clone();
            match name {
                // Same config, same (or unspecified) name: nothing to do.
                None => return Ok(existing),
                Some(requested) if requested == existing => return Ok(existing),
                // Same config under another name: keep the existing
                // binding unless explicitly overwriting.
                Some(requested) => {
                    if !overwrite {
                        return Ok(existing);
                    }
                    let requested = requested.to_string();
                    self.bind(requested.clone(), *params, hash);
                    return Ok(requested);
                }
            }
        }

        let name = match name {
            Some(requested) => {
                if let Some(bound) = self.name_to_config.get(requested) {
                    let bound_hash = config_hash(bound);
                    if bound_hash != hash && !overwrite {
                        return Err(RegistryError::NameTaken(requested.to_string()));
                    }
                    // Drop the stale reverse mapping if it points here.
                    if self.config_to_name.get(&bound_hash).map(String::as_str)
                        == Some(requested)
                    {
                        self.config_to_name.remove(&bound_hash);
                    }
                }
                requested.to_string()
            }
            None => self.generate_name(),
        };

        self.bind(name.clone(), *params, hash);
        Ok(name)
    }

    /// Configuration registered under a name
    pub fn get(&self, name: &str) -> Result<&ScenarioParameters, RegistryError> {
        self.name_to_config
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Name of a configuration, if it is registered
    pub fn name_for(&self, params: &ScenarioParameters) -> Option<&str> {
        self.config_to_name
            .get(&config_hash(params))
            .map(String::as_str)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.name_to_config.keys().map(String::as_str).collect()
    }

    /// Number of registered configurations
    pub fn len(&self) -> usize {
        self.name_to_config.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.name_to_config.is_empty()
    }

    fn bind(&mut self, name: String, params: ScenarioParameters, hash: String) {
        self.name_to_config.insert(name.clone(), params);
        self.config_to_name.insert(hash, name);
    }

    fn generate_name(&self) -> String {
        // Generated names must be unique within the registry.
        loop {
            let id = Uuid::new_v4().simple().to_string();
            let name = format!("exp_{}", &id[..8]);
            if !self.name_to_config.contains_key(&name) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::{CpraThreshold, XenoSupply};

    fn params(horizon_years: u32) -> ScenarioParameters {
        ScenarioParameters {
            threshold: CpraThreshold::Cpra85,
            graft_failure_multiplier: 1.0,
            post_transplant_death_multiplier: 1.0,
            xeno_supply: XenoSupply::baseline(),
            horizon_years,
        }
    }

    #[test]
    fn test_hash_is_deterministic_and_content_sensitive() {
        assert_eq!(config_hash(&params(10)), config_hash(&params(10)));
        assert_ne!(config_hash(&params(10)), config_hash(&params(5)));
    }

    #[test]
    fn test_register_generates_name() {
        let mut registry = ScenarioRegistry::default();
        let name = registry.register(&params(10), None, false).unwrap();

        assert!(name.starts_with("exp_"));
        assert_eq!(name.len(), 12);
        assert_eq!(registry.get(&name).unwrap(), &params(10));
    }

    #[test]
    fn test_duplicate_config_returns_existing_name() {
        let mut registry = ScenarioRegistry::default();
        registry
            .register(&params(10), Some("baseline"), false)
            .unwrap();

        let name = registry
            .register(&params(10), Some("other_name"), false)
            .unwrap();
        assert_eq!(name, "baseline");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_name_conflict_rejected_without_overwrite() {
        let mut registry = ScenarioRegistry::default();
        registry
            .register(&params(10), Some("baseline"), false)
            .unwrap();

        let err = registry
            .register(&params(5), Some("baseline"), false)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NameTaken(name) if name == "baseline"));
    }

    #[test]
    fn test_overwrite_rebinds_name() {
        let mut registry = ScenarioRegistry::default();
        registry
            .register(&params(10), Some("baseline"), false)
            .unwrap();

        let name = registry
            .register(&params(5), Some("baseline"), true)
            .unwrap();
        assert_eq!(name, "baseline");
        assert_eq!(registry.get("baseline").unwrap(), &params(5));
        // The old configuration's reverse mapping is gone.
        assert_eq!(registry.name_for(&params(10)), None);
    }

    #[test]
    fn test_name_for_round_trip() {
        let mut registry = ScenarioRegistry::default();
        let name = registry.register(&params(10), None, false).unwrap();

        assert_eq!(registry.name_for(&params(10)), Some(name.as_str()));
        assert_eq!(registry.name_for(&params(7)), None);
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = ScenarioRegistry::default();
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::NotFound(_))
        ));
    }
}
