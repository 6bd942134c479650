//! Scenario parameters and input validation
//!
//! A scenario is fully described by a `ScenarioParameters` value: the cPRA
//! threshold class, two dimensionless hazard multipliers for the xenograft
//! arm, the xenograft supply level, and the horizon in whole years. The
//! value is immutable for the duration of a run.
//!
//! # Critical Invariants
//!
//! 1. Unsupported threshold classes are rejected explicitly; there is no
//!    silent fallback to a default class.
//! 2. Validation happens before a run starts; the stepper never sees
//!    negative multipliers or a non-positive horizon.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported to the caller before a run proceeds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Parameter outside its valid range (negative multiplier, zero
    /// horizon, negative supply)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// cPRA threshold class not in the supported calibration set
    #[error("unsupported cPRA threshold: {0}")]
    UnsupportedThreshold(String),
}

/// cPRA threshold class
///
/// Selects which baseline calibration table applies. The threshold is the
/// cPRA percentile at which the high-priority band starts; the band keys
/// mirror the configuration vocabulary of the calibration data
/// (`"0-85"` / `"85-100"` for [`CpraThreshold::Cpra85`]).
///
/// # Example
/// ```
/// use waitlist_simulator_core_rs::CpraThreshold;
///
/// let t = CpraThreshold::from_band("0-85").unwrap();
/// assert_eq!(t, CpraThreshold::Cpra85);
/// assert_eq!(t.high_band(), "85-100");
///
/// assert!(CpraThreshold::from_band("0-50").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpraThreshold {
    /// High-priority band starts at cPRA 80 (bands "0-80" / "80-100")
    #[serde(rename = "0-80")]
    Cpra80,

    /// High-priority band starts at cPRA 85 (bands "0-85" / "85-100")
    #[serde(rename = "0-85")]
    Cpra85,

    /// High-priority band starts at cPRA 95 (bands "0-95" / "95-100")
    #[serde(rename = "0-95")]
    Cpra95,
}

impl CpraThreshold {
    /// All supported threshold classes
    pub const ALL: [CpraThreshold; 3] = [
        CpraThreshold::Cpra80,
        CpraThreshold::Cpra85,
        CpraThreshold::Cpra95,
    ];

    /// Parse a band key ("0-85") or bare percentile ("85")
    ///
    /// Unknown values are an error, never substituted with a default.
    pub fn from_band(key: &str) -> Result<Self, SimulationError> {
        match key {
            "0-80" | "80" => Ok(CpraThreshold::Cpra80),
            "0-85" | "85" => Ok(CpraThreshold::Cpra85),
            "0-95" | "95" => Ok(CpraThreshold::Cpra95),
            other => Err(SimulationError::UnsupportedThreshold(other.to_string())),
        }
    }

    /// cPRA percentile at which the high-priority band starts
    pub fn percentile(&self) -> u8 {
        match self {
            CpraThreshold::Cpra80 => 80,
            CpraThreshold::Cpra85 => 85,
            CpraThreshold::Cpra95 => 95,
        }
    }

    /// Band key of the standard-priority class, e.g. "0-85"
    pub fn low_band(&self) -> &'static str {
        match self {
            CpraThreshold::Cpra80 => "0-80",
            CpraThreshold::Cpra85 => "0-85",
            CpraThreshold::Cpra95 => "0-95",
        }
    }

    /// Band key of the high-priority class, e.g. "85-100"
    pub fn high_band(&self) -> &'static str {
        match self {
            CpraThreshold::Cpra80 => "80-100",
            CpraThreshold::Cpra85 => "85-100",
            CpraThreshold::Cpra95 => "95-100",
        }
    }
}

/// Xenograft supply level for the intervention scenario
///
/// Either an absolute number of organs per year, or a multiple of the
/// threshold class's calibrated baseline supply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum XenoSupply {
    /// Fixed number of xenografts offered per year
    Absolute { organs_per_year: f64 },

    /// Multiple of the calibrated baseline supply for the threshold class
    ///
    /// `factor = 1.0` is the baseline scenario; `factor = 0.0` represents
    /// no intervention.
    BaselineMultiple { factor: f64 },
}

impl XenoSupply {
    /// Baseline supply for the chosen threshold class
    pub fn baseline() -> Self {
        XenoSupply::BaselineMultiple { factor: 1.0 }
    }

    /// No xenografts offered
    pub fn none() -> Self {
        XenoSupply::Absolute {
            organs_per_year: 0.0,
        }
    }

    /// Resolve to organs per year against a baseline magnitude
    pub fn organs_per_year(&self, baseline_supply: f64) -> f64 {
        match self {
            XenoSupply::Absolute { organs_per_year } => *organs_per_year,
            XenoSupply::BaselineMultiple { factor } => factor * baseline_supply,
        }
    }

    fn magnitude(&self) -> f64 {
        match self {
            XenoSupply::Absolute { organs_per_year } => *organs_per_year,
            XenoSupply::BaselineMultiple { factor } => *factor,
        }
    }
}

/// Complete inputs for one scenario run
///
/// # Example
/// ```
/// use waitlist_simulator_core_rs::{CpraThreshold, ScenarioParameters, XenoSupply};
///
/// let params = ScenarioParameters {
///     threshold: CpraThreshold::Cpra85,
///     graft_failure_multiplier: 1.0,
///     post_transplant_death_multiplier: 1.0,
///     xeno_supply: XenoSupply::baseline(),
///     horizon_years: 10,
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    /// cPRA threshold class selecting the baseline calibration
    pub threshold: CpraThreshold,

    /// Xenograft graft-failure hazard as a multiple of the high-class
    /// standard-organ baseline (0 = grafts never fail)
    pub graft_failure_multiplier: f64,

    /// Xenograft post-transplant death hazard as a multiple of the
    /// high-class standard-organ baseline
    pub post_transplant_death_multiplier: f64,

    /// Xenograft supply offered to the high-priority class
    pub xeno_supply: XenoSupply,

    /// Simulated duration in whole years
    pub horizon_years: u32,
}

impl ScenarioParameters {
    /// Check all input constraints
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidParameter` if a multiplier or the supply
    /// magnitude is negative or non-finite, or the horizon is zero.
    pub fn validate(&self) -> Result<(), SimulationError> {
        check_nonnegative(
            "graft_failure_multiplier",
            self.graft_failure_multiplier,
        )?;
        check_nonnegative(
            "post_transplant_death_multiplier",
            self.post_transplant_death_multiplier,
        )?;
        check_nonnegative("xeno_supply", self.xeno_supply.magnitude())?;

        if self.horizon_years == 0 {
            return Err(SimulationError::InvalidParameter(
                "horizon_years must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_nonnegative(name: &str, value: f64) -> Result<(), SimulationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::InvalidParameter(format!(
            "{} must be finite and >= 0, got {}",
            name, value
        )));
    }
    Ok(())
}
