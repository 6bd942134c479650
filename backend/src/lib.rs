//! Transplant Waitlist Simulator - Rust Engine
//!
//! Deterministic compartmental model of a scarce-organ waiting list under
//! a xenotransplantation intervention, compared against a no-intervention
//! counterfactual.
//!
//! # Architecture
//!
//! - **core**: Time grid (fixed quarter-year steps)
//! - **models**: Domain types (ScenarioParameters, PopulationSnapshot)
//! - **rates**: Calibration tables and the rate resolver
//! - **policy**: Scenario policy (counterfactual vs. intervention)
//! - **stepper**: Per-step compartment flows
//! - **runner**: Trajectory construction for both scenarios
//! - **metrics**: Comparative yearly series and summary metrics
//! - **registry**: Name ↔ configuration mapping for precomputed datasets
//!
//! # Critical Invariants
//!
//! 1. Compartment counts never go negative; flows are clamped
//! 2. Cumulative counters are monotone within a trajectory
//! 3. Each run is a pure function of its parameters (no global state,
//!    no randomness)
//!
//! # Example
//!
//! ```rust
//! use waitlist_simulator_core_rs::{
//!     run_scenario, CpraThreshold, ScenarioParameters, XenoSupply,
//! };
//!
//! let params = ScenarioParameters {
//!     threshold: CpraThreshold::Cpra85,
//!     graft_failure_multiplier: 1.0,
//!     post_transplant_death_multiplier: 1.0,
//!     xeno_supply: XenoSupply::baseline(),
//!     horizon_years: 5,
//! };
//!
//! let outcome = run_scenario(&params).unwrap();
//! assert_eq!(outcome.yearly.len(), 6); // years 0..=5
//! assert!(outcome.summary.penetration_rate <= 1.0);
//! ```

// Module declarations
pub mod core;
pub mod metrics;
pub mod models;
pub mod policy;
pub mod rates;
pub mod registry;
pub mod runner;
pub mod stepper;

// Re-exports for convenience
pub use self::core::time::{TimeGrid, STEPS_PER_YEAR};
pub use metrics::{
    aggregate, safe_ratio, SummaryMetrics, YearlyRecord, ALIGNMENT_TOLERANCE_YEARS,
};
pub use models::{
    params::{CpraThreshold, ScenarioParameters, SimulationError, XenoSupply},
    snapshot::{PopulationSnapshot, PriorityClass},
};
pub use policy::ScenarioPolicy;
pub use rates::{BaselineRates, RateTable};
pub use registry::{config_hash, RegistryError, ScenarioRegistry};
pub use runner::{run_scenario, ScenarioOutcome, ScenarioRun, Simulator, Trajectory};
pub use stepper::step;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn waitlist_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulation::PySimulation>()?;
    Ok(())
}
