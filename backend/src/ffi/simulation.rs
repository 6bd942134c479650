//! PyO3 wrapper for the scenario simulator
//!
//! Provides the Python entry point: run a scenario from a configuration
//! dict, then read the yearly series and summary metrics back as plain
//! Python structures.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{parse_scenario_parameters, summary_to_py, yearly_to_py};
use crate::runner::{run_scenario, ScenarioOutcome};

/// Python wrapper for a completed scenario run
///
/// # Example (from Python)
///
/// ```python
/// from waitlist_simulator._core import Simulation
///
/// sim = Simulation.run({
///     "threshold": "0-85",
///     "graft_failure_multiplier": 1.0,
///     "post_transplant_death_multiplier": 1.0,
///     "xeno_supply_factor": 1.0,
///     "horizon_years": 10,
/// })
///
/// print(sim.summary()["lives_saved"])
/// for row in sim.yearly():
///     print(row["year"], row["waitlist_total"])
/// ```
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    outcome: ScenarioOutcome,
}

#[pymethods]
impl PySimulation {
    /// Run a scenario from a configuration dict
    ///
    /// # Errors
    ///
    /// Raises ValueError on missing/invalid fields or an unsupported
    /// threshold band.
    #[staticmethod]
    fn run(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let params = parse_scenario_parameters(config)?;

        let outcome =
            run_scenario(&params).map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(PySimulation { outcome })
    }

    /// Horizon-level summary metrics as a dict
    fn summary(&self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        summary_to_py(py, &self.outcome.summary)
    }

    /// Yearly records as a list of dicts
    fn yearly(&self, py: Python<'_>) -> PyResult<Py<PyList>> {
        yearly_to_py(py, &self.outcome.yearly)
    }

    /// Signed lives-saved total, or None without a counterfactual
    fn lives_saved(&self) -> Option<f64> {
        self.outcome.summary.lives_saved
    }

    /// Final-waitlist reduction (clamped at zero), or None without a
    /// counterfactual
    fn waitlist_reduction(&self) -> Option<f64> {
        self.outcome.summary.waitlist_reduction
    }

    /// Cumulative transplants at the horizon
    fn total_transplants(&self) -> f64 {
        self.outcome.summary.total_transplants
    }

    /// Cumulative xenotransplants at the horizon
    fn xeno_transplants(&self) -> f64 {
        self.outcome.summary.xeno_transplants
    }

    /// Xenograft share of high-class recipients at the horizon
    fn penetration_rate(&self) -> f64 {
        self.outcome.summary.penetration_rate
    }

    /// Number of snapshots in each trajectory
    fn num_steps(&self) -> usize {
        self.outcome.run.intervention.len()
    }
}
