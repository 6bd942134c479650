//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList).

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::metrics::{SummaryMetrics, YearlyRecord};
use crate::models::params::{CpraThreshold, ScenarioParameters, XenoSupply};

/// Extract a required field from a Python dict with a clear error message
fn extract_required<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<T> {
    dict.get_item(key)?
        .ok_or_else(|| PyValueError::new_err(format!("Missing required field '{}'", key)))?
        .extract()
}

/// Extract a field, falling back to a default when missing
fn extract_with_default<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
    default: T,
) -> PyResult<T> {
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Convert a Python dict to ScenarioParameters
///
/// Expected keys:
/// - `threshold` (str, required): band key such as `"0-85"`
/// - `graft_failure_multiplier` (float, default 1.0)
/// - `post_transplant_death_multiplier` (float, default 1.0)
/// - `xeno_supply_organs_per_year` (float) or `xeno_supply_factor`
///   (float, default 1.0); passing both is an error
/// - `horizon_years` (int, required)
pub fn parse_scenario_parameters(
    config: &Bound<'_, PyDict>,
) -> PyResult<ScenarioParameters> {
    let band: String = extract_required(config, "threshold")?;
    let threshold = CpraThreshold::from_band(&band)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let graft_failure_multiplier: f64 =
        extract_with_default(config, "graft_failure_multiplier", 1.0)?;
    let post_transplant_death_multiplier: f64 =
        extract_with_default(config, "post_transplant_death_multiplier", 1.0)?;

    let absolute: Option<f64> = match config.get_item("xeno_supply_organs_per_year")? {
        Some(value) => Some(value.extract()?),
        None => None,
    };
    let factor: Option<f64> = match config.get_item("xeno_supply_factor")? {
        Some(value) => Some(value.extract()?),
        None => None,
    };

    let xeno_supply = match (absolute, factor) {
        (Some(_), Some(_)) => {
            return Err(PyValueError::new_err(
                "Pass either 'xeno_supply_organs_per_year' or 'xeno_supply_factor', not both",
            ))
        }
        (Some(organs_per_year), None) => XenoSupply::Absolute { organs_per_year },
        (None, Some(factor)) => XenoSupply::BaselineMultiple { factor },
        (None, None) => XenoSupply::baseline(),
    };

    let horizon_years: u32 = extract_required(config, "horizon_years")?;

    Ok(ScenarioParameters {
        threshold,
        graft_failure_multiplier,
        post_transplant_death_multiplier,
        xeno_supply,
        horizon_years,
    })
}

/// Convert SummaryMetrics to a Python dict
pub fn summary_to_py(py: Python<'_>, summary: &SummaryMetrics) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("waitlist_reduction", summary.waitlist_reduction)?;
    dict.set_item("lives_saved", summary.lives_saved)?;
    dict.set_item("total_transplants", summary.total_transplants)?;
    dict.set_item("xeno_transplants", summary.xeno_transplants)?;
    dict.set_item("penetration_rate", summary.penetration_rate)?;
    Ok(dict.unbind())
}

/// Convert one YearlyRecord to a Python dict
pub fn yearly_record_to_py(py: Python<'_>, record: &YearlyRecord) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("year", record.year)?;
    dict.set_item("waitlist_total", record.waitlist_total)?;
    dict.set_item("waitlist_standard", record.waitlist_standard)?;
    dict.set_item("waitlist_high", record.waitlist_high)?;
    dict.set_item(
        "counterfactual_waitlist_total",
        record.counterfactual_waitlist_total,
    )?;
    dict.set_item("deaths_standard", record.deaths_standard)?;
    dict.set_item("deaths_high", record.deaths_high)?;
    dict.set_item("deaths_total", record.deaths_total)?;
    dict.set_item(
        "counterfactual_deaths_total",
        record.counterfactual_deaths_total,
    )?;
    dict.set_item(
        "deaths_prevented_standard",
        record.deaths_prevented_standard,
    )?;
    dict.set_item("deaths_prevented_high", record.deaths_prevented_high)?;
    dict.set_item("deaths_prevented_total", record.deaths_prevented_total)?;
    dict.set_item("transplants_cumulative", record.transplants_cumulative)?;
    dict.set_item(
        "xeno_transplants_cumulative",
        record.xeno_transplants_cumulative,
    )?;
    dict.set_item("penetration", record.penetration)?;
    Ok(dict.unbind())
}

/// Convert the yearly series to a Python list of dicts
pub fn yearly_to_py(py: Python<'_>, yearly: &[YearlyRecord]) -> PyResult<Py<PyList>> {
    let list = PyList::empty_bound(py);
    for record in yearly {
        list.append(yearly_record_to_py(py, record)?)?;
    }
    Ok(list.unbind())
}
