//! Baseline calibration tables and the rate resolver
//!
//! Baseline hazard and flow magnitudes are fixed calibration constants
//! keyed by cPRA threshold class. The resolver turns a validated
//! `ScenarioParameters` into a `RateTable` of absolute rates: xenograft
//! hazards are the high-class standard-organ baselines scaled by the
//! scenario's dimensionless multipliers, and the supply level is resolved
//! against the class's baseline supply.
//!
//! The resolved table is passed by value into every stepper call; nothing
//! in the stepping path consults a global table.
//!
//! All rates are in per-year units. Per-capita hazards are multiplied by
//! the current compartment size (and dt) at each step; arrival, allocation
//! and supply rates are absolute flows.

use serde::{Deserialize, Serialize};

use crate::models::params::{CpraThreshold, ScenarioParameters, SimulationError};

/// Calibration constants for one cPRA threshold class
///
/// These are fixed inputs to the model, not computed quantities. Waitlist
/// sizes and flow magnitudes approximate the US kidney list under the
/// given band split; hazards are annual per-capita rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineRates {
    /// New registrations per year, standard class
    pub arrival_standard: f64,
    /// New registrations per year, high class
    pub arrival_high: f64,

    /// Standard organs allocated per year to the standard class
    pub allocation_standard: f64,
    /// Standard organs allocated per year to the high class
    pub allocation_high: f64,

    /// Annual per-capita death hazard on the standard-class waitlist
    pub waitlist_death_standard: f64,
    /// Annual per-capita death hazard on the high-class waitlist
    pub waitlist_death_high: f64,

    /// Annual per-capita post-transplant death hazard, standard class
    pub post_transplant_death_standard: f64,
    /// Annual per-capita post-transplant death hazard, high class
    pub post_transplant_death_high: f64,

    /// Annual per-capita graft-failure hazard, standard-class grafts
    pub graft_failure_standard: f64,
    /// Annual per-capita graft-failure hazard, high-class standard-organ
    /// grafts; also the base the xenograft multiplier scales
    pub graft_failure_high: f64,

    /// Fraction of graft failures that relist rather than exit
    pub relist_fraction: f64,

    /// Baseline xenograft supply, organs offered per year
    pub xeno_supply: f64,
    /// Fraction of offered xenografts accepted by eligible patients
    pub xeno_acceptance: f64,

    /// Waitlist size at the start of the run, standard class
    pub initial_waitlist_standard: f64,
    /// Waitlist size at the start of the run, high class
    pub initial_waitlist_high: f64,
}

const CPRA_80: BaselineRates = BaselineRates {
    arrival_standard: 30_900.0,
    arrival_high: 5_000.0,
    allocation_standard: 23_600.0, // 27,000 organs/yr total
    allocation_high: 3_400.0,
    waitlist_death_standard: 0.054,
    waitlist_death_high: 0.072,
    post_transplant_death_standard: 0.025,
    post_transplant_death_high: 0.034,
    graft_failure_standard: 0.035,
    graft_failure_high: 0.048,
    relist_fraction: 0.45,
    xeno_supply: 2_500.0,
    xeno_acceptance: 0.85,
    initial_waitlist_standard: 78_000.0,
    initial_waitlist_high: 14_000.0,
};

const CPRA_85: BaselineRates = BaselineRates {
    arrival_standard: 32_000.0,
    arrival_high: 3_900.0,
    allocation_standard: 24_400.0,
    allocation_high: 2_600.0,
    waitlist_death_standard: 0.055,
    waitlist_death_high: 0.075,
    post_transplant_death_standard: 0.025,
    post_transplant_death_high: 0.035,
    graft_failure_standard: 0.035,
    graft_failure_high: 0.050,
    relist_fraction: 0.45,
    xeno_supply: 2_000.0,
    xeno_acceptance: 0.85,
    initial_waitlist_standard: 81_000.0,
    initial_waitlist_high: 11_000.0,
};

const CPRA_95: BaselineRates = BaselineRates {
    arrival_standard: 34_000.0,
    arrival_high: 1_900.0,
    allocation_standard: 25_800.0,
    allocation_high: 1_200.0,
    waitlist_death_standard: 0.056,
    waitlist_death_high: 0.085, // most sensitized, longest waits
    post_transplant_death_standard: 0.025,
    post_transplant_death_high: 0.040,
    graft_failure_standard: 0.035,
    graft_failure_high: 0.055,
    relist_fraction: 0.45,
    xeno_supply: 1_200.0,
    xeno_acceptance: 0.85,
    initial_waitlist_standard: 86_500.0,
    initial_waitlist_high: 5_500.0,
};

impl BaselineRates {
    /// Calibration table for a threshold class
    pub fn for_threshold(threshold: CpraThreshold) -> BaselineRates {
        match threshold {
            CpraThreshold::Cpra80 => CPRA_80,
            CpraThreshold::Cpra85 => CPRA_85,
            CpraThreshold::Cpra95 => CPRA_95,
        }
    }
}

/// Resolved absolute rates for one scenario
///
/// Constructed once per run by [`RateTable::resolve`] and passed by value
/// into every step call. Xenograft hazards are already scaled by the
/// scenario multipliers; a multiplier of zero yields a hazard of exactly
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Threshold class this table was resolved for
    pub threshold: CpraThreshold,

    /// New registrations per year, standard class
    pub arrival_standard: f64,
    /// New registrations per year, high class
    pub arrival_high: f64,

    /// Standard organs per year allocated to the standard class
    pub allocation_standard: f64,
    /// Standard organs per year allocated to the high class
    pub allocation_high: f64,

    /// Annual per-capita waitlist death hazard, standard class
    pub waitlist_death_standard: f64,
    /// Annual per-capita waitlist death hazard, high class
    pub waitlist_death_high: f64,

    /// Annual per-capita post-transplant death hazard, standard-class
    /// standard-organ recipients
    pub post_transplant_death_standard: f64,
    /// Annual per-capita post-transplant death hazard, high-class
    /// standard-organ recipients
    pub post_transplant_death_high: f64,

    /// Annual per-capita graft-failure hazard, standard-class grafts
    pub graft_failure_standard: f64,
    /// Annual per-capita graft-failure hazard, high-class standard-organ
    /// grafts
    pub graft_failure_high: f64,

    /// Annual per-capita xenograft failure hazard (baseline × multiplier)
    pub xeno_graft_failure: f64,
    /// Annual per-capita xenograft post-transplant death hazard
    /// (baseline × multiplier)
    pub xeno_post_transplant_death: f64,

    /// Fraction of graft failures that relist rather than exit
    pub relist_fraction: f64,

    /// Xenografts offered per year
    pub xeno_supply: f64,
    /// Fraction of offered xenografts accepted
    pub xeno_acceptance: f64,

    /// Waitlist size at the start of the run, standard class
    pub initial_waitlist_standard: f64,
    /// Waitlist size at the start of the run, high class
    pub initial_waitlist_high: f64,
}

impl RateTable {
    /// Resolve a validated parameter set into absolute rates
    ///
    /// # Errors
    ///
    /// Propagates `SimulationError::InvalidParameter` from
    /// [`ScenarioParameters::validate`]; the table is never built from
    /// invalid input.
    ///
    /// # Example
    /// ```
    /// use waitlist_simulator_core_rs::{
    ///     CpraThreshold, RateTable, ScenarioParameters, XenoSupply,
    /// };
    ///
    /// let params = ScenarioParameters {
    ///     threshold: CpraThreshold::Cpra85,
    ///     graft_failure_multiplier: 0.0,
    ///     post_transplant_death_multiplier: 2.0,
    ///     xeno_supply: XenoSupply::baseline(),
    ///     horizon_years: 5,
    /// };
    /// let rates = RateTable::resolve(&params).unwrap();
    ///
    /// // multiplier 0 yields a hazard of exactly 0
    /// assert_eq!(rates.xeno_graft_failure, 0.0);
    /// assert_eq!(rates.xeno_post_transplant_death, 0.070);
    /// ```
    pub fn resolve(params: &ScenarioParameters) -> Result<RateTable, SimulationError> {
        params.validate()?;

        let base = BaselineRates::for_threshold(params.threshold);

        Ok(RateTable {
            threshold: params.threshold,
            arrival_standard: base.arrival_standard,
            arrival_high: base.arrival_high,
            allocation_standard: base.allocation_standard,
            allocation_high: base.allocation_high,
            waitlist_death_standard: base.waitlist_death_standard,
            waitlist_death_high: base.waitlist_death_high,
            post_transplant_death_standard: base.post_transplant_death_standard,
            post_transplant_death_high: base.post_transplant_death_high,
            graft_failure_standard: base.graft_failure_standard,
            graft_failure_high: base.graft_failure_high,
            xeno_graft_failure: base.graft_failure_high * params.graft_failure_multiplier,
            xeno_post_transplant_death: base.post_transplant_death_high
                * params.post_transplant_death_multiplier,
            relist_fraction: base.relist_fraction,
            xeno_supply: params.xeno_supply.organs_per_year(base.xeno_supply),
            xeno_acceptance: base.xeno_acceptance,
            initial_waitlist_standard: base.initial_waitlist_standard,
            initial_waitlist_high: base.initial_waitlist_high,
        })
    }

    /// The no-intervention table: identical rates with zero xeno supply
    pub fn counterfactual(&self) -> RateTable {
        RateTable {
            xeno_supply: 0.0,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::XenoSupply;

    fn params(threshold: CpraThreshold) -> ScenarioParameters {
        ScenarioParameters {
            threshold,
            graft_failure_multiplier: 1.0,
            post_transplant_death_multiplier: 1.0,
            xeno_supply: XenoSupply::baseline(),
            horizon_years: 10,
        }
    }

    #[test]
    fn test_resolve_uses_threshold_table() {
        let rates = RateTable::resolve(&params(CpraThreshold::Cpra95)).unwrap();

        assert_eq!(rates.threshold, CpraThreshold::Cpra95);
        assert_eq!(rates.arrival_high, 1_900.0);
        assert_eq!(rates.initial_waitlist_high, 5_500.0);
        assert_eq!(rates.xeno_supply, 1_200.0);
    }

    #[test]
    fn test_unit_multipliers_reproduce_baselines() {
        let rates = RateTable::resolve(&params(CpraThreshold::Cpra85)).unwrap();

        assert_eq!(rates.xeno_graft_failure, rates.graft_failure_high);
        assert_eq!(
            rates.xeno_post_transplant_death,
            rates.post_transplant_death_high
        );
    }

    #[test]
    fn test_zero_multiplier_is_exactly_zero() {
        let mut p = params(CpraThreshold::Cpra85);
        p.graft_failure_multiplier = 0.0;
        p.post_transplant_death_multiplier = 0.0;
        let rates = RateTable::resolve(&p).unwrap();

        assert_eq!(rates.xeno_graft_failure, 0.0);
        assert_eq!(rates.xeno_post_transplant_death, 0.0);
    }

    #[test]
    fn test_supply_scaling() {
        let mut p = params(CpraThreshold::Cpra85);
        p.xeno_supply = XenoSupply::BaselineMultiple { factor: 2.0 };
        let rates = RateTable::resolve(&p).unwrap();
        assert_eq!(rates.xeno_supply, 4_000.0);

        p.xeno_supply = XenoSupply::Absolute {
            organs_per_year: 321.0,
        };
        let rates = RateTable::resolve(&p).unwrap();
        assert_eq!(rates.xeno_supply, 321.0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut p = params(CpraThreshold::Cpra85);
        p.graft_failure_multiplier = -1.0;
        assert!(RateTable::resolve(&p).is_err());
    }

    #[test]
    fn test_counterfactual_zeroes_only_supply() {
        let rates = RateTable::resolve(&params(CpraThreshold::Cpra80)).unwrap();
        let cf = rates.counterfactual();

        assert_eq!(cf.xeno_supply, 0.0);
        assert_eq!(cf.arrival_standard, rates.arrival_standard);
        assert_eq!(cf.xeno_graft_failure, rates.xeno_graft_failure);
        assert_eq!(cf.waitlist_death_high, rates.waitlist_death_high);
    }

    #[test]
    fn test_all_baseline_hazards_nonnegative() {
        for threshold in CpraThreshold::ALL {
            let base = BaselineRates::for_threshold(threshold);
            for hazard in [
                base.waitlist_death_standard,
                base.waitlist_death_high,
                base.post_transplant_death_standard,
                base.post_transplant_death_high,
                base.graft_failure_standard,
                base.graft_failure_high,
            ] {
                assert!(hazard >= 0.0);
            }
            assert!((0.0..=1.0).contains(&base.relist_fraction));
            assert!((0.0..=1.0).contains(&base.xeno_acceptance));
        }
    }
}
