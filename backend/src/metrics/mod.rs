//! Comparative aggregator
//!
//! Reduces one or two trajectories to policy-facing series and summary
//! metrics. Sampling is at whole-year boundaries with nearest-time
//! alignment: a snapshot within [`ALIGNMENT_TOLERANCE_YEARS`] of the year
//! mark is used, otherwise the year is treated as missing, never as
//! zero.
//!
//! # Difference policy
//!
//! Deaths-prevented series are **signed**, uniformly: an intervention
//! that performs worse than its counterfactual produces negative
//! "prevented" values, and `lives_saved` can go negative. The one
//! deliberate exception is the headline `waitlist_reduction`, which is
//! clamped at zero by definition.
//!
//! # Missing comparison data
//!
//! The aggregator accepts `None` for the counterfactual trajectory and
//! then omits every comparative field rather than failing; hosts plotting
//! a lone precomputed intervention series get the non-comparative columns
//! unchanged.

use serde::{Deserialize, Serialize};

use crate::models::snapshot::{PopulationSnapshot, PriorityClass};
use crate::runner::Trajectory;

/// Maximum distance between a year mark and the snapshot used for it
pub const ALIGNMENT_TOLERANCE_YEARS: f64 = 0.1;

/// Denominator magnitude below which a ratio is degenerate
const RATIO_EPSILON: f64 = 1e-9;

/// Ratio with a guarded denominator
///
/// A zero or near-zero population denominator yields 0 rather than a NaN
/// or infinity that would poison every downstream aggregate.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < RATIO_EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// One record per whole simulated year
///
/// Non-comparative fields describe the intervention trajectory.
/// Comparative fields are `None` when no counterfactual is available or
/// when either side misses the year mark. Death fields are increments
/// over the preceding year (`None` for a year whose predecessor is
/// missing); the first matched year reports the cumulative counters at
/// that point, which is zero at year 0 of an engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    /// Whole simulated year, 0-indexed
    pub year: u32,

    /// Total intervention waitlist at the year mark
    pub waitlist_total: f64,
    /// Standard-class intervention waitlist
    pub waitlist_standard: f64,
    /// High-class intervention waitlist
    pub waitlist_high: f64,
    /// Total counterfactual waitlist, when available
    pub counterfactual_waitlist_total: Option<f64>,

    /// Standard-class deaths during this year (waitlist + post-transplant)
    pub deaths_standard: Option<f64>,
    /// High-class deaths during this year
    pub deaths_high: Option<f64>,
    /// All deaths during this year
    pub deaths_total: Option<f64>,
    /// All counterfactual deaths during this year, when available
    pub counterfactual_deaths_total: Option<f64>,

    /// Signed deaths prevented this year, standard class
    pub deaths_prevented_standard: Option<f64>,
    /// Signed deaths prevented this year, high class
    pub deaths_prevented_high: Option<f64>,
    /// Signed deaths prevented this year, both classes
    pub deaths_prevented_total: Option<f64>,

    /// Cumulative transplants at the year mark, all sources
    pub transplants_cumulative: f64,
    /// Cumulative xenotransplants at the year mark
    pub xeno_transplants_cumulative: f64,
    /// Share of high-class recipients holding a xenograft, in [0, 1]
    pub penetration: f64,
}

/// Horizon-level summary metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Counterfactual final waitlist minus intervention final waitlist,
    /// clamped at zero; `None` without a counterfactual
    pub waitlist_reduction: Option<f64>,

    /// Sum of signed yearly deaths-prevented up to the horizon;
    /// `None` without a counterfactual
    pub lives_saved: Option<f64>,

    /// Cumulative transplants at the horizon, all sources
    pub total_transplants: f64,

    /// Cumulative xenotransplants at the horizon
    pub xeno_transplants: f64,

    /// Xenograft share of high-class recipients at the horizon, in [0, 1]
    pub penetration_rate: f64,
}

fn penetration(snapshot: &PopulationSnapshot) -> f64 {
    safe_ratio(
        snapshot.transplants_high_xeno,
        snapshot.transplants_high_xeno + snapshot.transplants_high_standard,
    )
}

fn deaths_standard(snapshot: &PopulationSnapshot) -> f64 {
    snapshot.deaths(PriorityClass::Standard)
}

fn deaths_high(snapshot: &PopulationSnapshot) -> f64 {
    snapshot.deaths(PriorityClass::High)
}

/// Increment of a cumulative quantity between two yearly samples
///
/// With no predecessor (year 0 matched, or a gap in the series) the
/// year-0 convention reports the cumulative value itself and a gap
/// reports `None`.
fn increment(
    current: f64,
    previous: Option<f64>,
    is_series_start: bool,
) -> Option<f64> {
    match previous {
        Some(prev) => Some(current - prev),
        None if is_series_start => Some(current),
        None => None,
    }
}

/// Reduce trajectories to yearly records and summary metrics
///
/// `counterfactual = None` enters "no counterfactual available" mode:
/// comparative fields are omitted, nothing fails. Years where the
/// intervention trajectory has no snapshot within tolerance are skipped
/// entirely.
pub fn aggregate(
    counterfactual: Option<&Trajectory>,
    intervention: &Trajectory,
    horizon_years: u32,
) -> (Vec<YearlyRecord>, SummaryMetrics) {
    let mut yearly = Vec::with_capacity(horizon_years as usize + 1);

    // Predecessor samples for increment computation; None across gaps.
    let mut prev_iv: Option<&PopulationSnapshot> = None;
    let mut prev_cf: Option<&PopulationSnapshot> = None;
    let mut first_matched_year = true;

    for year in 0..=horizon_years {
        let t = year as f64;

        let iv = match intervention.nearest_at(t, ALIGNMENT_TOLERANCE_YEARS) {
            Some(snapshot) => snapshot,
            None => {
                // Missing year: the next matched year has no predecessor.
                prev_iv = None;
                prev_cf = None;
                continue;
            }
        };
        let cf = counterfactual.and_then(|c| c.nearest_at(t, ALIGNMENT_TOLERANCE_YEARS));

        let iv_deaths_standard = increment(
            deaths_standard(iv),
            prev_iv.map(deaths_standard),
            first_matched_year,
        );
        let iv_deaths_high = increment(
            deaths_high(iv),
            prev_iv.map(deaths_high),
            first_matched_year,
        );
        let iv_deaths_total = increment(
            iv.total_deaths(),
            prev_iv.map(PopulationSnapshot::total_deaths),
            first_matched_year,
        );

        let cf_deaths_standard = cf.and_then(|snapshot| {
            increment(
                deaths_standard(snapshot),
                prev_cf.map(deaths_standard),
                first_matched_year,
            )
        });
        let cf_deaths_high = cf.and_then(|snapshot| {
            increment(
                deaths_high(snapshot),
                prev_cf.map(deaths_high),
                first_matched_year,
            )
        });
        let cf_deaths_total = cf.and_then(|snapshot| {
            increment(
                snapshot.total_deaths(),
                prev_cf.map(PopulationSnapshot::total_deaths),
                first_matched_year,
            )
        });

        // Signed differences throughout.
        let prevented = |cf_inc: Option<f64>, iv_inc: Option<f64>| match (cf_inc, iv_inc) {
            (Some(c), Some(i)) => Some(c - i),
            _ => None,
        };

        yearly.push(YearlyRecord {
            year,
            waitlist_total: iv.total_waitlist(),
            waitlist_standard: iv.waitlist_standard,
            waitlist_high: iv.waitlist_high,
            counterfactual_waitlist_total: cf.map(PopulationSnapshot::total_waitlist),
            deaths_standard: iv_deaths_standard,
            deaths_high: iv_deaths_high,
            deaths_total: iv_deaths_total,
            counterfactual_deaths_total: cf_deaths_total,
            deaths_prevented_standard: prevented(cf_deaths_standard, iv_deaths_standard),
            deaths_prevented_high: prevented(cf_deaths_high, iv_deaths_high),
            deaths_prevented_total: prevented(cf_deaths_total, iv_deaths_total),
            transplants_cumulative: iv.total_transplants(),
            xeno_transplants_cumulative: iv.transplants_high_xeno,
            penetration: penetration(iv),
        });

        prev_iv = Some(iv);
        prev_cf = cf;
        first_matched_year = false;
    }

    let summary = summarize(counterfactual, intervention, horizon_years, &yearly);
    (yearly, summary)
}

fn summarize(
    counterfactual: Option<&Trajectory>,
    intervention: &Trajectory,
    horizon_years: u32,
    yearly: &[YearlyRecord],
) -> SummaryMetrics {
    let horizon = horizon_years as f64;

    // Horizon metrics read the final sample when the horizon mark itself
    // is absent from the series.
    let iv_final = intervention
        .nearest_at(horizon, ALIGNMENT_TOLERANCE_YEARS)
        .unwrap_or_else(|| intervention.last());
    let cf_final = counterfactual.map(|c| {
        c.nearest_at(horizon, ALIGNMENT_TOLERANCE_YEARS)
            .unwrap_or_else(|| c.last())
    });

    let waitlist_reduction = cf_final
        .map(|cf| (cf.total_waitlist() - iv_final.total_waitlist()).max(0.0));

    let lives_saved = counterfactual.map(|_| {
        yearly
            .iter()
            .filter_map(|record| record.deaths_prevented_total)
            .sum::<f64>()
    });

    SummaryMetrics {
        waitlist_reduction,
        lives_saved,
        total_transplants: iv_final.total_transplants(),
        xeno_transplants: iv_final.transplants_high_xeno,
        penetration_rate: penetration(iv_final),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ratio_guards_degenerate_denominators() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(5.0, 1e-12), 0.0);
        assert_eq!(safe_ratio(5.0, -1e-12), 0.0);
        assert_eq!(safe_ratio(6.0, 2.0), 3.0);
        assert!(safe_ratio(5.0, 0.0).is_finite());
    }

    #[test]
    fn test_penetration_zero_when_no_high_class_recipients() {
        let snapshot = PopulationSnapshot::default();
        assert_eq!(penetration(&snapshot), 0.0);
    }

    #[test]
    fn test_penetration_bounds() {
        let mut snapshot = PopulationSnapshot::default();
        snapshot.transplants_high_xeno = 300.0;
        snapshot.transplants_high_standard = 700.0;
        assert!((penetration(&snapshot) - 0.3).abs() < 1e-12);

        snapshot.transplants_high_standard = 0.0;
        assert_eq!(penetration(&snapshot), 1.0);
    }

    #[test]
    fn test_increment_conventions() {
        assert_eq!(increment(10.0, Some(4.0), false), Some(6.0));
        assert_eq!(increment(10.0, None, true), Some(10.0));
        assert_eq!(increment(10.0, None, false), None);
    }
}
