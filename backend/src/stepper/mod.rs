//! Compartment stepper
//!
//! Advances one population snapshot across a fixed sub-year increment.
//! The flow order is canonical and load-bearing: later flows read
//! compartment sizes already updated by earlier flows in the same step.
//!
//! ```text
//! For each step of length dt:
//! 1. Arrivals          (waitlists grow by arrival_rate × dt)
//! 2. Xeno allocation   (intervention only; clamped to the high waitlist)
//! 3. Standard-organ allocation (unused high-class capacity rolls over
//!                       to the standard class; clamped per waitlist)
//! 4. Waitlist deaths   (per-capita hazard on the post-allocation lists)
//! 5. Graft-pool hazards (per pool: failures, then deaths on the
//!                       remainder; relisted failures rejoin the
//!                       class's waitlist, the rest are delisted)
//! ```
//!
//! Every subtraction is clamped so no compartment goes negative; clamping
//! is the only conflict-resolution rule between competing flows.

use crate::models::snapshot::PopulationSnapshot;
use crate::policy::ScenarioPolicy;
use crate::rates::RateTable;

/// Outflow drawn from one graft pool during a step
#[derive(Debug, Clone, Copy, PartialEq)]
struct PoolOutflow {
    failures: f64,
    deaths: f64,
}

/// Graft failures and deaths drawn from a pool over one step
///
/// Failures are drawn first, deaths from the remainder; both clamped.
fn drain_pool(pool: f64, failure_hazard: f64, death_hazard: f64, dt: f64) -> PoolOutflow {
    let failures = (failure_hazard * pool * dt).min(pool);
    let remaining = pool - failures;
    let deaths = (death_hazard * remaining * dt).min(remaining);
    PoolOutflow { failures, deaths }
}

/// Advance one snapshot by one step
///
/// Pure function: the input snapshot is not modified. `dt` is the fixed
/// step duration in years and must be the same for every step of a run.
pub fn step(
    snapshot: &PopulationSnapshot,
    rates: &RateTable,
    policy: ScenarioPolicy,
    dt: f64,
) -> PopulationSnapshot {
    let mut next = *snapshot;
    next.time_years = snapshot.time_years + dt;

    // STEP 1: ARRIVALS
    next.waitlist_standard += rates.arrival_standard * dt;
    next.waitlist_high += rates.arrival_high * dt;

    // STEP 2: XENOGRAFT ALLOCATION (intervention only)
    // Offered supply for the period, discounted by acceptance, clamped to
    // the eligible waitlist.
    if policy.xeno_available() {
        let offered = rates.xeno_supply * dt;
        let accepted = (offered * rates.xeno_acceptance).min(next.waitlist_high);
        next.waitlist_high -= accepted;
        next.graft_pool_high_xeno += accepted;
        next.transplants_high_xeno += accepted;
    }

    // STEP 3: STANDARD-ORGAN ALLOCATION
    // High-class capacity the emptied high waitlist cannot absorb rolls
    // over to the standard class the same step; unmet demand is never
    // wasted.
    let nominal_high = rates.allocation_high * dt;
    let allocated_high = nominal_high.min(next.waitlist_high);
    let rollover = nominal_high - allocated_high;

    let nominal_standard = rates.allocation_standard * dt + rollover;
    let allocated_standard = nominal_standard.min(next.waitlist_standard);

    next.waitlist_high -= allocated_high;
    next.graft_pool_high_standard += allocated_high;
    next.transplants_high_standard += allocated_high;

    next.waitlist_standard -= allocated_standard;
    next.graft_pool_standard += allocated_standard;
    next.transplants_standard += allocated_standard;

    // STEP 4: WAITLIST DEATHS
    // Hazards read the post-allocation waitlists.
    let deaths_standard =
        (rates.waitlist_death_standard * next.waitlist_standard * dt).min(next.waitlist_standard);
    next.waitlist_standard -= deaths_standard;
    next.waitlist_deaths_standard += deaths_standard;

    let deaths_high =
        (rates.waitlist_death_high * next.waitlist_high * dt).min(next.waitlist_high);
    next.waitlist_high -= deaths_high;
    next.waitlist_deaths_high += deaths_high;

    // STEP 5: GRAFT-POOL HAZARDS
    // The three pools are tracked separately per class and organ source,
    // so no share apportionment (and no near-zero-denominator division)
    // is needed here.

    // Standard class, standard organs. Failures and deaths are
    // subtracted in sequence; each is bounded by the pool it is drawn
    // from, so the pool cannot round below zero.
    let out = drain_pool(
        next.graft_pool_standard,
        rates.graft_failure_standard,
        rates.post_transplant_death_standard,
        dt,
    );
    next.graft_pool_standard -= out.failures;
    next.graft_pool_standard -= out.deaths;
    next.graft_failures_standard += out.failures;
    next.post_transplant_deaths_standard += out.deaths;
    let relisted = out.failures * rates.relist_fraction;
    next.waitlist_standard += relisted;
    next.delisted_standard += out.failures - relisted;

    // High class, standard organs
    let out = drain_pool(
        next.graft_pool_high_standard,
        rates.graft_failure_high,
        rates.post_transplant_death_high,
        dt,
    );
    next.graft_pool_high_standard -= out.failures;
    next.graft_pool_high_standard -= out.deaths;
    next.graft_failures_standard += out.failures;
    next.post_transplant_deaths_high += out.deaths;
    let relisted = out.failures * rates.relist_fraction;
    next.waitlist_high += relisted;
    next.delisted_high += out.failures - relisted;

    // High class, xenografts
    let out = drain_pool(
        next.graft_pool_high_xeno,
        rates.xeno_graft_failure,
        rates.xeno_post_transplant_death,
        dt,
    );
    next.graft_pool_high_xeno -= out.failures;
    next.graft_pool_high_xeno -= out.deaths;
    next.graft_failures_xeno += out.failures;
    next.post_transplant_deaths_high += out.deaths;
    let relisted = out.failures * rates.relist_fraction;
    next.waitlist_high += relisted;
    next.delisted_high += out.failures - relisted;

    next
}
