//! Population snapshot
//!
//! A point-in-time record of every compartment in the model: the two
//! waitlist classes, the three live graft pools, and the cumulative
//! counters. Compartment sizes are f64 patient counts: the model is a
//! deterministic discretized continuous-time system, so fractional
//! populations are expected.
//!
//! # Critical Invariants
//!
//! 1. **Non-negativity**: every compartment is >= 0 at every step; flows
//!    are clamped, never allowed to overdraw a compartment.
//! 2. **Cumulative monotonicity**: transplant, death, graft-failure, and
//!    delisting counters never decrease.
//! 3. **Conservation**: per class, `waitlist + live graft pools +
//!    cumulative deaths + cumulative delistings` grows only by that
//!    class's arrivals. Patients who leave after an un-relisted graft
//!    failure are counted in `delisted_*`, so nothing vanishes from the
//!    books.

use serde::{Deserialize, Serialize};

/// Priority class of a waitlist patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    /// Below the cPRA threshold
    Standard,
    /// At or above the cPRA threshold; eligible for xenografts
    High,
}

/// Point-in-time record of all compartment sizes
///
/// Waitlist compartments rise and fall; `graft_pool_*` are the living
/// recipients with a functioning graft (they shrink on death and graft
/// failure); every other field is a cumulative counter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Simulated time of this snapshot, in years since the run started
    pub time_years: f64,

    /// Standard-priority waitlist
    pub waitlist_standard: f64,
    /// High-priority waitlist
    pub waitlist_high: f64,

    /// Living standard-class recipients of standard organs
    pub graft_pool_standard: f64,
    /// Living high-class recipients of standard organs
    pub graft_pool_high_standard: f64,
    /// Living high-class recipients of xenografts
    pub graft_pool_high_xeno: f64,

    /// Cumulative standard-organ transplants into the standard class
    pub transplants_standard: f64,
    /// Cumulative standard-organ transplants into the high class
    pub transplants_high_standard: f64,
    /// Cumulative xenotransplants (high class only)
    pub transplants_high_xeno: f64,

    /// Cumulative deaths on the standard-priority waitlist
    pub waitlist_deaths_standard: f64,
    /// Cumulative deaths on the high-priority waitlist
    pub waitlist_deaths_high: f64,

    /// Cumulative post-transplant deaths, standard class
    pub post_transplant_deaths_standard: f64,
    /// Cumulative post-transplant deaths, high class (both organ sources)
    pub post_transplant_deaths_high: f64,

    /// Cumulative graft failures of standard organs (both classes)
    pub graft_failures_standard: f64,
    /// Cumulative graft failures of xenografts
    pub graft_failures_xeno: f64,

    /// Cumulative standard-class patients who exited after graft failure
    /// without relisting
    pub delisted_standard: f64,
    /// Cumulative high-class patients who exited after graft failure
    /// without relisting
    pub delisted_high: f64,
}

impl PopulationSnapshot {
    /// Initial snapshot: calibrated waitlists, empty pools and counters
    pub fn initial(waitlist_standard: f64, waitlist_high: f64) -> Self {
        Self {
            waitlist_standard,
            waitlist_high,
            ..Self::default()
        }
    }

    /// Waitlist size for one class
    pub fn waitlist(&self, class: PriorityClass) -> f64 {
        match class {
            PriorityClass::Standard => self.waitlist_standard,
            PriorityClass::High => self.waitlist_high,
        }
    }

    /// Total waitlist size across both classes
    pub fn total_waitlist(&self) -> f64 {
        self.waitlist_standard + self.waitlist_high
    }

    /// Cumulative transplants across classes and organ sources
    pub fn total_transplants(&self) -> f64 {
        self.transplants_standard + self.transplants_high_standard + self.transplants_high_xeno
    }

    /// Cumulative deaths for one class (waitlist + post-transplant)
    pub fn deaths(&self, class: PriorityClass) -> f64 {
        match class {
            PriorityClass::Standard => {
                self.waitlist_deaths_standard + self.post_transplant_deaths_standard
            }
            PriorityClass::High => self.waitlist_deaths_high + self.post_transplant_deaths_high,
        }
    }

    /// Cumulative deaths across both classes and both causes
    pub fn total_deaths(&self) -> f64 {
        self.deaths(PriorityClass::Standard) + self.deaths(PriorityClass::High)
    }

    /// Everyone this class has ever accounted for
    ///
    /// Waitlist, living graft pools, cumulative deaths, and cumulative
    /// delistings. Grows by exactly the class's arrivals each step.
    pub fn accounted(&self, class: PriorityClass) -> f64 {
        match class {
            PriorityClass::Standard => {
                self.waitlist_standard
                    + self.graft_pool_standard
                    + self.deaths(PriorityClass::Standard)
                    + self.delisted_standard
            }
            PriorityClass::High => {
                self.waitlist_high
                    + self.graft_pool_high_standard
                    + self.graft_pool_high_xeno
                    + self.deaths(PriorityClass::High)
                    + self.delisted_high
            }
        }
    }

    /// All compartment values, for invariant sweeps in tests
    pub fn compartments(&self) -> [f64; 16] {
        [
            self.waitlist_standard,
            self.waitlist_high,
            self.graft_pool_standard,
            self.graft_pool_high_standard,
            self.graft_pool_high_xeno,
            self.transplants_standard,
            self.transplants_high_standard,
            self.transplants_high_xeno,
            self.waitlist_deaths_standard,
            self.waitlist_deaths_high,
            self.post_transplant_deaths_standard,
            self.post_transplant_deaths_high,
            self.graft_failures_standard,
            self.graft_failures_xeno,
            self.delisted_standard,
            self.delisted_high,
        ]
    }

    /// Cumulative counters only, in a fixed order shared with
    /// [`PopulationSnapshot::compartments`] indices 5..
    pub fn cumulative_counters(&self) -> [f64; 11] {
        [
            self.transplants_standard,
            self.transplants_high_standard,
            self.transplants_high_xeno,
            self.waitlist_deaths_standard,
            self.waitlist_deaths_high,
            self.post_transplant_deaths_standard,
            self.post_transplant_deaths_high,
            self.graft_failures_standard,
            self.graft_failures_xeno,
            self.delisted_standard,
            self.delisted_high,
        ]
    }

    /// Absolute elementwise difference against another snapshot
    ///
    /// Used by the equivalence tests; ignores `time_years`.
    pub fn max_abs_diff(&self, other: &PopulationSnapshot) -> f64 {
        self.compartments()
            .iter()
            .zip(other.compartments().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let snap = PopulationSnapshot::initial(81_000.0, 11_000.0);

        assert_eq!(snap.waitlist(PriorityClass::Standard), 81_000.0);
        assert_eq!(snap.waitlist(PriorityClass::High), 11_000.0);
        assert_eq!(snap.total_waitlist(), 92_000.0);
        assert_eq!(snap.total_transplants(), 0.0);
        assert_eq!(snap.total_deaths(), 0.0);
        assert_eq!(snap.time_years, 0.0);
    }

    #[test]
    fn test_accounted_sums_every_compartment() {
        let snap = PopulationSnapshot {
            waitlist_high: 100.0,
            graft_pool_high_standard: 40.0,
            graft_pool_high_xeno: 10.0,
            waitlist_deaths_high: 5.0,
            post_transplant_deaths_high: 2.0,
            delisted_high: 3.0,
            ..PopulationSnapshot::default()
        };

        assert_eq!(snap.accounted(PriorityClass::High), 160.0);
        assert_eq!(snap.accounted(PriorityClass::Standard), 0.0);
    }

    #[test]
    fn test_max_abs_diff() {
        let a = PopulationSnapshot::initial(100.0, 50.0);
        let mut b = a;
        b.waitlist_high = 53.5;

        assert_eq!(a.max_abs_diff(&b), 3.5);
        assert_eq!(a.max_abs_diff(&a), 0.0);
    }
}
