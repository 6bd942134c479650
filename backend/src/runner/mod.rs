//! Trajectory runner
//!
//! Owns the run lifecycle: validate parameters, resolve the rate tables,
//! build the initial snapshot from the threshold class's calibration, and
//! advance both scenarios across the full horizon. The counterfactual and
//! intervention trajectories share the starting snapshot and the stepper;
//! they differ only in rate table (zero xeno supply) and policy, and are
//! computed independently with no shared mutable state.

use serde::{Deserialize, Serialize};

use crate::core::time::TimeGrid;
use crate::metrics::{self, SummaryMetrics, YearlyRecord};
use crate::models::params::{ScenarioParameters, SimulationError};
use crate::models::snapshot::PopulationSnapshot;
use crate::policy::ScenarioPolicy;
use crate::rates::RateTable;
use crate::stepper::step;

/// Ordered, time-indexed sequence of snapshots
///
/// Produced once per scenario per run; immutable after construction.
/// Snapshots are dense on the run's fixed step grid, but consumers only
/// rely on time ordering, so precomputed series on an irregular grid can
/// be wrapped with [`Trajectory::from_snapshots`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    snapshots: Vec<PopulationSnapshot>,
}

impl Trajectory {
    fn new(initial: PopulationSnapshot, capacity: usize) -> Self {
        let mut snapshots = Vec::with_capacity(capacity + 1);
        snapshots.push(initial);
        Self { snapshots }
    }

    fn push(&mut self, snapshot: PopulationSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Wrap an externally produced snapshot series
    ///
    /// Used for precomputed datasets fetched by a host. The series must
    /// be non-empty and strictly increasing in time.
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidParameter` on an empty or unordered
    /// series.
    pub fn from_snapshots(
        snapshots: Vec<PopulationSnapshot>,
    ) -> Result<Self, SimulationError> {
        if snapshots.is_empty() {
            return Err(SimulationError::InvalidParameter(
                "trajectory must contain at least one snapshot".to_string(),
            ));
        }
        for pair in snapshots.windows(2) {
            if pair[1].time_years <= pair[0].time_years {
                return Err(SimulationError::InvalidParameter(
                    "trajectory snapshots must be strictly increasing in time".to_string(),
                ));
            }
        }
        Ok(Self { snapshots })
    }

    /// Number of snapshots (steps + 1 for a dense run)
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when the trajectory holds no snapshots
    ///
    /// Never the case for values built by this crate.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at a step index
    pub fn get(&self, step: usize) -> Option<&PopulationSnapshot> {
        self.snapshots.get(step)
    }

    /// The starting snapshot
    pub fn first(&self) -> &PopulationSnapshot {
        &self.snapshots[0]
    }

    /// The final snapshot
    pub fn last(&self) -> &PopulationSnapshot {
        self.snapshots
            .last()
            .expect("trajectory is never constructed empty")
    }

    /// Iterate snapshots in time order
    pub fn iter(&self) -> std::slice::Iter<'_, PopulationSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot nearest to time `t`, if within `tolerance` years
    ///
    /// Supports yearly sampling of series whose native grid does not land
    /// exactly on whole years; a miss is reported as `None`, never
    /// substituted with zeros.
    pub fn nearest_at(&self, t: f64, tolerance: f64) -> Option<&PopulationSnapshot> {
        let nearest = self
            .snapshots
            .iter()
            .min_by(|a, b| {
                let da = (a.time_years - t).abs();
                let db = (b.time_years - t).abs();
                da.partial_cmp(&db).expect("snapshot times are finite")
            })?;
        if (nearest.time_years - t).abs() <= tolerance {
            Some(nearest)
        } else {
            None
        }
    }
}

/// The two trajectories produced by one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    /// No-intervention trajectory (xeno supply forced to zero)
    pub counterfactual: Trajectory,
    /// Intervention trajectory
    pub intervention: Trajectory,
}

/// Full output of a run: both trajectories plus derived series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// The raw trajectories
    pub run: ScenarioRun,
    /// One record per whole simulated year
    pub yearly: Vec<YearlyRecord>,
    /// Horizon-level summary metrics
    pub summary: SummaryMetrics,
}

/// Validated, resolved simulation ready to run
///
/// # Example
/// ```
/// use waitlist_simulator_core_rs::{
///     CpraThreshold, ScenarioParameters, Simulator, XenoSupply,
/// };
///
/// let params = ScenarioParameters {
///     threshold: CpraThreshold::Cpra85,
///     graft_failure_multiplier: 1.0,
///     post_transplant_death_multiplier: 1.0,
///     xeno_supply: XenoSupply::baseline(),
///     horizon_years: 5,
/// };
///
/// let run = Simulator::new(&params).unwrap().run();
/// assert_eq!(run.intervention.len(), 21); // 5 years × 4 steps + start
/// assert_eq!(run.counterfactual.len(), 21);
/// ```
#[derive(Debug, Clone)]
pub struct Simulator {
    rates: RateTable,
    grid: TimeGrid,
    horizon_years: u32,
}

impl Simulator {
    /// Validate parameters and resolve rates on the quarterly grid
    pub fn new(params: &ScenarioParameters) -> Result<Self, SimulationError> {
        Self::with_grid(params, TimeGrid::quarterly())
    }

    /// As [`Simulator::new`] with an explicit grid resolution
    pub fn with_grid(
        params: &ScenarioParameters,
        grid: TimeGrid,
    ) -> Result<Self, SimulationError> {
        let rates = RateTable::resolve(params)?;
        Ok(Self {
            rates,
            grid,
            horizon_years: params.horizon_years,
        })
    }

    /// The resolved intervention rate table
    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// The run's time grid
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Run both scenarios across the horizon
    pub fn run(&self) -> ScenarioRun {
        let counterfactual =
            self.run_policy(ScenarioPolicy::Counterfactual, &self.rates.counterfactual());
        let intervention = self.run_policy(ScenarioPolicy::Intervention, &self.rates);

        ScenarioRun {
            counterfactual,
            intervention,
        }
    }

    fn run_policy(&self, policy: ScenarioPolicy, rates: &RateTable) -> Trajectory {
        let total_steps = self.grid.total_steps(self.horizon_years);
        let dt = self.grid.dt();

        let initial = PopulationSnapshot::initial(
            rates.initial_waitlist_standard,
            rates.initial_waitlist_high,
        );

        let mut trajectory = Trajectory::new(initial, total_steps);
        let mut current = initial;
        for _ in 0..total_steps {
            current = step(&current, rates, policy, dt);
            trajectory.push(current);
        }
        trajectory
    }
}

/// Run a scenario end to end: trajectories, yearly series, and summary
///
/// # Errors
///
/// `SimulationError::InvalidParameter` before any stepping when the
/// parameters fail validation.
pub fn run_scenario(params: &ScenarioParameters) -> Result<ScenarioOutcome, SimulationError> {
    let simulator = Simulator::new(params)?;
    let run = simulator.run();
    let (yearly, summary) = metrics::aggregate(
        Some(&run.counterfactual),
        &run.intervention,
        params.horizon_years,
    );

    Ok(ScenarioOutcome {
        run,
        yearly,
        summary,
    })
}
