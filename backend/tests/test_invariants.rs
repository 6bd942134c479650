//! Property tests for the engine's structural invariants, across a
//! randomized slice of the parameter space.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use waitlist_simulator_core_rs::{
    aggregate, CpraThreshold, PriorityClass, ScenarioParameters, Simulator, Trajectory,
    XenoSupply,
};

fn threshold_strategy() -> impl Strategy<Value = CpraThreshold> {
    prop::sample::select(CpraThreshold::ALL.to_vec())
}

fn params_strategy() -> impl Strategy<Value = ScenarioParameters> {
    (
        threshold_strategy(),
        0.0f64..8.0,
        0.0f64..8.0,
        0.0f64..5.0,
        1u32..=10,
    )
        .prop_map(
            |(threshold, gf, ptd, factor, horizon_years)| ScenarioParameters {
                threshold,
                graft_failure_multiplier: gf,
                post_transplant_death_multiplier: ptd,
                xeno_supply: XenoSupply::BaselineMultiple { factor },
                horizon_years,
            },
        )
}

fn assert_nonnegative(trajectory: &Trajectory) -> Result<(), TestCaseError> {
    for snapshot in trajectory.iter() {
        for value in snapshot.compartments() {
            prop_assert!(
                value >= 0.0,
                "negative compartment at t={}: {}",
                snapshot.time_years,
                value
            );
        }
    }
    Ok(())
}

fn assert_monotone_counters(trajectory: &Trajectory) -> Result<(), TestCaseError> {
    let mut previous: Option<[f64; 11]> = None;
    for snapshot in trajectory.iter() {
        let counters = snapshot.cumulative_counters();
        if let Some(prev) = previous {
            for (before, after) in prev.iter().zip(counters.iter()) {
                prop_assert!(
                    after >= before,
                    "cumulative counter decreased: {} -> {}",
                    before,
                    after
                );
            }
        }
        previous = Some(counters);
    }
    Ok(())
}

fn assert_conservation(trajectory: &Trajectory, arrivals: (f64, f64), dt: f64) -> Result<(), TestCaseError> {
    let (arrival_standard, arrival_high) = arrivals;
    let mut iter = trajectory.iter();
    let mut prev = iter.next().expect("trajectory is never empty");

    for snapshot in iter {
        let delta_standard = snapshot.accounted(PriorityClass::Standard)
            - prev.accounted(PriorityClass::Standard);
        let delta_high =
            snapshot.accounted(PriorityClass::High) - prev.accounted(PriorityClass::High);

        prop_assert!(
            (delta_standard - arrival_standard * dt).abs() < 1e-6,
            "standard-class conservation broken: delta {} vs arrivals {}",
            delta_standard,
            arrival_standard * dt
        );
        prop_assert!(
            (delta_high - arrival_high * dt).abs() < 1e-6,
            "high-class conservation broken: delta {} vs arrivals {}",
            delta_high,
            arrival_high * dt
        );
        prev = snapshot;
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_compartments_never_negative(params in params_strategy()) {
        let run = Simulator::new(&params).unwrap().run();
        assert_nonnegative(&run.counterfactual)?;
        assert_nonnegative(&run.intervention)?;
    }

    #[test]
    fn prop_cumulative_counters_monotone(params in params_strategy()) {
        let run = Simulator::new(&params).unwrap().run();
        assert_monotone_counters(&run.counterfactual)?;
        assert_monotone_counters(&run.intervention)?;
    }

    #[test]
    fn prop_arrivals_are_the_only_source(params in params_strategy()) {
        let simulator = Simulator::new(&params).unwrap();
        let rates = *simulator.rates();
        let dt = simulator.grid().dt();
        let run = simulator.run();

        let arrivals = (rates.arrival_standard, rates.arrival_high);
        assert_conservation(&run.counterfactual, arrivals, dt)?;
        assert_conservation(&run.intervention, arrivals, dt)?;
    }

    #[test]
    fn prop_zero_supply_matches_counterfactual(
        threshold in threshold_strategy(),
        gf in 0.0f64..8.0,
        ptd in 0.0f64..8.0,
        horizon_years in 1u32..=10,
    ) {
        let params = ScenarioParameters {
            threshold,
            graft_failure_multiplier: gf,
            post_transplant_death_multiplier: ptd,
            xeno_supply: XenoSupply::none(),
            horizon_years,
        };
        let run = Simulator::new(&params).unwrap().run();

        prop_assert_eq!(run.counterfactual.len(), run.intervention.len());
        for (cf, iv) in run.counterfactual.iter().zip(run.intervention.iter()) {
            prop_assert!(cf.max_abs_diff(iv) < 1e-9);
        }
    }

    #[test]
    fn prop_penetration_rate_bounded(params in params_strategy()) {
        let run = Simulator::new(&params).unwrap().run();
        let (yearly, summary) =
            aggregate(Some(&run.counterfactual), &run.intervention, params.horizon_years);

        prop_assert!((0.0..=1.0).contains(&summary.penetration_rate));
        for record in &yearly {
            prop_assert!((0.0..=1.0).contains(&record.penetration));
        }
    }

    #[test]
    fn prop_summary_metrics_are_finite(params in params_strategy()) {
        let run = Simulator::new(&params).unwrap().run();
        let (_, summary) =
            aggregate(Some(&run.counterfactual), &run.intervention, params.horizon_years);

        prop_assert!(summary.total_transplants.is_finite());
        prop_assert!(summary.xeno_transplants.is_finite());
        prop_assert!(summary.penetration_rate.is_finite());
        prop_assert!(summary.lives_saved.unwrap().is_finite());
        prop_assert!(summary.waitlist_reduction.unwrap() >= 0.0);
    }
}
