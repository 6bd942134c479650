//! Scenario policy
//!
//! One stepper serves both scenarios. The policy value selects whether
//! xenograft allocation runs; every other flow is shared, so the two
//! scenarios cannot drift apart structurally.

use serde::{Deserialize, Serialize};

/// Which allocation rules apply to a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPolicy {
    /// No xenograft program: standard allocation only
    Counterfactual,

    /// Xenograft supply offered to the high-priority class
    Intervention,
}

impl ScenarioPolicy {
    /// Whether xenograft allocation runs under this policy
    pub fn xeno_available(&self) -> bool {
        matches!(self, ScenarioPolicy::Intervention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xeno_availability() {
        assert!(!ScenarioPolicy::Counterfactual.xeno_available());
        assert!(ScenarioPolicy::Intervention.xeno_available());
    }
}
