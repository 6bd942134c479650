//! Scenario runner CLI
//!
//! Reads a `ScenarioParameters` JSON file, runs both scenarios, and
//! prints the yearly series plus summary metrics as JSON on stdout.
//! Presentation (charts, tables) belongs to downstream tooling.
//!
//! ```text
//! waitlist-sim scenario.json
//! ```
//!
//! Example scenario file:
//!
//! ```json
//! {
//!   "threshold": "0-85",
//!   "graft_failure_multiplier": 1.0,
//!   "post_transplant_death_multiplier": 1.0,
//!   "xeno_supply": { "type": "baseline_multiple", "factor": 1.0 },
//!   "horizon_years": 10
//! }
//! ```

use std::fs;
use std::process::ExitCode;

use serde_json::json;
use waitlist_simulator_core_rs::{run_scenario, ScenarioParameters};

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(path), None) => path,
        _ => {
            eprintln!("usage: waitlist-sim <scenario.json>");
            return ExitCode::from(2);
        }
    };

    match run_from_file(&path) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("waitlist-sim: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_from_file(path: &str) -> Result<String, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;

    let params: ScenarioParameters =
        serde_json::from_str(&contents).map_err(|e| format!("invalid scenario file: {}", e))?;

    let outcome = run_scenario(&params).map_err(|e| e.to_string())?;

    let output = json!({
        "yearly": outcome.yearly,
        "summary": outcome.summary,
    });

    serde_json::to_string_pretty(&output).map_err(|e| e.to_string())
}
