//! FFI boundary (Python host bindings)
//!
//! Thin wrappers exposing scenario runs to Python. All validation lives
//! in the Rust core; this layer only converts values and maps
//! `SimulationError` to `ValueError`.

pub mod simulation;
pub mod types;
