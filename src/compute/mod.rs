//! Compute module - Agent dynamics, field simulation and parameter search.

mod agent;
mod field;
mod planner;

pub mod evolution;

pub use agent::*;
pub use field::*;
pub use planner::*;
