//! Swarm Planner - field-based drone path planning tuned by a genetic search.
//!
//! A fleet of point-mass drones must fly within range of every sensor in a
//! fixed 3-D layout. Each drone steers along a normalized
//! attraction-repulsion field built from the unvisited sensors and the other
//! drones; ten scalar weights shape that field. A genetic optimizer tunes the
//! weights by running the simulation to completion for every candidate.
//!
//! # Architecture
//!
//! - `schema`: Configuration, scenario and parameter-set types
//! - `compute`: Agent kinematics, the field simulator and the evolutionary search
//! - `record`: Trajectory capture for external plotting
//!
//! # Example
//!
//! ```rust,no_run
//! use swarm_planner::{
//!     compute::{PathPlanner, evolution::optimize},
//!     record::{FlightRecord, RecordOptions},
//!     schema::{EvolutionConfig, Scenario},
//! };
//!
//! let scenario = Scenario::demo();
//! let config = EvolutionConfig::default();
//!
//! if let Some(params) = optimize(&scenario, config.clone())? {
//!     let mut planner = PathPlanner::from_scenario(&scenario, config.simulation)?;
//!     let outcome = planner.run(&params)?;
//!     let record = FlightRecord::capture(&planner, params, outcome, &RecordOptions::default());
//!     println!("{}", record.stats());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod record;
pub mod schema;

/// 3-D vector used for positions, velocities and accelerations.
pub type Vec3 = nalgebra::Vector3<f64>;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, optimize};
pub use compute::{Agent, PathPlanner, SimulationOutcome};
pub use record::FlightRecord;
pub use schema::{EvolutionConfig, FieldParams, Scenario, SimulationConfig};
