//! Evolutionary search over steering parameter sets.
//!
//! # Overview
//!
//! - **Fitness** (`fitness`): runs a fresh planner and scores coverage, time
//!   and crashes
//! - **Genome Operations** (`genome`): random generation, uniform crossover,
//!   per-gene mutation
//! - **Search** (`search`): generational loop with top-half elitism
//!
//! # Example
//!
//! ```rust,no_run
//! use swarm_planner::compute::evolution::EvolutionEngine;
//! use swarm_planner::schema::{EvolutionConfig, Scenario};
//!
//! let mut engine = EvolutionEngine::new(Scenario::demo(), EvolutionConfig::default())?;
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best = {:?}", progress.generation, progress.best_fitness);
//! })?;
//!
//! match result.best_params() {
//!     Some(params) => println!("W_s = {:.3}", params.w_s),
//!     None => println!("no parameter set beat the threshold"),
//! }
//! # Ok::<(), swarm_planner::compute::evolution::EvolutionError>(())
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessBreakdown, FitnessEvaluator};
pub use genome::{GenomeRng, genome_distance};
pub use search::{Candidate, EvolutionEngine, EvolutionError, optimize};
