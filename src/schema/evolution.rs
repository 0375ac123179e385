//! Evolution configuration and result types for steering-parameter search.

use serde::{Deserialize, Serialize};

use super::{FieldParams, GeneBounds, SimulationConfig};

/// Top-level configuration for the genetic optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Simulation settings used for every fitness evaluation.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Variation operators.
    #[serde(default)]
    pub genetic: GeneticAlgorithmConfig,
    /// Weights of the fitness sub-scores.
    #[serde(default)]
    pub fitness: FitnessWeights,
    /// Per-gene bounds.
    #[serde(default)]
    pub bounds: GeneBounds,
    /// A candidate only becomes the best-ever result if its fitness is
    /// strictly below this value (and below every earlier best).
    #[serde(default = "default_improvement_threshold")]
    pub improvement_threshold: f64,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_improvement_threshold() -> f64 {
    0.1
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            population: PopulationConfig::default(),
            genetic: GeneticAlgorithmConfig::default(),
            fitness: FitnessWeights::default(),
            bounds: GeneBounds::default(),
            improvement_threshold: default_improvement_threshold(),
            random_seed: None,
        }
    }
}

/// Population settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Individuals per generation, constant across the run.
    pub size: usize,
    /// Number of generations to run.
    pub max_generations: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 7,
            max_generations: 100,
        }
    }
}

/// Genetic algorithm operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Per-gene mutation probability (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// How a selected gene is mutated.
    #[serde(default)]
    pub mutation: MutationKind,
}

fn default_mutation_rate() -> f64 {
    0.1
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            mutation_rate: default_mutation_rate(),
            mutation: MutationKind::default(),
        }
    }
}

/// Mutation operator applied to a gene selected for mutation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MutationKind {
    /// Replace with a fresh uniform draw from the gene's bounds.
    #[default]
    Resample,
    /// Add Gaussian noise scaled by the bound width, clamped to bounds.
    Gaussian { strength: f64 },
}

/// Weights of the three fitness sub-scores (lower total is better).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FitnessWeights {
    /// Weight of the unscanned-sensor fraction.
    pub coverage: f64,
    /// Weight of elapsed time over the budget.
    pub time: f64,
    /// Weight of crashes per drone.
    pub crash: f64,
    /// Cap crashes per drone at 1 so the total stays within [0, 1] under
    /// per-step collision counting. Off by default, since the cap treats
    /// every heavily colliding candidate alike.
    #[serde(default)]
    pub cap_crash_score: bool,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            coverage: 0.6,
            time: 0.1,
            crash: 0.3,
            cap_crash_score: false,
        }
    }
}

/// Serializable view of an evaluated candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    pub id: u64,
    pub fitness: f64,
    pub params: FieldParams,
    /// Generation the candidate was evaluated in.
    pub generation: usize,
    pub parents: Vec<u64>,
}

/// Progress information reported after each generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Zero-based index of the generation just evaluated.
    pub generation: usize,
    pub total_generations: usize,
    /// Best-ever fitness, `None` until the improvement threshold is beaten.
    pub best_fitness: Option<f64>,
    /// Best fitness in this generation.
    pub generation_best: f64,
    pub avg_fitness: f64,
    /// Generations since the best-ever fitness last improved.
    pub stagnation_count: usize,
}

/// Evolution history for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Standard deviation per generation.
    pub fitness_std: Vec<f64>,
    /// Diversity metric per generation.
    pub diversity: Vec<f64>,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best candidate ever observed, or `None` if nothing beat the
    /// improvement threshold.
    pub best: Option<CandidateSnapshot>,
    pub stats: EvolutionStats,
    pub history: EvolutionHistory,
}

impl EvolutionResult {
    /// Parameters of the best candidate, if any.
    pub fn best_params(&self) -> Option<FieldParams> {
        self.best.as_ref().map(|c| c.params)
    }

    /// True when no candidate beat the improvement threshold.
    pub fn is_unsolved(&self) -> bool {
        self.best.is_none()
    }
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Total generations run.
    pub generations: usize,
    /// Total fitness evaluations performed.
    pub total_evaluations: u64,
    /// Best-ever fitness, `None` if the threshold was never beaten.
    pub best_fitness: Option<f64>,
    /// Average fitness of the last evaluated population.
    pub final_avg_fitness: f64,
    /// Wall-clock time taken, in seconds.
    pub elapsed_seconds: f64,
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Mutation rate must lie in [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("Mutation strength must be non-negative, got {0}")]
    InvalidMutationStrength(f64),
    #[error("Invalid fitness weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid parameter bounds for gene {0}")]
    InvalidBounds(super::Gene),
    #[error("Search range of gene {0} exceeds the range the simulator accepts")]
    BoundsOutsideSimulation(super::Gene),
    #[error("Base config validation failed: {0}")]
    BaseConfigError(#[from] super::ConfigError),
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        self.simulation.validate()?;

        if self.population.size < 2 {
            return Err(EvolutionConfigError::PopulationTooSmall);
        }

        let rate = self.genetic.mutation_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(EvolutionConfigError::InvalidMutationRate(rate));
        }
        if let MutationKind::Gaussian { strength } = self.genetic.mutation
            && !(strength >= 0.0 && strength.is_finite())
        {
            return Err(EvolutionConfigError::InvalidMutationStrength(strength));
        }

        for (name, weight) in [
            ("coverage", self.fitness.coverage),
            ("time", self.fitness.time),
            ("crash", self.fitness.crash),
        ] {
            if !(weight >= 0.0 && weight.is_finite()) {
                return Err(EvolutionConfigError::InvalidWeight(format!(
                    "{} weight {} must be non-negative",
                    name, weight
                )));
            }
        }

        if let Some(gene) = self.bounds.first_invalid() {
            return Err(EvolutionConfigError::InvalidBounds(gene));
        }
        let accepted = &self.simulation.gene_bounds;
        if let Some(gene) = super::Gene::ALL.into_iter().find(|&g| {
            let (min, max) = self.bounds.get(g);
            let (lo, hi) = accepted.get(g);
            min < lo || max > hi
        }) {
            return Err(EvolutionConfigError::BoundsOutsideSimulation(gene));
        }

        Ok(())
    }
}
