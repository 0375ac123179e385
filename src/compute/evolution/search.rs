//! Genetic algorithm driving the steering-parameter search.

use rayon::prelude::*;

use crate::compute::SimulationError;
use crate::schema::{
    CandidateSnapshot, EvolutionConfig, EvolutionConfigError, EvolutionHistory, EvolutionProgress,
    EvolutionResult, EvolutionStats, FieldParams, Scenario,
};

use super::fitness::{FitnessBreakdown, FitnessEvaluator};
use super::genome::{GenomeRng, genome_distance};

/// A candidate individual in the population.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Unique identifier.
    pub id: u64,
    pub params: FieldParams,
    /// Fitness score, `f64::INFINITY` until evaluated.
    pub fitness: f64,
    pub breakdown: Option<FitnessBreakdown>,
    /// Generation created.
    pub generation: usize,
    /// Parent IDs.
    pub parents: Vec<u64>,
}

impl Candidate {
    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self) -> CandidateSnapshot {
        CandidateSnapshot {
            id: self.id,
            fitness: self.fitness,
            params: self.params,
            generation: self.generation,
            parents: self.parents.clone(),
        }
    }
}

/// Errors that abort an evolution run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid evolution config: {0}")]
    Config(#[from] EvolutionConfigError),
    #[error("Fitness evaluation failed: {0}")]
    Simulation(#[from] SimulationError),
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    rng: GenomeRng,
    evaluator: FitnessEvaluator,
    population: Vec<Candidate>,
    history: EvolutionHistory,
    generation: usize,
    best: Option<Candidate>,
    stagnation_count: usize,
    next_id: u64,
}

impl EvolutionEngine {
    /// Create a new evolution engine for `scenario`.
    pub fn new(scenario: Scenario, config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;
        let evaluator = FitnessEvaluator::new(scenario, config.simulation.clone(), config.fitness)
            .map_err(EvolutionConfigError::from)?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        log::debug!("evolution rng seed {}", seed);

        Ok(Self {
            config,
            rng: GenomeRng::new(seed),
            evaluator,
            population: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            best: None,
            stagnation_count: 0,
            next_id: 0,
        })
    }

    #[inline]
    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    #[inline]
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Best candidate observed so far.
    #[inline]
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Initialize the population with random parameter sets.
    pub fn initialize(&mut self) {
        self.population.clear();
        self.generation = 0;

        for _ in 0..self.config.population.size {
            let params = self.rng.random_params(&self.config.bounds);
            let id = self.next_id();
            self.population.push(Candidate {
                id,
                params,
                fitness: f64::INFINITY,
                breakdown: None,
                generation: 0,
                parents: Vec::new(),
            });
        }
    }

    /// Evaluate all candidates in the population.
    ///
    /// Evaluations are independent, so they run in parallel; every candidate
    /// is re-evaluated even if it survived unchanged.
    fn evaluate_population(&mut self) -> Result<(), SimulationError> {
        let evaluator = &self.evaluator;

        self.population
            .par_iter_mut()
            .try_for_each(|candidate| -> Result<(), SimulationError> {
                let breakdown = evaluator.evaluate(&candidate.params)?;
                candidate.fitness = breakdown.fitness;
                candidate.breakdown = Some(breakdown);
                Ok(())
            })
    }

    /// Sort ascending, record statistics and update the best-ever candidate.
    fn rank_population(&mut self) {
        self.population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        let gen_best = &self.population[0];
        let threshold = self
            .best
            .as_ref()
            .map_or(self.config.improvement_threshold, |b| b.fitness);
        if gen_best.fitness < threshold {
            log::info!(
                "generation {}: new best fitness {:.4} (candidate {})",
                self.generation,
                gen_best.fitness,
                gen_best.id
            );
            self.best = Some(gen_best.clone());
            self.stagnation_count = 0;
        } else {
            self.stagnation_count += 1;
        }

        let n = self.population.len() as f64;
        let avg_fitness: f64 = self.population.iter().map(|c| c.fitness).sum::<f64>() / n;
        let variance: f64 = self
            .population
            .iter()
            .map(|c| (c.fitness - avg_fitness).powi(2))
            .sum::<f64>()
            / n;

        self.history.best_fitness.push(self.population[0].fitness);
        self.history.avg_fitness.push(avg_fitness);
        self.history.fitness_std.push(variance.sqrt());
        let diversity = self.compute_diversity();
        self.history.diversity.push(diversity);
    }

    /// Replace the population: the top half survives unchanged and breeds the
    /// rest through uniform crossover and mutation.
    fn breed_next_generation(&mut self) {
        let size = self.config.population.size;
        let n_parents = size / 2;
        let rate = self.config.genetic.mutation_rate;
        let kind = self.config.genetic.mutation;

        self.population.truncate(n_parents);
        let mut next_gen = Vec::with_capacity(size);
        for elite in &self.population {
            let mut elite = elite.clone();
            elite.generation = self.generation + 1;
            next_gen.push(elite);
        }

        while next_gen.len() < size {
            let idx1 = self.rng.pick(n_parents);
            let idx2 = self.rng.pick(n_parents);
            let p1 = &self.population[idx1];
            let p2 = &self.population[idx2];

            let child = self.rng.crossover(&p1.params, &p2.params);
            let child = self.rng.mutate(&child, rate, kind, &self.config.bounds);
            let parents = vec![p1.id, p2.id];

            let id = self.next_id();
            next_gen.push(Candidate {
                id,
                params: child,
                fitness: f64::INFINITY,
                breakdown: None,
                generation: self.generation + 1,
                parents,
            });
        }

        self.population = next_gen;
    }

    /// Mean pairwise genome distance.
    fn compute_diversity(&self) -> f64 {
        if self.population.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        let mut count = 0;

        for i in 0..self.population.len() {
            for j in (i + 1)..self.population.len() {
                total_distance += genome_distance(
                    &self.population[i].params,
                    &self.population[j].params,
                    &self.config.bounds,
                );
                count += 1;
            }
        }

        total_distance / count as f64
    }

    /// Current progress.
    pub fn progress(&self) -> EvolutionProgress {
        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.max_generations,
            best_fitness: self.best.as_ref().map(|c| c.fitness),
            generation_best: self.history.best_fitness.last().copied().unwrap_or(f64::INFINITY),
            avg_fitness: self.history.avg_fitness.last().copied().unwrap_or(f64::INFINITY),
            stagnation_count: self.stagnation_count,
        }
    }

    /// Run every generation, reporting progress after each one.
    pub fn run_with_callback<F>(&mut self, callback: F) -> Result<EvolutionResult, EvolutionError>
    where
        F: Fn(&EvolutionProgress),
    {
        let start_time = std::time::Instant::now();
        let generations = self.config.population.max_generations;

        self.initialize();
        self.best = None;
        self.stagnation_count = 0;
        self.history = EvolutionHistory::default();

        for generation in 0..generations {
            self.generation = generation;
            self.evaluate_population()?;
            self.rank_population();

            let progress = self.progress();
            log::debug!(
                "generation {}/{}: best {:.4}, avg {:.4}",
                generation + 1,
                generations,
                progress.generation_best,
                progress.avg_fitness
            );
            callback(&progress);

            self.breed_next_generation();
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let best = self.best.as_ref().map(Candidate::to_snapshot);
        match &best {
            Some(b) => log::info!(
                "evolution finished after {} generations: best fitness {:.4}",
                generations,
                b.fitness
            ),
            None => log::warn!(
                "evolution finished after {} generations without beating threshold {}",
                generations,
                self.config.improvement_threshold
            ),
        }

        Ok(EvolutionResult {
            best,
            stats: EvolutionStats {
                generations,
                total_evaluations: generations as u64 * self.config.population.size as u64,
                best_fitness: self.best.as_ref().map(|c| c.fitness),
                final_avg_fitness: self.history.avg_fitness.last().copied().unwrap_or(f64::NAN),
                elapsed_seconds: elapsed,
            },
            history: self.history.clone(),
        })
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(|_| {})
    }
}

/// Search steering parameters for `scenario`.
///
/// Returns `Ok(None)` when no candidate ever beat the improvement threshold.
pub fn optimize(
    scenario: &Scenario,
    config: EvolutionConfig,
) -> Result<Option<FieldParams>, EvolutionError> {
    let mut engine = EvolutionEngine::new(scenario.clone(), config)?;
    Ok(engine.run()?.best_params())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::Vec3;
    use crate::schema::{ConfigError, GeneBounds, PopulationConfig, SimulationConfig};

    fn quick_config(size: usize, generations: usize) -> EvolutionConfig {
        EvolutionConfig {
            simulation: SimulationConfig {
                max_time: 30.0,
                ..Default::default()
            },
            population: PopulationConfig {
                size,
                max_generations: generations,
            },
            random_seed: Some(42),
            ..Default::default()
        }
    }

    fn near_scenario() -> Scenario {
        Scenario::new(vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 5.0, 0.0)], 2)
    }

    #[test]
    fn test_evolution_engine_creation() {
        let mut engine = EvolutionEngine::new(near_scenario(), quick_config(10, 5)).unwrap();
        engine.initialize();

        assert_eq!(engine.population().len(), 10);
        let bounds = GeneBounds::default();
        assert!(engine.population().iter().all(|c| c.params.validate(&bounds).is_ok()));
    }

    #[test]
    fn test_empty_scenario_rejected() {
        let result = EvolutionEngine::new(Scenario::new(Vec::new(), 2), quick_config(4, 1));
        assert!(matches!(
            result,
            Err(EvolutionError::Config(EvolutionConfigError::BaseConfigError(
                ConfigError::NoTargets
            )))
        ));
    }

    #[test]
    fn test_population_size_constant() {
        let mut engine = EvolutionEngine::new(near_scenario(), quick_config(7, 4)).unwrap();
        let sizes = RefCell::new(Vec::new());
        let result = engine
            .run_with_callback(|_| sizes.borrow_mut().push(0))
            .unwrap();

        assert_eq!(sizes.borrow().len(), 4);
        assert_eq!(engine.population().len(), 7);
        assert_eq!(result.history.best_fitness.len(), 4);
        assert_eq!(result.stats.total_evaluations, 28);
    }

    #[test]
    fn test_elites_survive_unchanged() {
        let mut engine = EvolutionEngine::new(near_scenario(), quick_config(6, 1)).unwrap();
        engine.initialize();
        engine.evaluate_population().unwrap();
        engine.rank_population();
        let top: Vec<(u64, FieldParams)> = engine.population()[..3]
            .iter()
            .map(|c| (c.id, c.params))
            .collect();

        engine.breed_next_generation();

        assert_eq!(engine.population().len(), 6);
        for (candidate, (id, params)) in engine.population().iter().zip(&top) {
            assert_eq!(candidate.id, *id);
            assert_eq!(candidate.params, *params);
        }
        for child in &engine.population()[3..] {
            assert_eq!(child.parents.len(), 2);
            assert!(child.parents.iter().all(|p| top.iter().any(|(id, _)| id == p)));
        }
    }

    #[test]
    fn test_best_fitness_monotone() {
        let mut engine = EvolutionEngine::new(near_scenario(), quick_config(6, 5)).unwrap();
        let bests = RefCell::new(Vec::new());
        engine
            .run_with_callback(|p| bests.borrow_mut().push(p.best_fitness))
            .unwrap();

        let bests = bests.into_inner();
        for pair in bests.windows(2) {
            if let (Some(a), Some(b)) = (pair[0], pair[1]) {
                assert!(b <= a);
            }
            if pair[0].is_some() {
                assert!(pair[1].is_some());
            }
        }
    }

    #[test]
    fn test_unreachable_threshold_reports_no_solution() {
        let config = EvolutionConfig {
            improvement_threshold: 0.0,
            ..quick_config(4, 2)
        };
        let mut engine = EvolutionEngine::new(near_scenario(), config).unwrap();
        let result = engine.run().unwrap();

        assert!(result.is_unsolved());
        assert!(result.best_params().is_none());
        assert!(result.stats.best_fitness.is_none());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = EvolutionEngine::new(near_scenario(), quick_config(5, 3))
            .unwrap()
            .run()
            .unwrap();
        let b = EvolutionEngine::new(near_scenario(), quick_config(5, 3))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(a.history.best_fitness, b.history.best_fitness);
        assert_eq!(a.best_params(), b.best_params());
    }

    #[test]
    fn test_optimize_finds_easy_solution() {
        let scenario = Scenario::new(vec![Vec3::new(-10.0, -2.0, 0.0)], 1);
        let best = optimize(&scenario, quick_config(8, 5)).unwrap();

        let params = best.expect("a nearby sensor should be easy to reach");
        assert!(params.validate(&GeneBounds::default()).is_ok());
    }
}
