//! Fitness evaluation for steering parameter sets.
//!
//! Every evaluation builds a fresh [`PathPlanner`], runs it to completion and
//! folds the outcome into a lower-is-better score.

use serde::{Deserialize, Serialize};

use crate::compute::{PathPlanner, SimulationError, SimulationOutcome};
use crate::schema::{ConfigError, FieldParams, FitnessWeights, Scenario, SimulationConfig};

/// Evaluates parameter sets against one scenario.
pub struct FitnessEvaluator {
    scenario: Scenario,
    sim_config: SimulationConfig,
    weights: FitnessWeights,
}

/// Fitness and the sub-scores it was combined from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    /// Weighted total, lower is better.
    pub fitness: f64,
    /// Fraction of sensors left unscanned.
    pub coverage_score: f64,
    /// Elapsed time over the budget.
    pub time_score: f64,
    /// Crashes per drone.
    pub crash_score: f64,
    pub outcome: SimulationOutcome,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator. Fails fast on an empty sensor set or
    /// invalid simulation settings.
    pub fn new(
        scenario: Scenario,
        sim_config: SimulationConfig,
        weights: FitnessWeights,
    ) -> Result<Self, ConfigError> {
        scenario.validate()?;
        sim_config.validate()?;
        Ok(Self {
            scenario,
            sim_config,
            weights,
        })
    }

    #[inline]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[inline]
    pub fn sim_config(&self) -> &SimulationConfig {
        &self.sim_config
    }

    /// Run a fresh simulation and score it.
    pub fn evaluate(&self, params: &FieldParams) -> Result<FitnessBreakdown, SimulationError> {
        let mut planner = PathPlanner::from_scenario(&self.scenario, self.sim_config.clone())?;
        let outcome = planner.run(params)?;
        Ok(self.score(outcome))
    }

    /// Combine a simulation outcome into a fitness value.
    pub fn score(&self, outcome: SimulationOutcome) -> FitnessBreakdown {
        let total_sensors = self.scenario.sensors.len() as f64;
        let coverage_score = (total_sensors - outcome.scanned as f64) / total_sensors;

        let time_score = if self.sim_config.max_time > 0.0 {
            (outcome.elapsed_time / self.sim_config.max_time).min(1.0)
        } else {
            0.0
        };

        let mut crash_score = outcome.crashes as f64 / self.scenario.n_drones as f64;
        if self.weights.cap_crash_score {
            crash_score = crash_score.min(1.0);
        }

        let fitness = self.weights.coverage * coverage_score
            + self.weights.time * time_score
            + self.weights.crash * crash_score;

        FitnessBreakdown {
            fitness,
            coverage_score,
            time_score,
            crash_score,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;
    use crate::compute::evolution::GenomeRng;
    use crate::schema::{CollisionPolicy, GeneBounds};
    use proptest::prelude::*;

    fn short_config() -> SimulationConfig {
        SimulationConfig {
            max_time: 20.0,
            ..Default::default()
        }
    }

    fn evaluator(scenario: Scenario) -> FitnessEvaluator {
        FitnessEvaluator::new(scenario, short_config(), FitnessWeights::default()).unwrap()
    }

    #[test]
    fn test_empty_scenario_rejected() {
        let result = FitnessEvaluator::new(
            Scenario::new(Vec::new(), 3),
            SimulationConfig::default(),
            FitnessWeights::default(),
        );
        assert!(matches!(result, Err(ConfigError::NoTargets)));
    }

    #[test]
    fn test_score_components() {
        let eval = evaluator(Scenario::new(vec![Vec3::zeros(); 4], 2));
        let breakdown = eval.score(SimulationOutcome {
            elapsed_time: 10.0,
            scanned: 1,
            crashes: 1,
            steps: 100,
        });

        assert!((breakdown.coverage_score - 0.75).abs() < 1e-12);
        assert!((breakdown.time_score - 0.5).abs() < 1e-12);
        assert!((breakdown.crash_score - 0.5).abs() < 1e-12);
        let expected = 0.6 * 0.75 + 0.1 * 0.5 + 0.3 * 0.5;
        assert!((breakdown.fitness - expected).abs() < 1e-12);
    }

    #[test]
    fn test_crash_score_keeps_ranking_heavy_collisions() {
        let eval = evaluator(Scenario::new(vec![Vec3::zeros()], 2));
        let outcome = |crashes| SimulationOutcome {
            elapsed_time: 20.0,
            scanned: 0,
            crashes,
            steps: 200,
        };

        let few = eval.score(outcome(2));
        let many = eval.score(outcome(2000));
        assert!((few.crash_score - 1.0).abs() < 1e-12);
        assert!((many.crash_score - 1000.0).abs() < 1e-12);
        assert!(many.fitness > few.fitness);

        let capped = FitnessEvaluator::new(
            Scenario::new(vec![Vec3::zeros()], 2),
            short_config(),
            FitnessWeights {
                cap_crash_score: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(capped.score(outcome(2000)).crash_score, 1.0);
        assert_eq!(capped.score(outcome(2000)).fitness, capped.score(outcome(2)).fitness);
    }

    #[test]
    fn test_out_of_bounds_params_fail_evaluation() {
        let eval = evaluator(Scenario::new(vec![Vec3::zeros()], 1));
        let mut params = GenomeRng::new(1).random_params(&GeneBounds::default());
        params.c_sensor_att = -100.0;
        assert!(matches!(eval.evaluate(&params), Err(SimulationError::Params(_))));
    }

    #[test]
    fn test_perfect_run_scores_low() {
        let eval = evaluator(Scenario::new(vec![Vec3::zeros()], 1));
        let params = FieldParams {
            w_s: 10.0,
            w_a: 1.0,
            w_sensor_att: 1.0,
            w_sensor_rep: 0.0,
            c_sensor_att: 0.01,
            c_sensor_rep: 0.0,
            w_agent_att: 0.0,
            w_agent_rep: 0.0,
            c_agent_att: 0.0,
            c_agent_rep: 0.0,
        };

        let breakdown = eval.evaluate(&params).unwrap();
        assert_eq!(breakdown.outcome.scanned, 1);
        assert_eq!(breakdown.coverage_score, 0.0);
        assert!(breakdown.fitness < 0.1);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let eval = evaluator(Scenario::demo());
        let params = GenomeRng::new(3).random_params(&GeneBounds::default());
        let a = eval.evaluate(&params).unwrap();
        let b = eval.evaluate(&params).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_fitness_bounded_when_capped(seed in any::<u64>()) {
            let weights = FitnessWeights {
                cap_crash_score: true,
                ..Default::default()
            };
            let eval = FitnessEvaluator::new(Scenario::demo(), short_config(), weights).unwrap();
            let params = GenomeRng::new(seed).random_params(&GeneBounds::default());
            let breakdown = eval.evaluate(&params).unwrap();
            prop_assert!(breakdown.fitness >= 0.0);
            prop_assert!(breakdown.fitness <= 1.0 + 1e-12);
        }

        #[test]
        fn prop_fitness_non_negative_per_incident(seed in any::<u64>()) {
            let config = SimulationConfig {
                collision_policy: CollisionPolicy::PerIncident,
                ..short_config()
            };
            let eval =
                FitnessEvaluator::new(Scenario::demo(), config, FitnessWeights::default()).unwrap();
            let params = GenomeRng::new(seed).random_params(&GeneBounds::default());
            let breakdown = eval.evaluate(&params).unwrap();
            prop_assert!(breakdown.fitness >= 0.0);
            prop_assert!(breakdown.coverage_score <= 1.0);
            prop_assert!(breakdown.time_score <= 1.0);
        }
    }
}
