//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation, crossover, and mutation of [`FieldParams`].

use rand::prelude::*;

use crate::schema::{FieldParams, Gene, GeneBounds, MutationKind};

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random parameter set within bounds.
    pub fn random_params(&mut self, bounds: &GeneBounds) -> FieldParams {
        FieldParams::from_array(Gene::ALL.map(|g| self.uniform(bounds.get(g))))
    }

    /// Uniform random in bounds.
    fn uniform(&mut self, bounds: (f64, f64)) -> f64 {
        self.rng.gen_range(bounds.0..=bounds.1)
    }

    /// Gaussian mutation: add noise scaled by the bound width.
    pub fn gaussian_mutate(&mut self, value: f64, strength: f64, bounds: (f64, f64)) -> f64 {
        let noise: f64 = self.rng.sample(rand_distr::StandardNormal);
        let mutated = value + noise * strength * (bounds.1 - bounds.0);
        mutated.clamp(bounds.0, bounds.1)
    }

    /// Uniform crossover: each gene comes from either parent with equal
    /// probability.
    pub fn crossover(&mut self, parent1: &FieldParams, parent2: &FieldParams) -> FieldParams {
        let mut child = *parent1;
        for gene in Gene::ALL {
            if !self.rng.gen_bool(0.5) {
                child.set(gene, parent2.get(gene));
            }
        }
        child
    }

    /// Mutate each gene independently with probability `rate`.
    pub fn mutate(
        &mut self,
        params: &FieldParams,
        rate: f64,
        kind: MutationKind,
        bounds: &GeneBounds,
    ) -> FieldParams {
        let mut mutated = *params;
        for gene in Gene::ALL {
            if self.rng.r#gen::<f64>() < rate {
                let range = bounds.get(gene);
                let value = match kind {
                    MutationKind::Resample => self.uniform(range),
                    MutationKind::Gaussian { strength } => {
                        self.gaussian_mutate(mutated.get(gene), strength, range)
                    }
                };
                mutated.set(gene, value);
            }
        }
        mutated
    }

    /// Uniform index in `0..len`.
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Mean absolute gene difference, each gene normalized by its bound width.
pub fn genome_distance(p1: &FieldParams, p2: &FieldParams, bounds: &GeneBounds) -> f64 {
    let total: f64 = Gene::ALL
        .into_iter()
        .map(|g| {
            let width = bounds.width(g);
            let diff = (p1.get(g) - p2.get(g)).abs();
            if width > 0.0 { diff / width } else { 0.0 }
        })
        .sum();
    total / Gene::COUNT as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn in_bounds(params: &FieldParams, bounds: &GeneBounds) -> bool {
        params.validate(bounds).is_ok()
    }

    #[test]
    fn test_random_params() {
        let mut rng = GenomeRng::new(42);
        let bounds = GeneBounds::default();

        for _ in 0..100 {
            let params = rng.random_params(&bounds);
            assert!(in_bounds(&params, &bounds));
            assert!(params.w_s >= 1.0 && params.w_s <= 10.0);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let bounds = GeneBounds::default();
        let a = GenomeRng::new(7).random_params(&bounds);
        let b = GenomeRng::new(7).random_params(&bounds);
        assert_eq!(a, b);
    }

    #[test]
    fn test_crossover_with_self_is_identity() {
        let mut rng = GenomeRng::new(42);
        let bounds = GeneBounds::default();
        let params = rng.random_params(&bounds);

        for _ in 0..20 {
            assert_eq!(rng.crossover(&params, &params), params);
        }
    }

    #[test]
    fn test_crossover_takes_genes_from_parents() {
        let mut rng = GenomeRng::new(42);
        let bounds = GeneBounds::default();
        let p1 = rng.random_params(&bounds);
        let p2 = rng.random_params(&bounds);

        let child = rng.crossover(&p1, &p2);
        for gene in Gene::ALL {
            let v = child.get(gene);
            assert!(v == p1.get(gene) || v == p2.get(gene));
        }
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let mut rng = GenomeRng::new(42);
        let bounds = GeneBounds::default();
        let params = rng.random_params(&bounds);

        let mutated = rng.mutate(&params, 0.0, MutationKind::Resample, &bounds);
        assert_eq!(mutated, params);
    }

    #[test]
    fn test_mutation_rate_one_stays_in_bounds() {
        let mut rng = GenomeRng::new(42);
        let bounds = GeneBounds::default();
        let params = rng.random_params(&bounds);

        let mutated = rng.mutate(&params, 1.0, MutationKind::Resample, &bounds);
        assert!(in_bounds(&mutated, &bounds));
        assert_ne!(mutated, params);
    }

    #[test]
    fn test_genome_distance() {
        let mut rng = GenomeRng::new(42);
        let bounds = GeneBounds::default();

        let g1 = rng.random_params(&bounds);
        let g2 = g1;
        let g3 = rng.random_params(&bounds);

        assert!(genome_distance(&g1, &g2, &bounds).abs() < 1e-12);
        let d = genome_distance(&g1, &g3, &bounds);
        assert!(d > 0.0 && d <= 1.0);
    }

    proptest! {
        #[test]
        fn prop_mutation_respects_bounds(
            seed in any::<u64>(),
            rate in 0.0f64..=1.0,
            strength in 0.0f64..2.0,
        ) {
            let mut rng = GenomeRng::new(seed);
            let bounds = GeneBounds::default();
            let params = rng.random_params(&bounds);

            let resampled = rng.mutate(&params, rate, MutationKind::Resample, &bounds);
            prop_assert!(in_bounds(&resampled, &bounds));

            let nudged = rng.mutate(&params, rate, MutationKind::Gaussian { strength }, &bounds);
            prop_assert!(in_bounds(&nudged, &bounds));
        }
    }
}
