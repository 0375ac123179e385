//! Attraction-repulsion field primitive.
//!
//! Both agent-sensor and agent-agent interactions use the same law:
//! `u * (w_att * exp(-c_att * d) - w_rep * exp(-c_rep * d))`, where `u` is
//! the unit vector from source to target and `d` their distance.

use crate::Vec3;
use crate::schema::InteractionWeights;

/// Below this distance two points are treated as coincident.
pub const COINCIDENCE_EPSILON: f64 = 1e-12;

impl InteractionWeights {
    /// Signed magnitude at distance `d`: positive pulls, negative pushes.
    #[inline]
    pub fn magnitude(&self, d: f64) -> f64 {
        self.w_att * (-self.c_att * d).exp() - self.w_rep * (-self.c_rep * d).exp()
    }
}

/// Interaction vector felt at `source` due to `target`.
///
/// Coincident points have no defined direction and contribute nothing.
#[inline]
pub fn interaction_vector(source: &Vec3, target: &Vec3, weights: &InteractionWeights) -> Vec3 {
    let offset = target - source;
    let distance = offset.norm();
    if distance <= COINCIDENCE_EPSILON {
        return Vec3::zeros();
    }
    offset * (weights.magnitude(distance) / distance)
}
