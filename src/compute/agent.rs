//! Point-mass agent kinematics.

use crate::Vec3;
use crate::schema::AgentConfig;

/// One mobile body: integrates acceleration into velocity and position and
/// records every position it visits.
#[derive(Debug, Clone)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Set by the planner before each [`Agent::update`].
    pub acceleration: Vec3,
    pub mass: f64,
    pub max_velocity: f64,
    path: Vec<Vec3>,
}

impl Agent {
    /// Create an agent at rest.
    pub fn new(position: Vec3, config: &AgentConfig) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            mass: config.mass,
            max_velocity: config.max_velocity,
            path: vec![position],
        }
    }

    /// Advance by `dt` (semi-implicit Euler with a speed cap).
    pub fn update(&mut self, dt: f64) {
        self.velocity += self.acceleration * dt;

        let speed = self.velocity.norm();
        if speed > self.max_velocity {
            self.velocity *= self.max_velocity / speed;
        }

        self.position += self.velocity * dt;
        self.path.push(self.position);
    }

    /// Recorded positions, starting with the launch position.
    #[inline]
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}
