//! Configuration types for the field simulator.

use serde::{Deserialize, Serialize};

use super::{Gene, GeneBounds};

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Integration time step in simulated seconds.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Simulated time budget for one run.
    #[serde(default = "default_max_time")]
    pub max_time: f64,
    /// Fixed propulsion force converted into acceleration via agent mass.
    #[serde(default = "default_propulsion_force")]
    pub propulsion_force: f64,
    /// Distance at which a sensor counts as scanned.
    #[serde(default = "default_radius")]
    pub transmission_radius: f64,
    /// Distance at which two agents count as collided.
    #[serde(default = "default_radius")]
    pub crash_radius: f64,
    /// Physical properties shared by all agents.
    #[serde(default)]
    pub agent: AgentConfig,
    /// How agents observe each other within one step.
    #[serde(default)]
    pub update_order: UpdateOrder,
    /// How proximity between agents accumulates into the crash count.
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    /// Range every gene must lie in before a run starts. Decay rates below
    /// zero make the field grow without limit.
    #[serde(default)]
    pub gene_bounds: GeneBounds,
}

fn default_dt() -> f64 {
    0.1
}
fn default_max_time() -> f64 {
    1200.0
}
fn default_propulsion_force() -> f64 {
    100.0
}
fn default_radius() -> f64 {
    2.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            max_time: default_max_time(),
            propulsion_force: default_propulsion_force(),
            transmission_radius: default_radius(),
            crash_radius: default_radius(),
            agent: AgentConfig::default(),
            update_order: UpdateOrder::default(),
            collision_policy: CollisionPolicy::default(),
            gene_bounds: GeneBounds::default(),
        }
    }
}

/// Physical properties of a single agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgentConfig {
    pub mass: f64,
    /// Speed cap applied after every velocity update.
    pub max_velocity: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mass: 5.0,
            max_velocity: 10.0,
        }
    }
}

/// Order in which agents are advanced within one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateOrder {
    /// All agents steer from the same start-of-step snapshot of positions.
    #[default]
    Synchronous,
    /// Agents are advanced one at a time; later agents see the already
    /// updated positions of earlier ones.
    Sequential,
}

/// Accumulation rule for the crash counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Every pair within `crash_radius` counts once per step it stays there.
    #[default]
    PerStep,
    /// A pair counts once each time it enters `crash_radius`.
    PerIncident,
}

impl SimulationConfig {
    /// Number of steps needed to exhaust `max_time`.
    #[inline]
    pub fn step_budget(&self) -> u64 {
        (self.max_time / self.dt).ceil() as u64
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(ConfigError::InvalidTimeStep);
        }
        if !(self.max_time >= 0.0 && self.max_time.is_finite()) {
            return Err(ConfigError::InvalidTimeBudget(self.max_time));
        }
        if !(self.propulsion_force >= 0.0 && self.propulsion_force.is_finite()) {
            return Err(ConfigError::InvalidPropulsion(self.propulsion_force));
        }
        if !(self.transmission_radius >= 0.0) {
            return Err(ConfigError::InvalidRadius {
                name: "transmission_radius",
                value: self.transmission_radius,
            });
        }
        if !(self.crash_radius >= 0.0) {
            return Err(ConfigError::InvalidRadius {
                name: "crash_radius",
                value: self.crash_radius,
            });
        }
        if !(self.agent.mass > 0.0 && self.agent.mass.is_finite()) {
            return Err(ConfigError::InvalidMass(self.agent.mass));
        }
        if !(self.agent.max_velocity > 0.0) {
            return Err(ConfigError::InvalidMaxVelocity(self.agent.max_velocity));
        }
        if let Some(gene) = self.gene_bounds.first_invalid() {
            return Err(ConfigError::InvalidGeneBounds(gene));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Time step must be positive and finite")]
    InvalidTimeStep,
    #[error("Time budget must be non-negative and finite, got {0}")]
    InvalidTimeBudget(f64),
    #[error("Propulsion force must be non-negative and finite, got {0}")]
    InvalidPropulsion(f64),
    #[error("{name} must be non-negative, got {value}")]
    InvalidRadius { name: &'static str, value: f64 },
    #[error("Agent mass must be positive, got {0}")]
    InvalidMass(f64),
    #[error("Agent max velocity must be positive, got {0}")]
    InvalidMaxVelocity(f64),
    #[error("No targets configured: the sensor set is empty")]
    NoTargets,
    #[error("Drone count must be non-zero")]
    NoDrones,
    #[error("Sensor {0} has a non-finite coordinate")]
    NonFiniteSensor(usize),
    #[error("Invalid parameter bounds for gene {0}")]
    InvalidGeneBounds(Gene),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step_budget(), 12000);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SimulationConfig {
            dt: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeStep)));

        let config = SimulationConfig {
            agent: AgentConfig {
                mass: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMass(_))));

        let config = SimulationConfig {
            crash_radius: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRadius { name: "crash_radius", .. })
        ));

        let mut config = SimulationConfig::default();
        config.gene_bounds.ranges[Gene::SensorRepDecay.index()] = (0.5, f64::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGeneBounds(Gene::SensorRepDecay))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "max_time": 60.0, "update_order": "Sequential" }"#).unwrap();
        assert_eq!(config.max_time, 60.0);
        assert_eq!(config.dt, 0.1);
        assert_eq!(config.update_order, UpdateOrder::Sequential);
        assert_eq!(config.collision_policy, CollisionPolicy::PerStep);
    }
}
