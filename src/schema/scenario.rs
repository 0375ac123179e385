//! Scenario description: where the sensors are and how many drones fly.

use serde::{Deserialize, Serialize};

use super::{ConfigError, EvolutionConfig};
use crate::Vec3;

/// Fixed sensor layout plus fleet size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Ordered sensor positions.
    pub sensors: Vec<Vec3>,
    /// Number of drones launched.
    pub n_drones: usize,
}

impl Scenario {
    /// Create a scenario from sensor positions.
    pub fn new(sensors: Vec<Vec3>, n_drones: usize) -> Self {
        Self { sensors, n_drones }
    }

    /// Five sensors on the ground plane, three drones.
    pub fn demo() -> Self {
        Self {
            sensors: vec![
                Vec3::new(10.0, 10.0, 0.0),
                Vec3::new(20.0, 20.0, 0.0),
                Vec3::new(30.0, 30.0, 0.0),
                Vec3::new(12.0, 13.0, 0.0),
                Vec3::new(24.0, 35.0, 0.0),
            ],
            n_drones: 3,
        }
    }

    /// Launch position of drone `index`: a line along +y at x = -10.
    #[inline]
    pub fn start_position(index: usize) -> Vec3 {
        Vec3::new(-10.0, -10.0 + 5.0 * index as f64, 0.0)
    }

    /// Validate the scenario.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if self.n_drones == 0 {
            return Err(ConfigError::NoDrones);
        }
        if let Some(idx) = self
            .sensors
            .iter()
            .position(|s| !s.iter().all(|c| c.is_finite()))
        {
            return Err(ConfigError::NonFiniteSensor(idx));
        }
        Ok(())
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::demo()
    }
}

/// Everything one optimizer run needs, as loaded by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub scenario: Scenario,
    #[serde(default)]
    pub evolution: EvolutionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_valid() {
        let scenario = Scenario::demo();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.sensors.len(), 5);
    }

    #[test]
    fn test_start_positions() {
        assert_eq!(Scenario::start_position(0), Vec3::new(-10.0, -10.0, 0.0));
        assert_eq!(Scenario::start_position(2), Vec3::new(-10.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_sensors_rejected() {
        let scenario = Scenario::new(Vec::new(), 2);
        assert!(matches!(scenario.validate(), Err(ConfigError::NoTargets)));
    }

    #[test]
    fn test_non_finite_sensor_rejected() {
        let scenario = Scenario::new(
            vec![Vec3::zeros(), Vec3::new(f64::INFINITY, 0.0, 0.0)],
            1,
        );
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::NonFiniteSensor(1))
        ));
    }

    #[test]
    fn test_run_config_defaults() {
        let run: RunConfig =
            serde_json::from_str(r#"{ "evolution": { "random_seed": 9 } }"#).unwrap();
        assert_eq!(run.scenario.n_drones, 3);
        assert_eq!(run.evolution.random_seed, Some(9));
        assert_eq!(run.evolution.population.size, 7);
    }

    #[test]
    fn test_serialization() {
        let scenario = Scenario::demo();
        let json = serde_json::to_string(&scenario).unwrap();
        let parsed: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.sensors, scenario.sensors);
        assert_eq!(parsed.n_drones, 3);
    }
}
