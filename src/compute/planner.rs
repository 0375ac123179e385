//! Path planner - field simulator driving the drone fleet.
//!
//! Owns the agents and the sensor set. Each step steers every agent along the
//! normalized attraction-repulsion field, advances it, then updates the
//! scanned-sensor bookkeeping and the collision counter.

use serde::{Deserialize, Serialize};

use crate::Vec3;
use crate::schema::{
    CollisionPolicy, ConfigError, FieldParams, ParamsError, Scenario, SimulationConfig,
    UpdateOrder,
};

use super::{Agent, interaction_vector};

/// Result of one [`PathPlanner::simulate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Simulated time elapsed.
    pub elapsed_time: f64,
    /// Sensors newly scanned during the run.
    pub scanned: usize,
    /// Accumulated collision count.
    pub crashes: usize,
    /// Integration steps taken.
    pub steps: u64,
}

/// Counts produced by a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub scanned: usize,
    pub crashes: usize,
}

/// Errors raised before a simulation starts.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid parameter set: {0}")]
    Params(#[from] ParamsError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Time budget must be non-negative and finite, got {0}")]
    InvalidTimeBudget(f64),
}

/// Field simulator for one fleet over one sensor layout.
pub struct PathPlanner {
    config: SimulationConfig,
    sensors: Vec<Vec3>,
    agents: Vec<Agent>,
    visited: Vec<bool>,
    remaining: usize,
    /// Pairs currently within `crash_radius`, upper-triangle order.
    in_contact: Vec<bool>,
    /// Positions the current agent steers against.
    positions: Vec<Vec3>,
    time: f64,
    steps: u64,
}

impl PathPlanner {
    /// Create a planner with `n_drones` agents at their launch positions and
    /// every sensor unvisited.
    pub fn new(
        sensors: &[Vec3],
        n_drones: usize,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if sensors.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if let Some(idx) = sensors.iter().position(|s| !s.iter().all(|c| c.is_finite())) {
            return Err(ConfigError::NonFiniteSensor(idx));
        }

        let agents: Vec<Agent> = (0..n_drones)
            .map(|i| Agent::new(Scenario::start_position(i), &config.agent))
            .collect();
        let positions = agents.iter().map(|a| a.position).collect();
        let pairs = n_drones * n_drones.saturating_sub(1) / 2;

        Ok(Self {
            config,
            sensors: sensors.to_vec(),
            agents,
            visited: vec![false; sensors.len()],
            remaining: sensors.len(),
            in_contact: vec![false; pairs],
            positions,
            time: 0.0,
            steps: 0,
        })
    }

    /// Create a planner for a scenario.
    pub fn from_scenario(
        scenario: &Scenario,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        scenario.validate()?;
        Self::new(&scenario.sensors, scenario.n_drones, config)
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn sensors(&self) -> &[Vec3] {
        &self.sensors
    }

    /// Recorded path of every agent, each of length `steps + 1`.
    pub fn paths(&self) -> Vec<&[Vec3]> {
        self.agents.iter().map(|a| a.path()).collect()
    }

    /// Whether `sensor` has been scanned. Unknown indices are never visited.
    #[inline]
    pub fn is_visited(&self, sensor: usize) -> bool {
        self.visited.get(sensor).copied().unwrap_or(false)
    }

    /// Indices of sensors not yet scanned, in order.
    pub fn unvisited_sensors(&self) -> impl Iterator<Item = usize> + '_ {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, v)| !**v)
            .map(|(i, _)| i)
    }

    #[inline]
    pub fn remaining_sensors(&self) -> usize {
        self.remaining
    }

    /// True once every sensor has been scanned.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Unit steering direction for agent `idx`, or zero if the field cancels
    /// or is not finite.
    ///
    /// Other agents are read from the positions snapshot so that the update
    /// order decides what each agent sees.
    pub fn propulsion_direction(&self, idx: usize, params: &FieldParams) -> Vec3 {
        let origin = self.positions[idx];

        let sensor_weights = params.sensor_weights();
        let sensor_sum: Vec3 = self
            .unvisited_sensors()
            .map(|s| interaction_vector(&origin, &self.sensors[s], &sensor_weights))
            .sum();

        let agent_weights = params.agent_weights();
        let agent_sum: Vec3 = self
            .positions
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != idx)
            .map(|(_, other)| interaction_vector(&origin, other, &agent_weights))
            .sum();

        let total = sensor_sum * params.w_s + agent_sum * params.w_a;
        if !total.iter().all(|c| c.is_finite()) {
            return Vec3::zeros();
        }
        total.try_normalize(0.0).unwrap_or_else(Vec3::zeros)
    }

    /// Steer and advance every agent by one `dt`.
    fn advance_agents(&mut self, params: &FieldParams) {
        let dt = self.config.dt;
        let sequential = self.config.update_order == UpdateOrder::Sequential;

        for (slot, agent) in self.positions.iter_mut().zip(&self.agents) {
            *slot = agent.position;
        }

        for i in 0..self.agents.len() {
            let direction = self.propulsion_direction(i, params);
            let agent = &mut self.agents[i];
            agent.acceleration = direction * (self.config.propulsion_force / agent.mass);
            agent.update(dt);
            if sequential {
                self.positions[i] = agent.position;
            }
        }
    }

    /// Mark every unvisited sensor that has an agent within
    /// `transmission_radius`. Returns how many were newly scanned.
    pub fn check_sensor_scanning(&mut self) -> usize {
        let radius = self.config.transmission_radius;
        let scanned: Vec<usize> = self
            .unvisited_sensors()
            .filter(|&s| {
                self.agents
                    .iter()
                    .any(|a| (a.position - self.sensors[s]).norm() <= radius)
            })
            .collect();

        for &s in &scanned {
            self.visited[s] = true;
        }
        self.remaining -= scanned.len();
        scanned.len()
    }

    /// Count agent pairs within `crash_radius` according to the collision
    /// policy.
    pub fn check_collisions(&mut self) -> usize {
        let radius = self.config.crash_radius;
        let per_step = self.config.collision_policy == CollisionPolicy::PerStep;
        let n = self.agents.len();
        let mut crashes = 0;
        let mut pair = 0;

        for i in 0..n {
            for j in (i + 1)..n {
                let close = (self.agents[i].position - self.agents[j].position).norm() <= radius;
                if close && (per_step || !self.in_contact[pair]) {
                    crashes += 1;
                }
                self.in_contact[pair] = close;
                pair += 1;
            }
        }
        crashes
    }

    /// Run one full step: steer, advance, scan, count collisions.
    pub fn step(&mut self, params: &FieldParams) -> StepReport {
        self.advance_agents(params);
        let scanned = self.check_sensor_scanning();
        let crashes = self.check_collisions();

        self.steps += 1;
        self.time = self.steps as f64 * self.config.dt;

        StepReport { scanned, crashes }
    }

    /// Step until every sensor is scanned or `max_time` is reached.
    ///
    /// Both terminal conditions are normal outcomes. The parameter set is
    /// checked against the configured gene bounds before any state changes.
    pub fn simulate(
        &mut self,
        params: &FieldParams,
        max_time: f64,
    ) -> Result<SimulationOutcome, SimulationError> {
        params.validate(&self.config.gene_bounds)?;
        if !(max_time >= 0.0 && max_time.is_finite()) {
            return Err(SimulationError::InvalidTimeBudget(max_time));
        }

        let start_time = self.time;
        let start_steps = self.steps;
        let mut scanned = 0;
        let mut crashes = 0;

        while self.time < max_time && !self.is_complete() {
            let report = self.step(params);
            scanned += report.scanned;
            crashes += report.crashes;
        }

        log::trace!(
            "simulation finished at t={:.1}: scanned {}/{}, crashes {}",
            self.time,
            self.sensors.len() - self.remaining,
            self.sensors.len(),
            crashes
        );

        Ok(SimulationOutcome {
            elapsed_time: self.time - start_time,
            scanned,
            crashes,
            steps: self.steps - start_steps,
        })
    }

    /// [`simulate`](Self::simulate) with the configured time budget.
    pub fn run(&mut self, params: &FieldParams) -> Result<SimulationOutcome, SimulationError> {
        let max_time = self.config.max_time;
        self.simulate(params, max_time)
    }
}
