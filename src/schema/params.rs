//! The ten-gene steering parameter set and its bounds.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One named, bounded scalar of a [`FieldParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gene {
    SensorGain,
    AgentGain,
    SensorAttWeight,
    SensorRepWeight,
    SensorAttDecay,
    SensorRepDecay,
    AgentAttWeight,
    AgentRepWeight,
    AgentAttDecay,
    AgentRepDecay,
}

impl Gene {
    pub const COUNT: usize = 10;

    /// All genes in layout order.
    pub const ALL: [Gene; Gene::COUNT] = [
        Gene::SensorGain,
        Gene::AgentGain,
        Gene::SensorAttWeight,
        Gene::SensorRepWeight,
        Gene::SensorAttDecay,
        Gene::SensorRepDecay,
        Gene::AgentAttWeight,
        Gene::AgentRepWeight,
        Gene::AgentAttDecay,
        Gene::AgentRepDecay,
    ];

    /// Position of this gene in [`Gene::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// External name used in serialized parameter sets.
    pub fn name(self) -> &'static str {
        match self {
            Gene::SensorGain => "W_s",
            Gene::AgentGain => "W_a",
            Gene::SensorAttWeight => "w_sensor_att",
            Gene::SensorRepWeight => "w_sensor_rep",
            Gene::SensorAttDecay => "c_sensor_att",
            Gene::SensorRepDecay => "c_sensor_rep",
            Gene::AgentAttWeight => "w_agent_att",
            Gene::AgentRepWeight => "w_agent_rep",
            Gene::AgentAttDecay => "c_agent_att",
            Gene::AgentRepDecay => "c_agent_rep",
        }
    }

    /// Look up a gene by its external name.
    pub fn from_name(name: &str) -> Option<Gene> {
        Gene::ALL.into_iter().find(|g| g.name() == name)
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weight quadruple of one attraction-repulsion interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionWeights {
    pub w_att: f64,
    pub w_rep: f64,
    pub c_att: f64,
    pub c_rep: f64,
}

/// Steering parameter set: combination gains plus the sensor and agent
/// interaction quadruples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldParams {
    #[serde(rename = "W_s")]
    pub w_s: f64,
    #[serde(rename = "W_a")]
    pub w_a: f64,
    pub w_sensor_att: f64,
    pub w_sensor_rep: f64,
    pub c_sensor_att: f64,
    pub c_sensor_rep: f64,
    pub w_agent_att: f64,
    pub w_agent_rep: f64,
    pub c_agent_att: f64,
    pub c_agent_rep: f64,
}

impl FieldParams {
    /// Build from a gene array in [`Gene::ALL`] order.
    pub fn from_array(values: [f64; Gene::COUNT]) -> Self {
        let mut params = Self::zeroed();
        for (gene, value) in Gene::ALL.into_iter().zip(values) {
            params.set(gene, value);
        }
        params
    }

    fn zeroed() -> Self {
        Self {
            w_s: 0.0,
            w_a: 0.0,
            w_sensor_att: 0.0,
            w_sensor_rep: 0.0,
            c_sensor_att: 0.0,
            c_sensor_rep: 0.0,
            w_agent_att: 0.0,
            w_agent_rep: 0.0,
            c_agent_att: 0.0,
            c_agent_rep: 0.0,
        }
    }

    /// Build from a name-keyed map. Every gene must be present exactly once
    /// and no other key is accepted.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, ParamsError> {
        if let Some(unknown) = map.keys().find(|k| Gene::from_name(k).is_none()) {
            return Err(ParamsError::UnknownGene(unknown.clone()));
        }
        let mut params = Self::zeroed();
        for gene in Gene::ALL {
            let value = map
                .get(gene.name())
                .copied()
                .ok_or(ParamsError::MissingGene(gene))?;
            params.set(gene, value);
        }
        Ok(params)
    }

    /// Name-keyed view of the genes.
    pub fn to_map(&self) -> HashMap<String, f64> {
        Gene::ALL
            .into_iter()
            .map(|g| (g.name().to_string(), self.get(g)))
            .collect()
    }

    /// Gene values in [`Gene::ALL`] order.
    pub fn to_array(&self) -> [f64; Gene::COUNT] {
        Gene::ALL.map(|g| self.get(g))
    }

    pub fn get(&self, gene: Gene) -> f64 {
        match gene {
            Gene::SensorGain => self.w_s,
            Gene::AgentGain => self.w_a,
            Gene::SensorAttWeight => self.w_sensor_att,
            Gene::SensorRepWeight => self.w_sensor_rep,
            Gene::SensorAttDecay => self.c_sensor_att,
            Gene::SensorRepDecay => self.c_sensor_rep,
            Gene::AgentAttWeight => self.w_agent_att,
            Gene::AgentRepWeight => self.w_agent_rep,
            Gene::AgentAttDecay => self.c_agent_att,
            Gene::AgentRepDecay => self.c_agent_rep,
        }
    }

    pub fn set(&mut self, gene: Gene, value: f64) {
        let slot = match gene {
            Gene::SensorGain => &mut self.w_s,
            Gene::AgentGain => &mut self.w_a,
            Gene::SensorAttWeight => &mut self.w_sensor_att,
            Gene::SensorRepWeight => &mut self.w_sensor_rep,
            Gene::SensorAttDecay => &mut self.c_sensor_att,
            Gene::SensorRepDecay => &mut self.c_sensor_rep,
            Gene::AgentAttWeight => &mut self.w_agent_att,
            Gene::AgentRepWeight => &mut self.w_agent_rep,
            Gene::AgentAttDecay => &mut self.c_agent_att,
            Gene::AgentRepDecay => &mut self.c_agent_rep,
        };
        *slot = value;
    }

    /// Quadruple used between an agent and an unvisited sensor.
    #[inline]
    pub fn sensor_weights(&self) -> InteractionWeights {
        InteractionWeights {
            w_att: self.w_sensor_att,
            w_rep: self.w_sensor_rep,
            c_att: self.c_sensor_att,
            c_rep: self.c_sensor_rep,
        }
    }

    /// Quadruple used between two agents.
    #[inline]
    pub fn agent_weights(&self) -> InteractionWeights {
        InteractionWeights {
            w_att: self.w_agent_att,
            w_rep: self.w_agent_rep,
            c_att: self.c_agent_att,
            c_rep: self.c_agent_rep,
        }
    }

    /// Reject NaN and infinite genes.
    pub fn check_finite(&self) -> Result<(), ParamsError> {
        match Gene::ALL.into_iter().find(|&g| !self.get(g).is_finite()) {
            Some(gene) => Err(ParamsError::NonFinite(gene)),
            None => Ok(()),
        }
    }

    /// Check every gene against `bounds`.
    pub fn validate(&self, bounds: &GeneBounds) -> Result<(), ParamsError> {
        self.check_finite()?;
        for gene in Gene::ALL {
            let value = self.get(gene);
            let (min, max) = bounds.get(gene);
            if value < min || value > max {
                return Err(ParamsError::OutOfBounds {
                    gene,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Inclusive per-gene bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneBounds {
    /// `(min, max)` per gene, in [`Gene::ALL`] order.
    pub ranges: [(f64, f64); Gene::COUNT],
}

impl Default for GeneBounds {
    fn default() -> Self {
        let mut ranges = [(0.0, 1.0); Gene::COUNT];
        ranges[Gene::SensorGain.index()] = (1.0, 10.0);
        ranges[Gene::AgentGain.index()] = (1.0, 10.0);
        Self { ranges }
    }
}

impl GeneBounds {
    #[inline]
    pub fn get(&self, gene: Gene) -> (f64, f64) {
        self.ranges[gene.index()]
    }

    #[inline]
    pub fn width(&self, gene: Gene) -> f64 {
        let (min, max) = self.get(gene);
        max - min
    }

    /// First gene whose range is empty or non-finite.
    pub fn first_invalid(&self) -> Option<Gene> {
        Gene::ALL.into_iter().find(|&g| {
            let (min, max) = self.get(g);
            !(min.is_finite() && max.is_finite() && min <= max)
        })
    }
}

/// Parameter set errors.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Incomplete parameter set: missing gene {0}")]
    MissingGene(Gene),
    #[error("Unknown gene name: {0}")]
    UnknownGene(String),
    #[error("Gene {0} is not finite")]
    NonFinite(Gene),
    #[error("Gene {gene} = {value} outside [{min}, {max}]")]
    OutOfBounds {
        gene: Gene,
        value: f64,
        min: f64,
        max: f64,
    },
}
