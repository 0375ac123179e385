//! Flight record capture and JSON persistence.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Vec3;
use crate::compute::{PathPlanner, SimulationOutcome};
use crate::schema::FieldParams;

/// Options for capturing a flight record.
#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// Keep every Nth path point (1 = every point). The final point of each
    /// path is always kept.
    pub frame_skip: usize,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self { frame_skip: 1 }
    }
}

/// Trajectories of one replayed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    pub sensors: Vec<Vec3>,
    pub params: FieldParams,
    pub outcome: SimulationOutcome,
    /// One path per drone, in launch order.
    pub paths: Vec<Vec<Vec3>>,
}

impl FlightRecord {
    /// Capture the state of a planner after a run.
    pub fn capture(
        planner: &PathPlanner,
        params: FieldParams,
        outcome: SimulationOutcome,
        options: &RecordOptions,
    ) -> Self {
        let skip = options.frame_skip.max(1);
        let paths = planner
            .paths()
            .into_iter()
            .map(|path| {
                let mut points: Vec<Vec3> = path.iter().step_by(skip).copied().collect();
                if (path.len() - 1) % skip != 0
                    && let Some(last) = path.last()
                {
                    points.push(*last);
                }
                points
            })
            .collect();

        Self {
            sensors: planner.sensors().to_vec(),
            params,
            outcome,
            paths,
        }
    }

    /// Write the record as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.flush()
    }

    /// Read a record written by [`FlightRecord::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Summary statistics of the recorded flight.
    pub fn stats(&self) -> FlightStats {
        let distances: Vec<f64> = self
            .paths
            .iter()
            .map(|p| p.windows(2).map(|w| (w[1] - w[0]).norm()).sum::<f64>())
            .collect();
        let total_distance: f64 = distances.iter().sum();

        FlightStats {
            drones: self.paths.len(),
            sensors: self.sensors.len(),
            scanned: self.outcome.scanned,
            crashes: self.outcome.crashes,
            elapsed_time: self.outcome.elapsed_time,
            total_distance,
            longest_flight: distances.iter().copied().fold(0.0, f64::max),
        }
    }
}

/// Summary of a flight record.
#[derive(Debug, Clone)]
pub struct FlightStats {
    pub drones: usize,
    pub sensors: usize,
    pub scanned: usize,
    pub crashes: usize,
    pub elapsed_time: f64,
    /// Distance flown by all drones together.
    pub total_distance: f64,
    /// Distance flown by the busiest drone.
    pub longest_flight: f64,
}

impl std::fmt::Display for FlightStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} drones, {}/{} sensors scanned in {:.1}s, {} crashes, {:.1} m flown ({:.1} m max)",
            self.drones,
            self.scanned,
            self.sensors,
            self.elapsed_time,
            self.crashes,
            self.total_distance,
            self.longest_flight
        )
    }
}
