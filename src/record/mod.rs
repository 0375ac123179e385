//! Flight recording for replayed simulations.
//!
//! A [`FlightRecord`] captures everything an external plotter needs from one
//! planner run: sensor layout, the parameter set used, the outcome and every
//! agent's path. Records are stored as pretty-printed JSON:
//!
//! ```text
//! {
//!   "sensors": [[x, y, z], ...],
//!   "params": { "W_s": ..., "W_a": ..., ... },
//!   "outcome": { "elapsed_time": ..., "scanned": ..., "crashes": ..., "steps": ... },
//!   "paths": [[[x, y, z], ...], ...]
//! }
//! ```

mod flight;

pub use flight::{FlightRecord, FlightStats, RecordOptions};
