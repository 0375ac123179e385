//! Schema module - Configuration, scenario and parameter types.

mod config;
mod evolution;
mod params;
mod scenario;

pub use config::*;
pub use evolution::*;
pub use params::*;
pub use scenario::*;
