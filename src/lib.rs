//! Air traffic control simulation core: flight dynamics, route following, separation
//! monitoring and the match loop around them.

pub mod aircraft;
pub mod airspace;
pub mod config;
pub mod error;
pub mod scenario;
pub mod scoring;
pub mod simulation;
pub mod utils;

pub use error::{SimError, SimResult};
