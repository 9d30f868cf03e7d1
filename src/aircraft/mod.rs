pub mod aircraft;
pub mod altitude;
pub mod flight_plan;
pub mod separation;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use aircraft::{Aircraft, FlightRequest};
pub use altitude::AltitudeState;
pub use flight_plan::FlightPlan;
pub use separation::{run_separation_pass, Contact, SeparationMonitor};

/// Match-unique aircraft handle, assigned in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AircraftId(pub u64);

impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aircraft#{}", self.0)
    }
}
