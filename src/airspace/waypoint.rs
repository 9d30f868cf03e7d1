use serde::{Deserialize, Serialize};

use crate::utils::Vector;

/// A named point in the airspace.
///
/// Entry/exit waypoints mark the airspace boundary (including airports). They are only ever
/// used as a flight's origin or destination, never as an intermediate hop or a reroute target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    location: Vector,
    name: String,
    is_entry_or_exit: bool,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, is_entry_or_exit: bool, name: impl Into<String>) -> Self {
        Self {
            location: Vector::planar(x, y),
            name: name.into(),
            is_entry_or_exit,
        }
    }

    /// Interior navigation point placed relative to the airspace extent.
    pub fn relative(fx: f64, fy: f64, name: impl Into<String>, width: f64, height: f64) -> Self {
        let location = Vector::planar(fx, fy).remap_position(width, height);
        Self::new(location.x(), location.y(), false, name)
    }

    pub fn location(&self) -> Vector {
        self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_entry_or_exit(&self) -> bool {
        self.is_entry_or_exit
    }

    /// Traversal cost to another waypoint: planar Euclidean distance. Symmetric.
    pub fn cost(&self, other: &Waypoint) -> f64 {
        self.location.distance_squared_xy(&other.location).sqrt()
    }
}
