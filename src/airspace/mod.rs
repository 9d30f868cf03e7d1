pub mod airport;
pub mod waypoint;

pub use airport::{Airport, AirportId};
pub use waypoint::Waypoint;

use crate::utils::Vector;

/// The playable rectangle and every waypoint inside it.
#[derive(Debug, Clone)]
pub struct Airspace {
    width: f64,
    height: f64,
    boundary_margin: f64,
    waypoints: Vec<Waypoint>,
}

impl Airspace {
    pub fn new(width: f64, height: f64, boundary_margin: f64, waypoints: Vec<Waypoint>) -> Self {
        Self {
            width,
            height,
            boundary_margin,
            waypoints,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// All waypoints: entry/exit points, airport waypoints and interior navigation points.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn entry_exit_points(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(|w| w.is_entry_or_exit())
    }

    pub fn interior_waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(|w| !w.is_entry_or_exit())
    }

    pub fn find_waypoint(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.name() == name)
    }

    pub fn is_out_of_bounds(&self, position: &Vector) -> bool {
        let (x, y) = (position.x(), position.y());
        x < self.boundary_margin
            || x > self.width - self.boundary_margin
            || y < self.boundary_margin
            || y > self.height - self.boundary_margin
    }
}
