use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::aircraft::FlightPlan;
use crate::airspace::{Airport, AirportId, Airspace, Waypoint};
use crate::config::{CarrierConfig, ScenarioConfig};
use crate::error::{SimError, SimResult};

/// Keeps boundary entry points just inside the playable rectangle.
pub const BOUNDARY_MARGIN: f64 = 4.0;

/// A built airspace: waypoints, airports and carriers, ready to host a match.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    airspace: Airspace,
    airports: Vec<Airport>,
    carriers: Vec<CarrierConfig>,
    max_leg_length: Option<f64>,
}

impl Scenario {
    /// Load a scenario from a JSON file
    pub fn load<P: AsRef<Path>>(path: P, hangar_size: usize) -> Result<Self> {
        let path_ref = path.as_ref();
        let config = ScenarioConfig::load(
            path_ref
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Invalid path"))?,
        )?;

        Self::from_config(&config, hangar_size)
            .with_context(|| format!("Failed to build scenario from {}", path_ref.display()))
    }

    /// The built-in two-airport layout.
    pub fn classic(hangar_size: usize) -> SimResult<Self> {
        Self::from_config(&ScenarioConfig::default(), hangar_size)
    }

    pub fn from_config(config: &ScenarioConfig, hangar_size: usize) -> SimResult<Self> {
        config.validate()?;
        let (width, height) = (config.width, config.height);

        let airports: Vec<Airport> = config
            .airports
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let name = point
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Airport {}", index + 1));
                let location = Waypoint::relative(point.x, point.y, name.as_str(), width, height).location();
                Airport::new(AirportId(index), name, location, hangar_size)
            })
            .collect();

        let mut waypoints: Vec<Waypoint> = config
            .entry_points
            .iter()
            .map(|entry| Waypoint::new(entry.x, entry.y, true, entry.name.as_str()))
            .collect();
        waypoints.extend(airports.iter().map(|airport| airport.waypoint().clone()));
        waypoints.extend(config.waypoints.iter().enumerate().map(|(index, point)| {
            let name = point
                .name
                .clone()
                .unwrap_or_else(|| format!("WP{:02}", index + 1));
            Waypoint::relative(point.x, point.y, name, width, height)
        }));

        for (index, waypoint) in waypoints.iter().enumerate() {
            if waypoints[..index].iter().any(|w| w.name() == waypoint.name()) {
                return Err(SimError::InvalidScenario(format!(
                    "duplicate waypoint name '{}'",
                    waypoint.name()
                )));
            }
        }

        debug!(
            "[GAME] Built scenario {} with {} waypoints and {} airports",
            config.name,
            waypoints.len(),
            airports.len()
        );

        Ok(Self {
            name: config.name.clone(),
            airspace: Airspace::new(width, height, BOUNDARY_MARGIN, waypoints),
            airports,
            carriers: config.carriers.clone(),
            max_leg_length: config.max_leg_length,
        })
    }

    pub fn airspace(&self) -> &Airspace {
        &self.airspace
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn carriers(&self) -> &[CarrierConfig] {
        &self.carriers
    }

    pub fn max_leg_length(&self) -> Option<f64> {
        self.max_leg_length
    }

    /// Hands the airports over to a running match.
    pub fn into_parts(self) -> (Airspace, Vec<Airport>, Vec<CarrierConfig>, Option<f64>) {
        (self.airspace, self.airports, self.carriers, self.max_leg_length)
    }

    pub fn airport_by_name(&self, name: &str) -> Option<&Airport> {
        self.airports.iter().find(|a| a.name() == name)
    }

    /// Plans a route between two named entry/exit points.
    pub fn plan_route(&self, from: &str, to: &str) -> SimResult<FlightPlan> {
        let origin = self.boundary_waypoint(from)?;
        let destination = self.boundary_waypoint(to)?;
        Ok(FlightPlan::with_max_leg(
            self.airspace.waypoints(),
            origin,
            destination,
            self.max_leg_length,
        ))
    }

    fn boundary_waypoint(&self, name: &str) -> SimResult<&Waypoint> {
        self.airspace
            .entry_exit_points()
            .find(|w| w.name() == name)
            .ok_or_else(|| SimError::UnknownWaypoint(name.to_string()))
    }

    /// Get statistics about the scenario
    pub fn statistics(&self) -> ScenarioStats {
        ScenarioStats {
            name: self.name.clone(),
            width: self.airspace.width(),
            height: self.airspace.height(),
            entry_points: self.airspace.entry_exit_points().count() - self.airports.len(),
            airports: self.airports.len(),
            waypoints: self.airspace.interior_waypoints().count(),
            carriers: self.carriers.len(),
        }
    }
}

/// Statistics about a scenario
#[derive(Debug, Clone)]
pub struct ScenarioStats {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub entry_points: usize,
    pub airports: usize,
    pub waypoints: usize,
    pub carriers: usize,
}

impl fmt::Display for ScenarioStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.name)?;
        writeln!(f, "  Airspace: {:.0} x {:.0}", self.width, self.height)?;
        writeln!(f, "  Entry Points: {}", self.entry_points)?;
        writeln!(f, "  Airports: {}", self.airports)?;
        writeln!(f, "  Waypoints: {}", self.waypoints)?;
        writeln!(f, "  Carriers: {}", self.carriers)?;
        Ok(())
    }
}
