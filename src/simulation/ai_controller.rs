use std::collections::HashSet;

use tracing::debug;

use super::game::Command;
use crate::aircraft::Aircraft;
use crate::airspace::{Airport, AirportId};

/// Automatic tower for headless runs: clears arrivals to land and releases departures.
#[derive(Debug, Clone)]
pub struct AiController {
    name: String,
}

impl Default for AiController {
    fn default() -> Self {
        Self::new("AI Tower")
    }
}

impl AiController {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands for this tick. One runway movement per airport at a time.
    pub fn plan(&self, aircraft: &[Aircraft], airports: &[Airport]) -> Vec<Command> {
        let mut commands = Vec::new();
        let mut busy: HashSet<AirportId> = airports
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.id())
            .collect();

        for plane in aircraft.iter().filter(|a| !a.is_finished()) {
            if !plane.is_waiting_to_land() || !plane.is_targeting_destination() {
                continue;
            }
            let Some(airport) = plane
                .destination_airport()
                .and_then(|id| airports.iter().find(|a| a.id() == id))
            else {
                continue;
            };

            if !busy.contains(&airport.id()) && airport.is_within_arrivals(&plane.position()) {
                debug!("[AI CONTROLLER] {} clearing {} to land", self.name, plane.name());
                busy.insert(airport.id());
                commands.push(Command::Land {
                    aircraft: plane.id(),
                });
            }
        }

        for airport in airports {
            if busy.contains(&airport.id()) || airport.hangar().is_empty() {
                continue;
            }
            debug!("[AI CONTROLLER] {} releasing departure from {}", self.name, airport.name());
            busy.insert(airport.id());
            commands.push(Command::TakeOff {
                airport: airport.id(),
            });
        }

        commands
    }
}
