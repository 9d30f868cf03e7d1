use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::aircraft::aircraft::{ALTITUDE_CEILING, ALTITUDE_FLOOR};
use crate::aircraft::{Aircraft, AircraftId, FlightPlan, FlightRequest};
use crate::airspace::{Airport, AirportId, Airspace, Waypoint};
use crate::config::{CarrierConfig, DifficultyProfile, SimulationConfig};
use crate::error::{SimError, SimResult};

/// Flight numbers are three digits.
const FLIGHT_NUMBERS: u32 = 1000;
const NAME_ATTEMPTS: usize = 64;

/// Everything the spawner reads from the running match.
pub struct SpawnContext<'a> {
    pub airspace: &'a Airspace,
    pub airports: &'a [Airport],
    pub aircraft: &'a [Aircraft],
    pub carriers: &'a [CarrierConfig],
    pub profile: &'a DifficultyProfile,
    pub config: &'a SimulationConfig,
    pub max_leg_length: Option<f64>,
    pub now: f64,
}

/// A generated flight and, for airport departures, the hangar it waits in.
#[derive(Debug)]
pub struct SpawnedFlight {
    pub aircraft: Aircraft,
    pub hangar: Option<AirportId>,
}

/// Seeded flight generator.
#[derive(Debug)]
pub struct Spawner {
    rng: StdRng,
    next_id: u64,
    since_last_flight: f64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
            since_last_flight: 0.0,
        }
    }

    pub fn next_id(&mut self) -> AircraftId {
        let id = AircraftId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Accumulates match time. True once `interval` has elapsed since the last flight.
    pub fn advance(&mut self, dt: f64, interval: f64) -> bool {
        self.since_last_flight += dt;
        if self.since_last_flight >= interval {
            self.since_last_flight -= interval;
            true
        } else {
            false
        }
    }

    /// Generates one flight, or nothing when no fair origin exists.
    pub fn generate(&mut self, ctx: &SpawnContext<'_>) -> SimResult<Option<SpawnedFlight>> {
        let available = available_entry_points(ctx.airspace, ctx.airports, ctx.aircraft);

        let (origin, origin_airport) = match available.choose(&mut self.rng) {
            Some(entry) => ((*entry).clone(), None),
            None => {
                let Some(airport) = ctx.airports.choose(&mut self.rng) else {
                    return Ok(None);
                };
                if !airport.has_hangar_space() {
                    debug!("[SPAWNER] No free entry point and {} hangar is full", airport.name());
                    return Ok(None);
                }
                let centre = airport.departures_centre();
                let origin = Waypoint::new(centre.x(), centre.y(), true, airport.name());
                (origin, Some(airport.id()))
            }
        };

        let is_airport = |name: &str| ctx.airports.iter().any(|a| a.name() == name);
        let destinations: Vec<&Waypoint> = ctx
            .airspace
            .entry_exit_points()
            .filter(|w| w.name() != origin.name())
            .filter(|w| !(origin_airport.is_some() && is_airport(w.name())))
            .collect();
        let Some(destination) = destinations.choose(&mut self.rng).map(|w| (*w).clone()) else {
            return Ok(None);
        };
        let destination_airport = ctx
            .airports
            .iter()
            .find(|a| a.name() == destination.name())
            .map(|a| a.id());

        let Some(carrier) = ctx.carriers.choose(&mut self.rng) else {
            return Err(SimError::InvalidScenario("no carriers configured".to_string()));
        };
        let Some(name) = self.flight_name(&carrier.tag, ctx) else {
            debug!("[SPAWNER] No free flight number for {}", carrier.tag);
            return Ok(None);
        };

        let speed = f64::from(self.rng.gen_range(ctx.config.min_speed..=ctx.config.max_speed));
        let altitude = if self.rng.gen_bool(0.5) {
            ALTITUDE_FLOOR
        } else {
            ALTITUDE_CEILING
        };

        let flight_plan = FlightPlan::with_max_leg(
            ctx.airspace.waypoints(),
            &origin,
            &destination,
            ctx.max_leg_length,
        );
        let request = FlightRequest {
            name,
            carrier: carrier.name.clone(),
            origin,
            destination,
            origin_airport,
            destination_airport,
            speed,
            altitude,
        };

        let id = self.next_id();
        let aircraft = Aircraft::with_flight_plan(id, request, flight_plan, ctx.profile, ctx.now)?;

        info!(
            "[SPAWNER] Generated {} {} -> {} at {:.0} ft",
            aircraft.name(),
            aircraft.flight_plan().origin_name(),
            aircraft.flight_plan().destination_name(),
            altitude
        );

        Ok(Some(SpawnedFlight {
            aircraft,
            hangar: origin_airport,
        }))
    }

    fn flight_name(&mut self, tag: &str, ctx: &SpawnContext<'_>) -> Option<String> {
        let taken = |name: &str| {
            ctx.aircraft.iter().any(|a| a.name() == name)
                || ctx
                    .airports
                    .iter()
                    .flat_map(|airport| airport.hangar().iter())
                    .any(|a| a.name() == name)
        };

        (0..NAME_ATTEMPTS)
            .map(|_| format!("{}{:03}", tag, self.rng.gen_range(0..FLIGHT_NUMBERS)))
            .find(|name| !taken(name))
    }
}

/// Boundary entry points (airports excluded) where a new flight would not be in immediate
/// conflict: nobody is heading there to exit and nobody is within the entry clearance.
pub fn available_entry_points<'a>(
    airspace: &'a Airspace,
    airports: &[Airport],
    aircraft: &[Aircraft],
) -> Vec<&'a Waypoint> {
    airspace
        .entry_exit_points()
        .filter(|entry| !airports.iter().any(|a| a.name() == entry.name()))
        .filter(|entry| {
            let location = entry.location();
            !aircraft.iter().filter(|a| !a.is_finished()).any(|a| {
                a.current_target() == location || a.is_close_to_entry(&location)
            })
        })
        .collect()
}
