use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ai_controller::AiController;
use super::spawner::{available_entry_points, SpawnContext, Spawner};
use crate::aircraft::aircraft::TOUCHDOWN_ALTITUDE;
use crate::aircraft::{run_separation_pass, Aircraft, AircraftId, AltitudeState, FlightPlan, FlightRequest};
use crate::airspace::{Airport, AirportId, Airspace, Waypoint};
use crate::config::{CarrierConfig, Difficulty, DifficultyProfile, SimulationConfig};
use crate::error::{SimError, SimResult};
use crate::scenario::Scenario;
use crate::scoring::{flight_score, ScoreMeter};

/// Controller input addressed to one aircraft or airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    TurnLeft { aircraft: AircraftId, dt: f64 },
    TurnRight { aircraft: AircraftId, dt: f64 },
    SetBearing { aircraft: AircraftId, bearing: f64 },
    ToggleManualControl { aircraft: AircraftId },
    SetAltitudeState { aircraft: AircraftId, state: AltitudeState },
    AlterPath { aircraft: AircraftId, stage: usize, waypoint: String },
    Land { aircraft: AircraftId },
    TakeOff { airport: AirportId },
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub crash: Option<(AircraftId, AircraftId)>,
    pub warnings: Vec<String>,
    pub removed: Vec<String>,
    pub spawned: Vec<String>,
    pub game_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub spawned: u32,
    pub landed: u32,
    pub cleared: u32,
    pub crashed: u32,
    pub lost: u32,
}

/// One match: the airspace, its airports and every live aircraft, advanced tick by tick.
pub struct Game {
    scenario_name: String,
    airspace: Airspace,
    airports: Vec<Airport>,
    carriers: Vec<CarrierConfig>,
    max_leg_length: Option<f64>,

    aircraft: Vec<Aircraft>,

    difficulty: Difficulty,
    profile: DifficultyProfile,
    config: SimulationConfig,
    spawner: Spawner,
    controller: AiController,

    meter: ScoreMeter,
    lives: u32,
    elapsed: f64,
    stats: GameStats,
    game_over: bool,
}

impl Game {
    pub fn new(
        scenario: Scenario,
        difficulty: Difficulty,
        config: SimulationConfig,
        seed: u64,
    ) -> SimResult<Self> {
        config.validate()?;
        let scenario_name = scenario.name.clone();
        let (airspace, airports, carriers, max_leg_length) = scenario.into_parts();

        info!(
            "[GAME] New {} match on {} (seed {})",
            difficulty, scenario_name, seed
        );

        Ok(Self {
            scenario_name,
            airspace,
            airports,
            carriers,
            max_leg_length,
            aircraft: Vec::new(),
            difficulty,
            profile: DifficultyProfile::for_difficulty(difficulty),
            lives: config.lives,
            config,
            spawner: Spawner::new(seed),
            controller: AiController::default(),
            meter: ScoreMeter::new(),
            elapsed: 0.0,
            stats: GameStats::default(),
            game_over: false,
        })
    }

    /// Advances the whole match by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let mut report = TickReport {
            game_over: self.game_over,
            ..TickReport::default()
        };
        if self.game_over {
            return report;
        }
        if !dt.is_finite() || dt < 0.0 {
            warn!("[GAME] Ignoring tick with dt {}", dt);
            return report;
        }

        self.elapsed += dt;

        for plane in self.aircraft.iter_mut() {
            plane.update(dt, &mut self.airports);
        }
        for airport in self.airports.iter_mut() {
            airport.update(&self.aircraft);
        }

        for plane in self.aircraft.iter_mut() {
            if !plane.is_finished() && plane.is_out_of_airspace_bounds(&self.airspace) {
                info!("[GAME] {} left the airspace bounds", plane.name());
                plane.finish();
            }
        }

        if let Some(pair) = run_separation_pass(&mut self.aircraft, &mut self.meter) {
            self.meter.apply_crash_penalty(self.config.crash_penalty);
            self.lives = self.lives.saturating_sub(1);
            report.crash = Some(pair);
            warn!("[GAME] Crash, {} lives left", self.lives);
        }

        for plane in self.aircraft.iter_mut() {
            if plane.take_warning_cue() {
                report.warnings.push(plane.name().to_string());
            }
        }

        self.remove_finished(&mut report);

        if self.lives == 0 {
            self.game_over = true;
            report.game_over = true;
            info!(
                "[GAME] Game over after {:.1}s with score {}",
                self.elapsed,
                self.meter.total()
            );
            return report;
        }

        let interval = self.config.generation_interval(self.difficulty);
        if self.spawner.advance(dt, interval) && self.aircraft.len() < self.config.max_aircraft {
            self.generate_flight(&mut report);
        }

        if self.config.auto_pilot {
            let commands = self.controller.plan(&self.aircraft, &self.airports);
            for command in commands {
                if let Err(e) = self.apply(command) {
                    warn!("[GAME] Autopilot command failed: {}", e);
                }
            }
        }

        report
    }

    fn remove_finished(&mut self, report: &mut TickReport) {
        let mut kept = Vec::with_capacity(self.aircraft.len());

        for mut plane in std::mem::take(&mut self.aircraft) {
            if !plane.is_finished() {
                kept.push(plane);
                continue;
            }

            let arrived = if plane.is_landing() {
                plane.altitude() <= TOUCHDOWN_ALTITUDE
            } else {
                plane.is_at_destination(&self.airports)
            };

            if plane.is_crashed() {
                self.stats.crashed += 1;
            } else if arrived {
                let elapsed = self.elapsed - plane.creation_time();
                let score = flight_score(plane.base_score(), plane.optimal_time(), elapsed);
                plane.set_score(score);
                plane.set_departure_time(self.elapsed);
                plane.set_addition_to_multiplier(self.meter.level());
                let awarded = self.meter.award_flight(score, plane.addition_to_multiplier());

                if plane.destination_airport().is_some() {
                    self.stats.landed += 1;
                } else {
                    self.stats.cleared += 1;
                }
                info!("[GAME] {} completed for {} points", plane.name(), awarded);
            } else {
                self.stats.lost += 1;
            }

            report.removed.push(plane.name().to_string());
        }

        self.aircraft = kept;
    }

    fn generate_flight(&mut self, report: &mut TickReport) {
        let ctx = SpawnContext {
            airspace: &self.airspace,
            airports: &self.airports,
            aircraft: &self.aircraft,
            carriers: &self.carriers,
            profile: &self.profile,
            config: &self.config,
            max_leg_length: self.max_leg_length,
            now: self.elapsed,
        };

        let flight = match self.spawner.generate(&ctx) {
            Ok(Some(flight)) => flight,
            Ok(None) => return,
            Err(e) => {
                warn!("[GAME] Flight generation failed: {}", e);
                return;
            }
        };

        self.stats.spawned += 1;
        report.spawned.push(flight.aircraft.name().to_string());

        match flight.hangar {
            Some(id) => {
                if let Some(airport) = self.airports.iter_mut().find(|a| a.id() == id) {
                    airport.add_to_hangar(flight.aircraft);
                }
            }
            None => self.aircraft.push(flight.aircraft),
        }
    }

    /// Adds a flight directly to the airspace, planned with this match's leg limit.
    pub fn add_aircraft(&mut self, request: FlightRequest) -> SimResult<AircraftId> {
        let flight_plan = FlightPlan::with_max_leg(
            self.airspace.waypoints(),
            &request.origin,
            &request.destination,
            self.max_leg_length,
        );
        let id = self.spawner.next_id();
        let aircraft =
            Aircraft::with_flight_plan(id, request, flight_plan, &self.profile, self.elapsed)?;
        self.aircraft.push(aircraft);
        self.stats.spawned += 1;
        Ok(id)
    }

    /// Applies a controller command. Returns whether the aircraft accepted it.
    pub fn apply(&mut self, command: Command) -> SimResult<bool> {
        debug!("[GAME] Applying {:?}", command);

        match command {
            Command::TurnLeft { aircraft, dt } => {
                self.aircraft_mut(aircraft)?.turn_left(dt);
                Ok(true)
            }
            Command::TurnRight { aircraft, dt } => {
                self.aircraft_mut(aircraft)?.turn_right(dt);
                Ok(true)
            }
            Command::SetBearing { aircraft, bearing } => {
                self.aircraft_mut(aircraft)?.set_bearing(bearing);
                Ok(true)
            }
            Command::ToggleManualControl { aircraft } => {
                let plane = self.aircraft_mut(aircraft)?;
                plane.toggle_manual_control();
                Ok(plane.is_manually_controlled())
            }
            Command::SetAltitudeState { aircraft, state } => {
                self.aircraft_mut(aircraft)?.set_altitude_state(state);
                Ok(true)
            }
            Command::AlterPath {
                aircraft,
                stage,
                waypoint,
            } => {
                let waypoint = self
                    .airspace
                    .find_waypoint(&waypoint)
                    .cloned()
                    .ok_or(SimError::UnknownWaypoint(waypoint))?;
                Ok(self.aircraft_mut(aircraft)?.alter_path(stage, waypoint))
            }
            Command::Land { aircraft } => {
                let plane = self
                    .aircraft
                    .iter_mut()
                    .find(|a| a.id() == aircraft)
                    .ok_or(SimError::UnknownAircraft(aircraft))?;

                if !plane.is_waiting_to_land() || !plane.is_targeting_destination() {
                    warn!("[GAME] {} is not ready to land", plane.name());
                    return Ok(false);
                }
                plane.land(&mut self.airports);
                Ok(true)
            }
            Command::TakeOff { airport } => {
                let departure = self
                    .airports
                    .iter_mut()
                    .find(|a| a.id() == airport)
                    .ok_or_else(|| SimError::UnknownAirport(airport.to_string()))?
                    .take_next_departure();

                let Some(mut plane) = departure else {
                    debug!("[GAME] Nothing waiting to depart {}", airport);
                    return Ok(false);
                };
                plane.take_off(&mut self.airports, self.elapsed);
                self.aircraft.push(plane);
                Ok(true)
            }
        }
    }

    fn aircraft_mut(&mut self, id: AircraftId) -> SimResult<&mut Aircraft> {
        self.aircraft
            .iter_mut()
            .find(|a| a.id() == id)
            .ok_or(SimError::UnknownAircraft(id))
    }

    pub fn find_aircraft(&self, name: &str) -> Option<&Aircraft> {
        self.aircraft.iter().find(|a| a.name() == name)
    }

    pub fn available_entry_points(&self) -> Vec<&Waypoint> {
        available_entry_points(&self.airspace, &self.airports, &self.aircraft)
    }

    pub fn aircraft(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn airspace(&self) -> &Airspace {
        &self.airspace
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn meter(&self) -> &ScoreMeter {
        &self.meter
    }

    pub fn score(&self) -> i64 {
        self.meter.total()
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}
