use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game::{Game, GameStats};
use crate::aircraft::{Aircraft, AircraftId, AltitudeState, FlightPlan};
use crate::airspace::{Airport, AirportId};
use crate::config::Difficulty;
use crate::utils::Vector;

/// Full observable state of one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftSnapshot {
    pub id: AircraftId,
    pub name: String,
    pub carrier: String,
    pub difficulty: Difficulty,
    pub origin_airport: Option<AirportId>,
    pub destination_airport: Option<AirportId>,
    pub position: Vector,
    pub velocity: Vector,
    pub bearing: f64,
    pub speed: f64,
    pub flight_plan: FlightPlan,
    pub current_route_stage: usize,
    pub current_target: Vector,
    pub is_manually_controlled: bool,
    pub manual_bearing_target: Option<f64>,
    pub altitude_state: AltitudeState,
    pub is_landing: bool,
    pub is_waiting_to_land: bool,
    pub has_finished: bool,
    pub is_crashed: bool,
    pub too_near: Vec<AircraftId>,
    pub base_score: u32,
    pub addition_to_multiplier: u32,
    pub score: u32,
    pub optimal_time: f64,
    pub creation_time: f64,
    pub departure_time: Option<f64>,
}

impl From<&Aircraft> for AircraftSnapshot {
    fn from(aircraft: &Aircraft) -> Self {
        Self {
            id: aircraft.id(),
            name: aircraft.name().to_string(),
            carrier: aircraft.carrier().to_string(),
            difficulty: aircraft.profile().difficulty,
            origin_airport: aircraft.origin_airport(),
            destination_airport: aircraft.destination_airport(),
            position: aircraft.position(),
            velocity: aircraft.velocity(),
            bearing: aircraft.bearing(),
            speed: aircraft.speed(),
            flight_plan: aircraft.flight_plan().clone(),
            current_route_stage: aircraft.current_route_stage(),
            current_target: aircraft.current_target(),
            is_manually_controlled: aircraft.is_manually_controlled(),
            manual_bearing_target: aircraft.manual_bearing_target(),
            altitude_state: aircraft.altitude_state(),
            is_landing: aircraft.is_landing(),
            is_waiting_to_land: aircraft.is_waiting_to_land(),
            has_finished: aircraft.is_finished(),
            is_crashed: aircraft.is_crashed(),
            too_near: aircraft.too_near().to_vec(),
            base_score: aircraft.base_score(),
            addition_to_multiplier: aircraft.addition_to_multiplier(),
            score: aircraft.score(),
            optimal_time: aircraft.optimal_time(),
            creation_time: aircraft.creation_time(),
            departure_time: aircraft.departure_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportSnapshot {
    pub id: AirportId,
    pub name: String,
    pub location: Vector,
    pub is_active: bool,
    pub hangar: Vec<String>,
}

impl From<&Airport> for AirportSnapshot {
    fn from(airport: &Airport) -> Self {
        Self {
            id: airport.id(),
            name: airport.name().to_string(),
            location: airport.location(),
            is_active: airport.is_active(),
            hangar: airport.hangar().iter().map(|a| a.name().to_string()).collect(),
        }
    }
}

/// Serializable view of a match, one JSON line per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub scenario: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: f64,
    pub score: i64,
    pub multiplier_level: u32,
    pub lives: u32,
    pub game_over: bool,
    pub stats: GameStats,
    pub aircraft: Vec<AircraftSnapshot>,
    pub airports: Vec<AirportSnapshot>,
}

impl GameSnapshot {
    pub fn capture(game: &Game, started_at: DateTime<Utc>) -> Self {
        Self {
            scenario: game.scenario_name().to_string(),
            started_at,
            elapsed: game.elapsed(),
            score: game.score(),
            multiplier_level: game.meter().level(),
            lives: game.lives(),
            game_over: game.is_game_over(),
            stats: game.stats().clone(),
            aircraft: game.aircraft().iter().map(AircraftSnapshot::from).collect(),
            airports: game.airports().iter().map(AirportSnapshot::from).collect(),
        }
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
