use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::waypoint::Waypoint;
use crate::aircraft::Aircraft;
use crate::utils::navigation::Rect;
use crate::utils::Vector;

pub const ARRIVALS_WIDTH: f64 = 104.0;
pub const ARRIVALS_HEIGHT: f64 = 56.0;
pub const DEPARTURES_WIDTH: f64 = 60.0;
pub const DEPARTURES_HEIGHT: f64 = 40.0;
/// Departures area centre relative to the airport location.
pub const DEPARTURES_OFFSET: (f64, f64) = (-100.0, -70.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AirportId(pub usize);

impl fmt::Display for AirportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "airport#{}", self.0)
    }
}

/// An airport is an entry/exit waypoint with an arrivals area, a departures area, a runway
/// "active" flag and a bounded hangar of flights waiting to take off.
#[derive(Debug, Clone)]
pub struct Airport {
    id: AirportId,
    waypoint: Waypoint,
    arrivals: Rect,
    departures: Rect,
    is_active: bool,
    hangar: VecDeque<Aircraft>,
    hangar_size: usize,
}

impl Airport {
    pub fn new(id: AirportId, name: impl Into<String>, location: Vector, hangar_size: usize) -> Self {
        let departures_centre = Vector::planar(
            location.x() + DEPARTURES_OFFSET.0,
            location.y() + DEPARTURES_OFFSET.1,
        );

        Self {
            id,
            waypoint: Waypoint::new(location.x(), location.y(), true, name),
            arrivals: Rect::centred_on(&location, ARRIVALS_WIDTH, ARRIVALS_HEIGHT),
            departures: Rect::centred_on(&departures_centre, DEPARTURES_WIDTH, DEPARTURES_HEIGHT),
            is_active: false,
            hangar: VecDeque::with_capacity(hangar_size),
            hangar_size,
        }
    }

    pub fn id(&self) -> AirportId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.waypoint.name()
    }

    pub fn waypoint(&self) -> &Waypoint {
        &self.waypoint
    }

    pub fn location(&self) -> Vector {
        self.waypoint.location()
    }

    pub fn arrivals(&self) -> &Rect {
        &self.arrivals
    }

    pub fn departures(&self) -> &Rect {
        &self.departures
    }

    pub fn departures_centre(&self) -> Vector {
        self.departures.centre()
    }

    pub fn is_within_arrivals(&self, position: &Vector) -> bool {
        self.arrivals.contains_point(position)
    }

    pub fn is_within_departures(&self, position: &Vector) -> bool {
        self.departures.contains_point(position)
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, active: bool) {
        if self.is_active != active {
            debug!("[AIRPORT] {} active: {}", self.name(), active);
        }
        self.is_active = active;
    }

    pub fn hangar_size(&self) -> usize {
        self.hangar_size
    }

    pub fn hangar(&self) -> &VecDeque<Aircraft> {
        &self.hangar
    }

    pub fn has_hangar_space(&self) -> bool {
        self.hangar.len() < self.hangar_size
    }

    /// Parks a flight waiting for take-off. Refused once the hangar is full.
    pub fn add_to_hangar(&mut self, aircraft: Aircraft) -> bool {
        if !self.has_hangar_space() {
            debug!("[AIRPORT] {} hangar full, refusing {}", self.name(), aircraft.name());
            return false;
        }
        info!("[AIRPORT] {} waiting for departure at {}", aircraft.name(), self.name());
        self.hangar.push_back(aircraft);
        true
    }

    pub fn take_next_departure(&mut self) -> Option<Aircraft> {
        self.hangar.pop_front()
    }

    /// Clears the runway once nothing is landing at, or leaving, this airport.
    pub fn update(&mut self, aircraft: &[Aircraft]) {
        if !self.is_active {
            return;
        }

        let runway_in_use = aircraft.iter().filter(|a| !a.is_finished()).any(|a| {
            (a.is_landing() && a.destination_airport() == Some(self.id))
                || (a.origin_airport() == Some(self.id)
                    && self.is_within_departures(&a.position()))
        });

        if !runway_in_use {
            self.set_active(false);
        }
    }

    pub fn clear(&mut self) {
        self.hangar.clear();
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{AircraftId, FlightRequest};
    use crate::config::{Difficulty, DifficultyProfile};

    fn parked_aircraft(id: u64, airport: &Airport) -> Aircraft {
        let waypoints = vec![
            Waypoint::new(400.0, 300.0, true, "East"),
            Waypoint::new(250.0, 250.0, false, "WP01"),
        ];
        let request = FlightRequest {
            name: format!("BA{:03}", id),
            carrier: "Britaniair".to_string(),
            origin: Waypoint::new(
                airport.departures_centre().x(),
                airport.departures_centre().y(),
                true,
                airport.name(),
            ),
            destination: waypoints[0].clone(),
            origin_airport: Some(airport.id()),
            destination_airport: None,
            speed: 35.0,
            altitude: 28000.0,
        };
        Aircraft::new(
            AircraftId(id),
            request,
            &waypoints,
            &DifficultyProfile::for_difficulty(Difficulty::Easy),
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_add_to_hangar_respects_capacity() {
        let mut airport = Airport::new(AirportId(0), "Test", Vector::planar(200.0, 200.0), 3);

        for i in 0..3 {
            let aircraft = parked_aircraft(i, &airport);
            assert!(airport.add_to_hangar(aircraft));
            assert_eq!(airport.hangar().len(), i as usize + 1);
        }

        let extra = parked_aircraft(9, &airport);
        assert!(!airport.add_to_hangar(extra));
        assert_eq!(airport.hangar().len(), 3);
    }

    #[test]
    fn test_take_next_departure_is_fifo() {
        let mut airport = Airport::new(AirportId(0), "Test", Vector::planar(200.0, 200.0), 3);
        assert!(airport.take_next_departure().is_none());

        airport.add_to_hangar(parked_aircraft(1, &airport));
        airport.add_to_hangar(parked_aircraft(2, &airport));

        assert_eq!(airport.take_next_departure().unwrap().id(), AircraftId(1));
        assert_eq!(airport.take_next_departure().unwrap().id(), AircraftId(2));
        assert!(airport.hangar().is_empty());
    }

    #[test]
    fn test_arrivals_area() {
        let airport = Airport::new(AirportId(0), "Test", Vector::planar(200.0, 200.0), 3);
        assert!(airport.is_within_arrivals(&Vector::new(200.0, 200.0, 5000.0)));
        assert!(airport.is_within_arrivals(&Vector::planar(200.0 + ARRIVALS_WIDTH / 2.0, 200.0)));
        assert!(!airport.is_within_arrivals(&Vector::planar(200.0 + ARRIVALS_WIDTH, 200.0)));
    }

    #[test]
    fn test_clear_empties_hangar() {
        let mut airport = Airport::new(AirportId(0), "Test", Vector::planar(200.0, 200.0), 3);
        airport.add_to_hangar(parked_aircraft(1, &airport));
        airport.set_active(true);
        airport.clear();
        assert!(airport.hangar().is_empty());
        assert!(!airport.is_active());
    }

    #[test]
    fn test_runway_released_after_departure() {
        let mut airport = Airport::new(AirportId(0), "Test", Vector::planar(200.0, 200.0), 3);
        let mut departing = vec![parked_aircraft(1, &airport)];
        airport.set_active(true);

        airport.update(&departing);
        assert!(airport.is_active());

        departing[0].finish();
        airport.update(&departing);
        assert!(!airport.is_active());
    }
}
