use std::f64::consts::FRAC_PI_2;

use tracing::{debug, info, warn};

use super::altitude::AltitudeState;
use super::flight_plan::FlightPlan;
use super::separation::{Contact, SeparationMonitor};
use super::AircraftId;
use crate::airspace::{Airport, AirportId, Airspace, Waypoint};
use crate::config::DifficultyProfile;
use crate::error::{SimError, SimResult};
use crate::scoring::ScoreMeter;
use crate::utils::navigation::{angle_difference, bearing_from_to, shortest_turn_direction};
use crate::utils::Vector;

pub const ALTITUDE_FLOOR: f64 = 28000.0;
pub const ALTITUDE_CEILING: f64 = 30000.0;
/// Feet per second, roughly 11 seconds from the top of the band.
pub const LANDING_DESCENT_RATE: f64 = 2501.0;
pub const TOUCHDOWN_ALTITUDE: f64 = 100.0;
/// Squared planar distance under which a point counts as reached.
pub const ARRIVAL_TOLERANCE_SQ: f64 = 6.0;
pub const BEARING_TOLERANCE: f64 = 0.01;
/// Turn step multiplier when the desired bearing is more than 90 degrees off.
pub const WIDE_TURN_BOOST: f64 = 1.75;
pub const ENTRY_CLEARANCE: f64 = 300.0;

/// Everything the spawner decides about a new flight.
#[derive(Debug, Clone)]
pub struct FlightRequest {
    pub name: String,
    pub carrier: String,
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub origin_airport: Option<AirportId>,
    pub destination_airport: Option<AirportId>,
    pub speed: f64,
    pub altitude: f64,
}

/// Aircraft state
#[derive(Debug, Clone)]
pub struct Aircraft {
    id: AircraftId,
    name: String,
    carrier: String,
    origin_airport: Option<AirportId>,
    destination_airport: Option<AirportId>,
    profile: DifficultyProfile,

    // Kinematics
    position: Vector,
    velocity: Vector,

    // Navigation
    flight_plan: FlightPlan,
    current_route_stage: usize,
    current_target: Vector,

    // Manual control
    is_manually_controlled: bool,
    has_bearing_override: bool,
    manual_bearing_target: f64,
    turning_by: f64,

    // Altitude and lifecycle
    altitude_state: AltitudeState,
    is_landing: bool,
    is_waiting_to_land: bool,
    has_finished: bool,
    is_crashed: bool,

    // Scoring
    base_score: u32,
    addition_to_multiplier: u32,
    score: u32,
    optimal_time: f64,
    creation_time: f64,
    departure_time: Option<f64>,

    separation: SeparationMonitor,
}

impl Aircraft {
    /// Creates an aircraft, planning its route over `waypoints` with no leg limit.
    pub fn new(
        id: AircraftId,
        request: FlightRequest,
        waypoints: &[Waypoint],
        profile: &DifficultyProfile,
        now: f64,
    ) -> SimResult<Self> {
        let flight_plan = FlightPlan::new(waypoints, &request.origin, &request.destination);
        Self::with_flight_plan(id, request, flight_plan, profile, now)
    }

    pub fn with_flight_plan(
        id: AircraftId,
        request: FlightRequest,
        flight_plan: FlightPlan,
        profile: &DifficultyProfile,
        now: f64,
    ) -> SimResult<Self> {
        if !(request.speed.is_finite() && request.speed > 0.0) {
            return Err(SimError::invalid_parameter(
                "speed",
                format!("{} is not a positive speed", request.speed),
            ));
        }
        if !(ALTITUDE_FLOOR..=ALTITUDE_CEILING).contains(&request.altitude) {
            return Err(SimError::invalid_parameter(
                "altitude",
                format!(
                    "{} is outside the {}-{} ft band",
                    request.altitude, ALTITUDE_FLOOR, ALTITUDE_CEILING
                ),
            ));
        }

        let origin = request.origin.location();
        let current_target = target_for_stage(&flight_plan, 0);
        let direction = initial_direction(&request.name, origin, current_target, flight_plan.destination());

        let effective_speed = request.speed * profile.speed_multiplier;
        let optimal_time = flight_plan.total_distance() / effective_speed;

        info!(
            "[AIRCRAFT] {} ({}) spawned at {} for {} via {} waypoints",
            request.name,
            request.carrier,
            flight_plan.origin_name(),
            flight_plan.destination_name(),
            flight_plan.route().len()
        );

        Ok(Self {
            id,
            name: request.name,
            carrier: request.carrier,
            origin_airport: request.origin_airport,
            destination_airport: request.destination_airport,
            profile: *profile,
            position: origin.with_z(request.altitude),
            velocity: direction.scale_by(effective_speed),
            flight_plan,
            current_route_stage: 0,
            current_target,
            is_manually_controlled: false,
            has_bearing_override: false,
            manual_bearing_target: 0.0,
            turning_by: 0.0,
            altitude_state: AltitudeState::Level,
            is_landing: false,
            is_waiting_to_land: request.destination_airport.is_some(),
            has_finished: false,
            is_crashed: false,
            base_score: profile.base_score,
            addition_to_multiplier: profile.addition_to_multiplier,
            score: 0,
            optimal_time,
            creation_time: now,
            departure_time: None,
            separation: SeparationMonitor::new(),
        })
    }

    /// Advances the aircraft by `dt` seconds.
    pub fn update(&mut self, dt: f64, airports: &mut [Airport]) {
        if self.has_finished {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            warn!("[AIRCRAFT] {} ignoring update with dt {}", self.name, dt);
            return;
        }

        self.turning_by = 0.0;

        let climb_rate = if self.is_landing {
            -LANDING_DESCENT_RATE
        } else {
            self.altitude_state.vertical_sign() * self.profile.vertical_velocity
        };
        self.velocity.set_z(climb_rate);

        self.position += self.velocity * dt;

        if self.is_landing {
            if self.position.z() <= TOUCHDOWN_ALTITUDE {
                self.position.set_z(self.position.z().max(0.0));
                self.has_finished = true;
                self.release_destination_airport(airports);
                info!("[AIRCRAFT] {} landed at {}", self.name, self.flight_plan.destination_name());
                return;
            }
        } else {
            self.settle_altitude();
        }

        self.advance_route(airports);
        if self.has_finished {
            return;
        }

        let desired = self.desired_bearing();
        if angle_difference(desired, self.bearing()).abs() > BEARING_TOLERANCE {
            self.turn_towards_target(desired, dt);
        }
    }

    fn settle_altitude(&mut self) {
        let z = self.position.z();
        match self.altitude_state {
            AltitudeState::Climbing if z >= ALTITUDE_CEILING => {
                self.altitude_state = AltitudeState::Level;
                self.velocity.set_z(0.0);
                debug!("[AIRCRAFT] {} levelled at {}", self.name, ALTITUDE_CEILING);
            }
            AltitudeState::Falling if z <= ALTITUDE_FLOOR => {
                self.altitude_state = AltitudeState::Level;
                self.velocity.set_z(0.0);
                debug!("[AIRCRAFT] {} levelled at {}", self.name, ALTITUDE_FLOOR);
            }
            _ => {}
        }
        self.position.set_z(z.clamp(ALTITUDE_FLOOR, ALTITUDE_CEILING));
    }

    fn advance_route(&mut self, airports: &mut [Airport]) {
        if self.is_targeting_destination() {
            // Landing aircraft finish on touchdown instead
            if !self.is_waiting_to_land && !self.is_landing && self.is_at_destination(airports) {
                self.has_finished = true;
                self.release_destination_airport(airports);
                info!(
                    "[AIRCRAFT] {} left the airspace at {}",
                    self.name,
                    self.flight_plan.destination_name()
                );
            }
        } else if self.is_at(&self.current_target) {
            self.current_route_stage += 1;
            self.current_target = target_for_stage(&self.flight_plan, self.current_route_stage);
            debug!(
                "[AIRCRAFT] {} advancing to stage {} at {}",
                self.name, self.current_route_stage, self.current_target
            );
        }
    }

    fn desired_bearing(&self) -> f64 {
        if self.is_manually_controlled {
            if self.has_bearing_override {
                self.manual_bearing_target
            } else {
                self.bearing()
            }
        } else {
            bearing_from_to(&self.position, &self.current_target)
        }
    }

    /// Bounded-rate turn towards `desired`. Never rotates past it.
    fn turn_towards_target(&mut self, desired: f64, dt: f64) {
        let difference = angle_difference(desired, self.bearing());
        if difference == 0.0 {
            return;
        }

        let mut step = self.profile.turn_rate * dt;
        if difference.abs() > FRAC_PI_2 {
            step *= WIDE_TURN_BOOST;
        }
        let magnitude = step.min(difference.abs());
        let direction = shortest_turn_direction(self.bearing(), desired);
        self.turn_by(magnitude * direction.sign());
    }

    /// Positive angles turn clockwise on screen.
    fn turn_by(&mut self, angle: f64) {
        self.turning_by = angle;
        self.velocity = self.velocity.rotate_xy(angle);
    }

    pub fn turn_left(&mut self, dt: f64) {
        if !self.is_manually_controlled {
            debug!("[AIRCRAFT] {} ignoring turn left, not under manual control", self.name);
            return;
        }
        self.turn_by(-self.profile.turn_rate * dt);
        self.has_bearing_override = false;
    }

    pub fn turn_right(&mut self, dt: f64) {
        if !self.is_manually_controlled {
            debug!("[AIRCRAFT] {} ignoring turn right, not under manual control", self.name);
            return;
        }
        self.turn_by(self.profile.turn_rate * dt);
        self.has_bearing_override = false;
    }

    /// Sets the manual heading override, consumed by the next update.
    pub fn set_bearing(&mut self, angle: f64) {
        if !angle.is_finite() {
            warn!("[AIRCRAFT] {} rejecting bearing {}", self.name, angle);
            return;
        }
        self.manual_bearing_target = angle;
        self.has_bearing_override = true;
    }

    pub fn toggle_manual_control(&mut self) {
        if self.is_landing {
            self.is_manually_controlled = false;
            return;
        }

        self.is_manually_controlled = !self.is_manually_controlled;
        if self.is_manually_controlled {
            self.set_bearing(self.bearing());
        } else {
            self.has_bearing_override = false;
            if self.current_route_stage < self.flight_plan.route().len() {
                self.current_target = target_for_stage(&self.flight_plan, self.current_route_stage);
            }
        }
        debug!(
            "[AIRCRAFT] {} manual control: {}",
            self.name, self.is_manually_controlled
        );
    }

    pub fn set_altitude_state(&mut self, state: AltitudeState) {
        self.altitude_state = state;
    }

    /// Reroutes one stage. Rejected for boundary waypoints and out-of-range stages.
    pub fn alter_path(&mut self, stage: usize, waypoint: Waypoint) -> bool {
        let name = waypoint.name().to_string();
        if !self.flight_plan.alter_path(stage, waypoint) {
            warn!("[AIRCRAFT] {} rejected reroute of stage {} via {}", self.name, stage, name);
            return false;
        }
        if stage == self.current_route_stage {
            self.current_target = target_for_stage(&self.flight_plan, stage);
        }
        info!("[AIRCRAFT] {} rerouted stage {} via {}", self.name, stage, name);
        true
    }

    pub fn land(&mut self, airports: &mut [Airport]) {
        self.is_waiting_to_land = false;
        self.is_landing = true;
        self.is_manually_controlled = false;
        self.has_bearing_override = false;
        set_airport_active(airports, self.destination_airport, true);
        info!("[AIRCRAFT] {} cleared to land", self.name);
    }

    pub fn take_off(&mut self, airports: &mut [Airport], now: f64) {
        set_airport_active(airports, self.origin_airport, true);
        self.creation_time = now;
        info!("[AIRCRAFT] {} taking off from {}", self.name, self.flight_plan.origin_name());
    }

    fn release_destination_airport(&self, airports: &mut [Airport]) {
        set_airport_active(airports, self.destination_airport, false);
    }

    /// Runs this aircraft's separation check. Returns the aircraft it crashed into, if any.
    pub fn update_collisions(
        &mut self,
        contacts: &[Contact],
        meter: &mut ScoreMeter,
    ) -> Option<AircraftId> {
        if self.has_finished {
            return None;
        }

        let own = Contact::of(self);
        let crashed_with =
            self.separation
                .check(&own, self.profile.minimum_separation, contacts, meter);
        if crashed_with.is_some() {
            self.mark_crashed();
        }
        crashed_with
    }

    pub fn mark_crashed(&mut self) {
        self.has_finished = true;
        self.is_crashed = true;
    }

    /// Forces the aircraft out of play, e.g. after leaving the airspace.
    pub fn finish(&mut self) {
        self.has_finished = true;
    }

    pub fn is_at(&self, point: &Vector) -> bool {
        self.position.distance_squared_xy(point) < ARRIVAL_TOLERANCE_SQ
    }

    /// Inside the destination airport's arrivals area, or at the destination point.
    pub fn is_at_destination(&self, airports: &[Airport]) -> bool {
        let airport = self
            .destination_airport
            .and_then(|id| airports.iter().find(|a| a.id() == id));
        match airport {
            Some(airport) => airport.is_within_arrivals(&self.position),
            None => self.is_at(&self.flight_plan.destination()),
        }
    }

    pub fn is_close_to_entry(&self, point: &Vector) -> bool {
        self.position.distance_squared_xy(point) <= ENTRY_CLEARANCE * ENTRY_CLEARANCE
    }

    pub fn is_out_of_airspace_bounds(&self, airspace: &Airspace) -> bool {
        airspace.is_out_of_bounds(&self.position)
    }

    pub fn is_targeting_destination(&self) -> bool {
        self.current_route_stage >= self.flight_plan.route().len()
    }

    pub fn set_addition_to_multiplier(&mut self, multiplier_level: u32) {
        self.addition_to_multiplier = match multiplier_level {
            1 => 64,
            2 | 3 => 32,
            4 => 16,
            5 => 8,
            _ => return,
        };
    }

    pub fn set_departure_time(&mut self, time: f64) {
        self.departure_time = Some(time);
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn take_warning_cue(&mut self) -> bool {
        self.separation.take_warning_cue()
    }

    pub fn id(&self) -> AircraftId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn origin_airport(&self) -> Option<AirportId> {
        self.origin_airport
    }

    pub fn destination_airport(&self) -> Option<AirportId> {
        self.destination_airport
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn position(&self) -> Vector {
        self.position
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    pub fn bearing(&self) -> f64 {
        self.velocity.angle_xy()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude_xy()
    }

    pub fn altitude(&self) -> f64 {
        self.position.z()
    }

    pub fn flight_plan(&self) -> &FlightPlan {
        &self.flight_plan
    }

    pub fn current_route_stage(&self) -> usize {
        self.current_route_stage
    }

    pub fn current_target(&self) -> Vector {
        self.current_target
    }

    pub fn is_manually_controlled(&self) -> bool {
        self.is_manually_controlled
    }

    pub fn manual_bearing_target(&self) -> Option<f64> {
        self.has_bearing_override.then_some(self.manual_bearing_target)
    }

    pub fn is_turning_left(&self) -> bool {
        self.turning_by < 0.0
    }

    pub fn is_turning_right(&self) -> bool {
        self.turning_by > 0.0
    }

    pub fn altitude_state(&self) -> AltitudeState {
        self.altitude_state
    }

    pub fn is_landing(&self) -> bool {
        self.is_landing
    }

    pub fn is_waiting_to_land(&self) -> bool {
        self.is_waiting_to_land
    }

    pub fn is_finished(&self) -> bool {
        self.has_finished
    }

    pub fn is_crashed(&self) -> bool {
        self.is_crashed
    }

    pub fn separation(&self) -> &SeparationMonitor {
        &self.separation
    }

    pub fn too_near(&self) -> &[AircraftId] {
        self.separation.too_near()
    }

    pub fn base_score(&self) -> u32 {
        self.base_score
    }

    pub fn addition_to_multiplier(&self) -> u32 {
        self.addition_to_multiplier
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn optimal_time(&self) -> f64 {
        self.optimal_time
    }

    pub fn creation_time(&self) -> f64 {
        self.creation_time
    }

    pub fn departure_time(&self) -> Option<f64> {
        self.departure_time
    }
}

fn set_airport_active(airports: &mut [Airport], id: Option<AirportId>, active: bool) {
    if let Some(airport) = id.and_then(|id| airports.iter_mut().find(|a| a.id() == id)) {
        airport.set_active(active);
    }
}

/// Next route waypoint at `stage`, or the destination once the route is exhausted.
fn target_for_stage(flight_plan: &FlightPlan, stage: usize) -> Vector {
    flight_plan
        .route()
        .get(stage)
        .map(|w| w.location())
        .unwrap_or_else(|| flight_plan.destination())
}

/// Unit heading at spawn: towards the first target, else the destination, else due east.
fn initial_direction(name: &str, origin: Vector, target: Vector, destination: Vector) -> Vector {
    let towards_target = (target - origin).with_z(0.0).normalise();
    if towards_target != Vector::ZERO {
        return towards_target;
    }

    let towards_destination = (destination - origin).with_z(0.0).normalise();
    if towards_destination != Vector::ZERO {
        return towards_destination;
    }

    warn!("[AIRCRAFT] {} spawned on top of its destination, heading east", name);
    Vector::planar(1.0, 0.0)
}
