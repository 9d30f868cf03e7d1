use std::f64::consts::PI;

use anyhow::Result;
use airspace_sim::aircraft::{
    run_separation_pass, Aircraft, AircraftId, AltitudeState, Contact, FlightPlan, FlightRequest,
};
use airspace_sim::airspace::Waypoint;
use airspace_sim::config::{Difficulty, DifficultyProfile};
use airspace_sim::scoring::ScoreMeter;
use airspace_sim::utils::navigation::{angle_difference, bearing_from_to};
use airspace_sim::utils::Vector;

fn corridor() -> Vec<Waypoint> {
    vec![
        Waypoint::new(0.0, 300.0, true, "West"),
        Waypoint::new(800.0, 300.0, true, "East"),
        Waypoint::new(200.0, 300.0, false, "WP01"),
        Waypoint::new(400.0, 300.0, false, "WP02"),
        Waypoint::new(600.0, 300.0, false, "WP03"),
        Waypoint::new(400.0, 100.0, false, "WPX"),
    ]
}

fn request(name: &str, origin: Waypoint, destination: Waypoint, altitude: f64) -> FlightRequest {
    FlightRequest {
        name: name.to_string(),
        carrier: "Britaniair".to_string(),
        origin,
        destination,
        origin_airport: None,
        destination_airport: None,
        speed: 40.0,
        altitude,
    }
}

fn spawn_at(id: u64, x: f64, y: f64, altitude: f64, difficulty: Difficulty) -> Result<Aircraft> {
    let waypoints = corridor();
    let origin = Waypoint::new(x, y, true, format!("Origin{}", id));
    let aircraft = Aircraft::new(
        AircraftId(id),
        request(&format!("BA{:03}", id), origin, waypoints[1].clone(), altitude),
        &waypoints,
        &DifficultyProfile::for_difficulty(difficulty),
        0.0,
    )?;
    Ok(aircraft)
}

fn eastbound_with_chain() -> Result<Aircraft> {
    let waypoints = corridor();
    let plan = FlightPlan::with_max_leg(&waypoints, &waypoints[0], &waypoints[1], Some(250.0));
    let aircraft = Aircraft::with_flight_plan(
        AircraftId(1),
        request("DG001", waypoints[0].clone(), waypoints[1].clone(), 28000.0),
        plan,
        &DifficultyProfile::for_difficulty(Difficulty::Easy),
        0.0,
    )?;
    Ok(aircraft)
}

#[test]
fn test_turning_preserves_horizontal_speed() -> Result<()> {
    let mut aircraft = spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Medium)?;
    let speed = aircraft.speed();
    let mut airports = Vec::new();

    aircraft.toggle_manual_control();
    for bearing in [2.5, -1.0, 3.1, -3.1, 0.2] {
        aircraft.set_bearing(bearing);
        for _ in 0..20 {
            aircraft.update(0.1, &mut airports);
            assert!((aircraft.speed() - speed).abs() < 1e-9);
        }
    }

    aircraft.turn_left(0.5);
    aircraft.turn_right(2.0);
    assert!((aircraft.speed() - speed).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_turn_never_passes_desired_bearing() -> Result<()> {
    let mut airports = Vec::new();

    for desired in [0.3, 1.0, 2.0, 3.0, -0.3, -1.5, -2.9, PI] {
        for dt in [0.05, 0.5, 2.0] {
            let mut aircraft = spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Hard)?;
            aircraft.toggle_manual_control();
            aircraft.set_bearing(desired);

            for _ in 0..10 {
                let before = angle_difference(desired, aircraft.bearing()).abs();
                aircraft.update(dt, &mut airports);
                let after = angle_difference(desired, aircraft.bearing()).abs();
                assert!(
                    after <= before + 1e-12,
                    "desired {} dt {}: {} -> {}",
                    desired,
                    dt,
                    before,
                    after
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_turn_across_the_divide_takes_short_way() -> Result<()> {
    let waypoints = corridor();
    // Westbound: bearing PI
    let mut aircraft = Aircraft::new(
        AircraftId(1),
        request("KT001", waypoints[1].clone(), waypoints[0].clone(), 28000.0),
        &waypoints,
        &DifficultyProfile::for_difficulty(Difficulty::Easy),
        0.0,
    )?;
    assert!((aircraft.bearing().abs() - PI).abs() < 1e-9);

    let mut airports = Vec::new();
    aircraft.toggle_manual_control();
    aircraft.set_bearing(-3.0);
    aircraft.update(0.1, &mut airports);

    // Clockwise on screen through +/-PI, never the long way round through zero
    assert!(aircraft.is_turning_right());
    let remaining = angle_difference(-3.0, aircraft.bearing());
    assert!(remaining > 0.0 && remaining < PI - 3.0);
    Ok(())
}

#[test]
fn test_aligned_aircraft_does_not_turn() -> Result<()> {
    let mut aircraft = spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?;
    let mut airports = Vec::new();

    aircraft.toggle_manual_control();
    let bearing = aircraft.bearing();
    aircraft.set_bearing(bearing + 0.005);
    aircraft.update(0.1, &mut airports);

    assert_eq!(aircraft.bearing(), bearing);
    assert!(!aircraft.is_turning_left() && !aircraft.is_turning_right());
    Ok(())
}

#[test]
fn test_wide_turns_are_boosted() -> Result<()> {
    let rate = DifficultyProfile::for_difficulty(Difficulty::Easy).turn_rate;
    let dt = 0.1;
    let mut airports = Vec::new();

    let mut wide = spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?;
    let start = wide.bearing();
    wide.toggle_manual_control();
    wide.set_bearing(start + 2.5);
    wide.update(dt, &mut airports);
    let turned = angle_difference(wide.bearing(), start);
    assert!((turned - 1.75 * rate * dt).abs() < 1e-9, "turned {}", turned);

    let mut narrow = spawn_at(2, 100.0, 300.0, 28000.0, Difficulty::Easy)?;
    let start = narrow.bearing();
    narrow.toggle_manual_control();
    narrow.set_bearing(start + 1.0);
    narrow.update(dt, &mut airports);
    let turned = angle_difference(narrow.bearing(), start);
    assert!((turned - rate * dt).abs() < 1e-9, "turned {}", turned);
    Ok(())
}

#[test]
fn test_is_at_uses_planar_squared_distance() -> Result<()> {
    let aircraft = spawn_at(1, 100.0, 300.0, 30000.0, Difficulty::Easy)?;

    assert!(aircraft.is_at(&Vector::planar(100.0, 300.0)));
    assert!(aircraft.is_at(&Vector::planar(102.0, 301.0)));
    assert!(!aircraft.is_at(&Vector::planar(102.0, 301.5)));
    assert!(!aircraft.is_at(&Vector::planar(97.0, 300.0)));
    Ok(())
}

#[test]
fn test_identical_positions_crash_from_either_side() -> Result<()> {
    let mut a = spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?;
    let mut b = spawn_at(2, 100.0, 300.0, 28000.0, Difficulty::Easy)?;
    let contacts = vec![Contact::of(&a), Contact::of(&b)];
    let mut meter = ScoreMeter::new();

    assert_eq!(a.update_collisions(&contacts, &mut meter), Some(AircraftId(2)));
    assert_eq!(b.update_collisions(&contacts, &mut meter), Some(AircraftId(1)));
    assert!(a.is_finished() && a.is_crashed());
    assert!(b.is_finished() && b.is_crashed());
    Ok(())
}

#[test]
fn test_separation_pass_reports_first_crash_only() -> Result<()> {
    let mut fleet = vec![
        spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?,
        spawn_at(2, 100.0, 300.0, 28000.0, Difficulty::Easy)?,
        spawn_at(3, 500.0, 500.0, 28000.0, Difficulty::Easy)?,
        spawn_at(4, 500.0, 500.0, 28000.0, Difficulty::Easy)?,
    ];
    let mut meter = ScoreMeter::new();

    let crash = run_separation_pass(&mut fleet, &mut meter);
    assert_eq!(crash, Some((AircraftId(1), AircraftId(2))));
    assert!(fleet[0].is_crashed() && fleet[1].is_crashed());
    assert!(!fleet[2].is_finished() && !fleet[3].is_finished());

    let crash = run_separation_pass(&mut fleet, &mut meter);
    assert_eq!(crash, Some((AircraftId(3), AircraftId(4))));
    Ok(())
}

#[test]
fn test_violation_registers_both_sides_once() -> Result<()> {
    let mut fleet = vec![
        spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?,
        spawn_at(2, 130.0, 300.0, 28000.0, Difficulty::Easy)?,
        spawn_at(3, 100.0, 300.0, 30000.0, Difficulty::Easy)?,
    ];
    let mut meter = ScoreMeter::new();
    meter.award_flight(0, 10);

    let crash = run_separation_pass(&mut fleet, &mut meter);
    assert_eq!(crash, None);
    assert_eq!(fleet[0].too_near(), &[AircraftId(2)]);
    assert_eq!(fleet[1].too_near(), &[AircraftId(1)]);
    assert!(fleet[2].too_near().is_empty());
    assert_eq!(meter.meter_fill(), 8);

    assert!(fleet[0].take_warning_cue());
    assert!(fleet[1].take_warning_cue());
    assert!(!fleet[2].take_warning_cue());
    Ok(())
}

#[test]
fn test_separation_depends_on_difficulty() -> Result<()> {
    let mut easy = vec![
        spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?,
        spawn_at(2, 200.0, 300.0, 28000.0, Difficulty::Easy)?,
    ];
    let mut hard = vec![
        spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Hard)?,
        spawn_at(2, 200.0, 300.0, 28000.0, Difficulty::Hard)?,
    ];
    let mut meter = ScoreMeter::new();

    run_separation_pass(&mut easy, &mut meter);
    run_separation_pass(&mut hard, &mut meter);
    assert!(easy[0].too_near().is_empty());
    assert_eq!(hard[0].too_near(), &[AircraftId(2)]);
    Ok(())
}

#[test]
fn test_climb_clamps_at_ceiling() -> Result<()> {
    let mut aircraft = spawn_at(1, 100.0, 300.0, 29000.0, Difficulty::Easy)?;
    let mut airports = Vec::new();
    aircraft.set_altitude_state(AltitudeState::Climbing);

    aircraft.update(1.0, &mut airports);
    assert_eq!(aircraft.altitude(), 29500.0);
    assert_eq!(aircraft.altitude_state(), AltitudeState::Climbing);

    aircraft.update(1.0, &mut airports);
    assert_eq!(aircraft.altitude(), 30000.0);
    assert_eq!(aircraft.altitude_state(), AltitudeState::Level);

    aircraft.update(1.0, &mut airports);
    assert_eq!(aircraft.altitude(), 30000.0);
    Ok(())
}

#[test]
fn test_fall_clamps_at_floor() -> Result<()> {
    let mut aircraft = spawn_at(1, 100.0, 300.0, 28100.0, Difficulty::Medium)?;
    let mut airports = Vec::new();
    aircraft.set_altitude_state(AltitudeState::Falling);

    aircraft.update(1.0, &mut airports);
    assert_eq!(aircraft.altitude(), 28000.0);
    assert_eq!(aircraft.altitude_state(), AltitudeState::Level);
    Ok(())
}

#[test]
fn test_altitude_stays_in_band() -> Result<()> {
    let mut aircraft = spawn_at(1, 100.0, 300.0, 28000.0, Difficulty::Easy)?;
    let mut airports = Vec::new();

    for step in 0..200 {
        if step % 7 == 0 {
            let state = if step % 14 == 0 {
                AltitudeState::Climbing
            } else {
                AltitudeState::Falling
            };
            aircraft.set_altitude_state(state);
        }
        aircraft.update(0.7, &mut airports);
        assert!((28000.0..=30000.0).contains(&aircraft.altitude()));
    }
    Ok(())
}

#[test]
fn test_alter_current_stage_retargets_immediately() -> Result<()> {
    let mut aircraft = eastbound_with_chain()?;
    let names: Vec<&str> = aircraft.flight_plan().route().iter().map(|w| w.name()).collect();
    assert_eq!(names, vec!["WP01", "WP02", "WP03"]);
    assert_eq!(aircraft.current_target(), Vector::planar(200.0, 300.0));

    let detour = corridor()[5].clone();

    assert!(aircraft.alter_path(1, detour.clone()));
    assert_eq!(aircraft.current_target(), Vector::planar(200.0, 300.0));

    assert!(aircraft.alter_path(0, detour));
    assert_eq!(aircraft.current_target(), Vector::planar(400.0, 100.0));
    Ok(())
}

#[test]
fn test_reroute_through_boundary_is_rejected() -> Result<()> {
    let mut aircraft = eastbound_with_chain()?;
    let before = aircraft.flight_plan().clone();
    let planned = aircraft.flight_plan().total_distance();

    assert!(!aircraft.alter_path(0, corridor()[1].clone()));
    assert!(!aircraft.alter_path(7, corridor()[5].clone()));
    assert_eq!(aircraft.flight_plan(), &before);
    assert_eq!(aircraft.current_target(), Vector::planar(200.0, 300.0));

    assert!(aircraft.alter_path(2, corridor()[5].clone()));
    assert_eq!(aircraft.flight_plan().total_distance(), planned);
    Ok(())
}

#[test]
fn test_route_stage_never_decreases() -> Result<()> {
    let mut aircraft = eastbound_with_chain()?;
    let mut airports = Vec::new();
    let mut last_stage = 0;

    while !aircraft.is_finished() {
        aircraft.update(1.0 / 30.0, &mut airports);
        assert!(aircraft.current_route_stage() >= last_stage);
        last_stage = aircraft.current_route_stage();
    }
    assert_eq!(last_stage, 3);
    assert!(!aircraft.is_crashed());
    Ok(())
}

#[test]
fn test_leaving_manual_control_resumes_route() -> Result<()> {
    let mut aircraft = eastbound_with_chain()?;
    let mut airports = Vec::new();

    aircraft.toggle_manual_control();
    aircraft.set_bearing(PI / 2.0);
    for _ in 0..30 {
        aircraft.update(0.1, &mut airports);
    }
    assert!(aircraft.bearing() > 1.0);

    aircraft.toggle_manual_control();
    assert!(!aircraft.is_manually_controlled());
    assert_eq!(aircraft.current_target(), Vector::planar(200.0, 300.0));
    assert_eq!(aircraft.manual_bearing_target(), None);

    // Heading swings back towards the first waypoint
    let before = angle_difference(
        bearing_from_to(&aircraft.position(), &aircraft.current_target()),
        aircraft.bearing(),
    )
    .abs();
    aircraft.update(0.1, &mut airports);
    let after = angle_difference(
        bearing_from_to(&aircraft.position(), &aircraft.current_target()),
        aircraft.bearing(),
    )
    .abs();
    assert!(after < before);
    Ok(())
}
