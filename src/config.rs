use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::str::FromStr;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Difficulty tier of a match. Fixed per aircraft at spawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn speed_multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 2.0,
            Difficulty::Hard => 3.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "0" => Ok(Difficulty::Easy),
            "medium" | "1" => Ok(Difficulty::Medium),
            "hard" | "2" => Ok(Difficulty::Hard),
            _ => Err(SimError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = SimError;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        match tier {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            other => Err(SimError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Per-tier physical and scoring constants, carried by every aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,
    pub minimum_separation: f64,
    pub turn_rate: f64,         // radians per second
    pub vertical_velocity: f64, // feet per second
    pub speed_multiplier: f64,
    pub base_score: u32,
    pub addition_to_multiplier: u32,
}

impl DifficultyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                minimum_separation: 64.0,
                turn_rate: PI / 4.0,
                vertical_velocity: 500.0,
                speed_multiplier: difficulty.speed_multiplier(),
                base_score: 60,
                addition_to_multiplier: 1,
            },
            Difficulty::Medium => Self {
                difficulty,
                minimum_separation: 96.0,
                turn_rate: PI / 3.0,
                vertical_velocity: 300.0,
                speed_multiplier: difficulty.speed_multiplier(),
                base_score: 150,
                addition_to_multiplier: 1,
            },
            // Faster aircraft are allowed to turn faster to stay on track
            Difficulty::Hard => Self {
                difficulty,
                minimum_separation: 128.0,
                turn_rate: PI / 2.0,
                vertical_velocity: 200.0,
                speed_multiplier: difficulty.speed_multiplier(),
                base_score: 300,
                addition_to_multiplier: 3,
            },
        }
    }
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        Self::for_difficulty(difficulty)
    }
}

/// Match-level settings. Flight physics constants live with the aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub crash_penalty: i64,
    pub lives: u32,
    pub max_aircraft: usize,
    pub flight_generation_interval: f64, // seconds, before scaling
    pub hangar_size: usize,
    pub min_speed: u32,
    pub max_speed: u32,
    pub tick_rate: f64, // ticks per second
    pub auto_pilot: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            crash_penalty: 400,
            lives: 3,
            max_aircraft: 10,
            flight_generation_interval: 30.0,
            hangar_size: 3,
            min_speed: 32,
            max_speed: 41,
            tick_rate: 30.0,
            auto_pilot: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.min_speed == 0 || self.min_speed > self.max_speed {
            return Err(SimError::invalid_parameter(
                "minSpeed",
                format!("range {}..={} is empty", self.min_speed, self.max_speed),
            ));
        }
        if self.max_aircraft == 0 {
            return Err(SimError::invalid_parameter("maxAircraft", "must be at least 1"));
        }
        if !(self.tick_rate > 0.0) {
            return Err(SimError::invalid_parameter("tickRate", "must be positive"));
        }
        if !(self.flight_generation_interval > 0.0) {
            return Err(SimError::invalid_parameter(
                "flightGenerationInterval",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Seconds between generated flights.
    pub fn generation_interval(&self, difficulty: Difficulty) -> f64 {
        self.flight_generation_interval
            / (self.max_aircraft as f64 * difficulty.speed_multiplier())
    }
}

/// Named boundary point, in absolute airspace units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPointConfig {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Airport or interior waypoint placed relative to the airspace extent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativePointConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    pub name: String,
    pub tag: String,
}

/// Airspace layout loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub entry_points: Vec<EntryPointConfig>,
    #[serde(default)]
    pub airports: Vec<RelativePointConfig>,
    pub waypoints: Vec<RelativePointConfig>,
    #[serde(default)]
    pub max_leg_length: Option<f64>,
    #[serde(default = "default_carriers")]
    pub carriers: Vec<CarrierConfig>,
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
}

impl ScenarioConfig {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path))?;
        let config: ScenarioConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scenario JSON: {}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid scenario: {}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "extent {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.entry_points.len() + self.airports.len() < 2 {
            return Err(SimError::InvalidScenario(
                "at least two entry/exit points are required".to_string(),
            ));
        }
        if self.carriers.is_empty() {
            return Err(SimError::InvalidScenario("no carriers configured".to_string()));
        }

        let tag_pattern =
            Regex::new(r"^[A-Z]{2}$").map_err(|e| SimError::InvalidScenario(e.to_string()))?;
        for carrier in &self.carriers {
            if !tag_pattern.is_match(&carrier.tag) {
                return Err(SimError::InvalidScenario(format!(
                    "carrier tag '{}' for {} must be two uppercase letters",
                    carrier.tag, carrier.name
                )));
            }
        }

        for point in self.airports.iter().chain(self.waypoints.iter()) {
            if !(0.0..=1.0).contains(&point.x) || !(0.0..=1.0).contains(&point.y) {
                return Err(SimError::InvalidScenario(format!(
                    "relative point ({}, {}) lies outside the unit square",
                    point.x, point.y
                )));
            }
        }

        if let Some(limit) = self.max_leg_length {
            if !(limit > 0.0) {
                return Err(SimError::invalid_parameter("maxLegLength", "must be positive"));
            }
        }
        if let Some(simulation) = &self.simulation {
            simulation.validate()?;
        }
        Ok(())
    }
}

impl Default for ScenarioConfig {
    /// The classic two-airport layout.
    fn default() -> Self {
        let (width, height) = (888.0, 624.0);

        let entry_points = vec![
            EntryPointConfig { name: "North West Top Leftonia".to_string(), x: 8.0, y: 8.0 },
            EntryPointConfig { name: "100 Acre Woods".to_string(), x: 8.0, y: height - 4.0 },
            EntryPointConfig { name: "City of Rightson".to_string(), x: width - 4.0, y: 8.0 },
            EntryPointConfig { name: "South Sea".to_string(), x: width - 4.0, y: height - 4.0 },
        ];

        let airports = vec![
            RelativePointConfig { name: Some("Babbage International".to_string()), x: 1.0 / 7.0, y: 0.5 },
            RelativePointConfig { name: Some("Eboracum Airport".to_string()), x: 6.0 / 7.0, y: 0.5 },
        ];

        let waypoints = [
            (0.10, 0.18), (0.10, 0.83), (0.16, 0.66), (0.23, 0.90), (0.26, 0.37), (0.27, 0.70),
            (0.32, 0.12), (0.63, 0.78), (0.67, 0.20), (0.72, 0.43), (0.72, 0.90), (0.81, 0.16),
            (0.82, 0.80), (0.92, 0.32),
        ]
        .iter()
        .map(|&(x, y)| RelativePointConfig { name: None, x, y })
        .collect();

        Self {
            name: "Classic".to_string(),
            width,
            height,
            entry_points,
            airports,
            waypoints,
            max_leg_length: Some(360.0),
            carriers: default_carriers(),
            simulation: None,
        }
    }
}

pub fn default_carriers() -> Vec<CarrierConfig> {
    [
        ("Doge Air", "DG"),
        ("Britaniair", "BA"),
        ("KDT", "KT"),
        ("Canadair", "CA"),
        ("Wandairline", "WZ"),
        ("Wow Such Air", "WW"),
        ("Planet Express", "PX"),
        ("Aerobonia", "AR"),
    ]
    .iter()
    .map(|&(name, tag)| CarrierConfig {
        name: name.to_string(),
        tag: tag.to_string(),
    })
    .collect()
}
