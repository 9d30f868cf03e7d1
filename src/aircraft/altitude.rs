use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Commanded vertical mode while cruising. Landing is tracked separately on the aircraft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AltitudeState {
    Climbing,
    #[default]
    Level,
    Falling,
}

impl AltitudeState {
    /// Direction of travel along the Z axis.
    pub fn vertical_sign(&self) -> f64 {
        match self {
            AltitudeState::Climbing => 1.0,
            AltitudeState::Level => 0.0,
            AltitudeState::Falling => -1.0,
        }
    }
}

impl fmt::Display for AltitudeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AltitudeState::Climbing => write!(f, "CLIMBING"),
            AltitudeState::Level => write!(f, "LEVEL"),
            AltitudeState::Falling => write!(f, "FALLING"),
        }
    }
}

impl FromStr for AltitudeState {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "climbing" | "climb" | "up" => Ok(AltitudeState::Climbing),
            "level" => Ok(AltitudeState::Level),
            "falling" | "descend" | "down" => Ok(AltitudeState::Falling),
            _ => Err(SimError::invalid_parameter(
                "altitudeState",
                format!("'{}' is not one of climbing, level, falling", s),
            )),
        }
    }
}
