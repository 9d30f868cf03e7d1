use thiserror::Error;

use crate::aircraft::AircraftId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown difficulty tier: {0}")]
    UnknownDifficulty(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Unknown aircraft: {0}")]
    UnknownAircraft(AircraftId),

    #[error("Unknown waypoint: {0}")]
    UnknownWaypoint(String),

    #[error("Unknown airport: {0}")]
    UnknownAirport(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
