//! Planar navigation utilities and calculations
use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::vector::Vector;

/// Bearing in radians from one point to another, `atan2(dy, dx)`.
pub fn bearing_from_to(from: &Vector, to: &Vector) -> f64 {
    (to.y() - from.y()).atan2(to.x() - from.x())
}

/// Signed shortest rotation that takes `current` onto `desired`, within `[-PI, PI]`.
///
/// The raw difference is shifted by PI, reduced with a truncating remainder and shifted back.
/// Truncation leaves raw differences below -PI on the wrong side of the +/-PI divide, so the
/// crossing is detected before the reduction and corrected afterwards.
pub fn angle_difference(desired: f64, current: f64) -> f64 {
    let raw = desired % TAU - current % TAU;
    let crosses_divide = raw < -PI;

    let mut diff = (raw + PI) % TAU - PI;
    if crosses_divide {
        diff += TAU;
    }
    diff
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Rotation sign in airspace coordinates. Y grows downward, so a positive rotation is
    /// clockwise on screen.
    pub fn sign(&self) -> f64 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }
}

pub fn shortest_turn_direction(current: f64, target: f64) -> TurnDirection {
    if angle_difference(target, current) >= 0.0 {
        TurnDirection::Right
    } else {
        TurnDirection::Left
    }
}

/// Axis-aligned rectangle on the airspace ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn centred_on(centre: &Vector, width: f64, height: f64) -> Self {
        Self::new(centre.x() - width / 2.0, centre.y() - height / 2.0, width, height)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn contains_point(&self, point: &Vector) -> bool {
        self.contains(point.x(), point.y())
    }

    pub fn centre(&self) -> Vector {
        Vector::planar(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
