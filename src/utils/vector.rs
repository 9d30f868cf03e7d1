//! Airspace coordinate triple.
//!
//! X/Y are planar airspace units (screen oriented, Y grows downward) and Z is altitude in feet.
//! Ground-plane positions such as waypoints keep `z == 0`.
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector(DVec3);

impl Vector {
    pub const ZERO: Vector = Vector(DVec3::ZERO);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    /// A point on the ground plane.
    pub const fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    pub fn set_z(&mut self, z: f64) {
        self.0.z = z;
    }

    pub fn with_z(self, z: f64) -> Self {
        Self::new(self.0.x, self.0.y, z)
    }

    pub fn scale_by(self, k: f64) -> Self {
        Self(self.0 * k)
    }

    pub fn magnitude(&self) -> f64 {
        self.0.length()
    }

    /// Length of the horizontal projection.
    pub fn magnitude_xy(&self) -> f64 {
        self.0.truncate().length()
    }

    /// Unit vector in the same direction, or the zero vector when the length is zero.
    pub fn normalise(self) -> Self {
        Self(self.0.normalize_or_zero())
    }

    pub fn distance_squared_xy(&self, other: &Vector) -> f64 {
        self.0.truncate().distance_squared(other.0.truncate())
    }

    pub fn distance_squared(&self, other: &Vector) -> f64 {
        self.0.distance_squared(other.0)
    }

    /// Maps a unit-square-relative position (`0.0..=1.0` on each planar axis) onto an
    /// airspace of the given extent. Altitude is carried through untouched.
    pub fn remap_position(self, width: f64, height: f64) -> Self {
        Self::new(self.0.x * width, self.0.y * height, self.0.z)
    }

    /// Angle of the horizontal projection, `atan2(y, x)`.
    pub fn angle_xy(&self) -> f64 {
        self.0.y.atan2(self.0.x)
    }

    /// Rotates the horizontal components by `angle` radians. Altitude is untouched.
    pub fn rotate_xy(self, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        let (x, y) = (self.0.x, self.0.y);
        Self::new(x * cos_a - y * sin_a, y * cos_a + x * sin_a, self.0.z)
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector(self.0 + rhs.0)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.0 += rhs.0;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, k: f64) -> Vector {
        self.scale_by(k)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.0})", self.0.x, self.0.y, self.0.z)
    }
}
