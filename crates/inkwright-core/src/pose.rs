//! Tool pose representation.
//!
//! A pose is a Cartesian tool position plus a rotation-vector orientation,
//! matching the six-float layout used on both the command protocol
//! (`p[x,y,z,rx,ry,rz]`) and the telemetry frame.

use serde::{Deserialize, Serialize};

/// A tool pose in task space
///
/// Serialized as a flat 6-element array `[x, y, z, rx, ry, rz]` for
/// compatibility with the on-disk trajectory cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Pose {
    /// X position (m)
    pub x: f64,
    /// Y position (m)
    pub y: f64,
    /// Z position (m)
    pub z: f64,
    /// Rotation vector X component (rad)
    pub rx: f64,
    /// Rotation vector Y component (rad)
    pub ry: f64,
    /// Rotation vector Z component (rad)
    pub rz: f64,
}

impl Pose {
    /// Create a pose from position and orientation components
    pub fn new(x: f64, y: f64, z: f64, rx: f64, ry: f64, rz: f64) -> Self {
        Self { x, y, z, rx, ry, rz }
    }

    /// Create a pose from a 3D position and a rotation vector
    pub fn from_parts(position: [f64; 3], orientation: [f64; 3]) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            rx: orientation[0],
            ry: orientation[1],
            rz: orientation[2],
        }
    }

    /// The position components as an array
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// The orientation components as an array
    pub fn orientation(&self) -> [f64; 3] {
        [self.rx, self.ry, self.rz]
    }

    /// All six components in wire order
    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }

    /// This pose with the Z position raised by `dz`
    pub fn raised(&self, dz: f64) -> Self {
        Self {
            z: self.z + dz,
            ..*self
        }
    }
}

impl From<[f64; 6]> for Pose {
    fn from(v: [f64; 6]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }
}

impl From<Pose> for [f64; 6] {
    fn from(pose: Pose) -> Self {
        pose.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_flat_array() {
        let pose = Pose::new(0.1, -0.45, 0.259, 0.0, std::f64::consts::PI, 0.0);
        let arr: [f64; 6] = pose.into();
        assert_eq!(Pose::from(arr), pose);
    }

    #[test]
    fn serializes_as_flat_array() {
        let pose = Pose::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0,5.0,6.0]");
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
    }

    #[test]
    fn raised_only_touches_z() {
        let pose = Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0).raised(0.02);
        assert_eq!(pose.position(), [1.0, 2.0, 3.02]);
    }
}
