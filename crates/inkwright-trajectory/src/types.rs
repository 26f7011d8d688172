//! Stroke and motion data model.
//!
//! On-disk shapes are kept compatible with the existing character library
//! and trajectory cache files: a stroke point is `[[x, y], width]` and a
//! sub-stroke is `[waypoints, slow_down, is_first]` with each waypoint a
//! flat 6-array. The serde `from`/`into` conversions below pin those shapes
//! while the in-memory types stay strongly typed.

use inkwright_core::Pose;
use serde::{Deserialize, Serialize};

/// One control point of a 2D stroke path, unscaled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrokePointRecord", into = "StrokePointRecord")]
pub struct StrokePoint {
    /// X position in library units
    pub x: f64,
    /// Y position in library units
    pub y: f64,
    /// Stroke width at this point, >= 0, unscaled
    pub width: f64,
}

/// Library record shape: `[[x, y], width]`
type StrokePointRecord = ([f64; 2], f64);

impl From<StrokePointRecord> for StrokePoint {
    fn from(([x, y], width): StrokePointRecord) -> Self {
        Self { x, y, width }
    }
}

impl From<StrokePoint> for StrokePointRecord {
    fn from(p: StrokePoint) -> Self {
        ([p.x, p.y], p.width)
    }
}

impl StrokePoint {
    /// Create a stroke point
    pub fn new(x: f64, y: f64, width: f64) -> Self {
        Self { x, y, width }
    }

    /// The 2D position as an array
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// One stroke: control points in pen-travel order
pub type Stroke = Vec<StrokePoint>;

/// One character: strokes in writing order
pub type Character = Vec<Stroke>;

/// A contiguous run of one stroke's waypoints, grouped for a single
/// compound motion command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubStrokeRecord", into = "SubStrokeRecord")]
pub struct SubStroke {
    /// Waypoints in travel order, at least 2
    pub waypoints: Vec<Pose>,
    /// Whether this sub-stroke needs the long decelerating tail profile
    pub slow_down: bool,
    /// Whether this is the first sub-stroke of its stroke
    pub is_first: bool,
}

/// Cache record shape: `[waypoints, slow_down, is_first]`
type SubStrokeRecord = (Vec<Pose>, bool, bool);

impl From<SubStrokeRecord> for SubStroke {
    fn from((waypoints, slow_down, is_first): SubStrokeRecord) -> Self {
        Self {
            waypoints,
            slow_down,
            is_first,
        }
    }
}

impl From<SubStroke> for SubStrokeRecord {
    fn from(s: SubStroke) -> Self {
        (s.waypoints, s.slow_down, s.is_first)
    }
}

/// One character's full motion program, sub-strokes in execution order
pub type CharacterMotion = Vec<SubStroke>;
