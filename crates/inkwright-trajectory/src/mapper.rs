//! Brush geometry mapping.
//!
//! Maps a 2D stroke path with per-point widths onto 3D tool positions.
//! Wider stroke segments press the brush deeper (lower tool height) and
//! drag the contact point slightly along the travel direction, which is
//! what gives the written stroke its calligraphic weight.
//!
//! The mapping is piecewise linear over two width bands sharing a middle
//! anchor: a shallow band from zero width to the middle width, and a deep
//! band from the middle width to the widest width the brush supports.

use crate::types::{Stroke, StrokePoint};
use serde::{Deserialize, Serialize};

// Width band anchors, in scaled (task-space) units. Height is the z offset
// above the character baseline; deviation is the drag along the travel
// direction.
const STRAIGHT_WIDTH: f64 = 0.0;
const STRAIGHT_DEVIATION: f64 = 0.0;
const STRAIGHT_HEIGHT: f64 = 0.01 * 1.3;

const MIDDLE_WIDTH: f64 = 0.01 * 0.3;
const MIDDLE_DEVIATION: f64 = 0.01 * 0.21;
const MIDDLE_HEIGHT: f64 = 0.01 * 0.83;

const DEEPEST_WIDTH: f64 = 0.01 * 1.17;
const DEEPEST_DEVIATION: f64 = 0.01 * 0.1;
const DEEPEST_HEIGHT: f64 = 0.01 * 0.37;

/// Maximum width the naive depth mapping accepts, in scaled units
const NAIVE_MAX_WIDTH: f64 = 0.01;

/// Linear interpolation through `(x1, y1)` and `(x2, y2)`, evaluated at `x`.
///
/// The anchors must be distinct; the band tables above guarantee this for
/// all internal callers.
pub fn lerp(x1: f64, x2: f64, y1: f64, y2: f64, x: f64) -> f64 {
    debug_assert_ne!(x1, x2, "interpolation anchors must be distinct");
    (y2 - y1) / (x2 - x1) * (x - x1) + y1
}

/// Strategy for mapping stroke width to tool depth
///
/// The tag identifies the strategy both for dispatch and as part of the
/// trajectory cache key, so cached data computed under one mapping is never
/// served for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMapping {
    /// Two piecewise-linear bands for both depth and lateral deviation
    DoubleLinear,
    /// Depth only, linear in width, no lateral deviation
    NaiveDepth,
}

impl std::fmt::Display for BrushMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl BrushMapping {
    /// Stable identifier used in cache keys
    pub fn id(&self) -> &'static str {
        match self {
            Self::DoubleLinear => "double_linear3",
            Self::NaiveDepth => "naive_depth",
        }
    }

    /// Map a stroke's 2D points and widths to 3D tool positions.
    ///
    /// `scale` converts library units to meters; `start` is the character's
    /// position in task space, added last. Points are returned in travel
    /// order, one per input point, without orientation.
    pub fn map_stroke(&self, stroke: &Stroke, scale: f64, start: [f64; 3]) -> Vec<[f64; 3]> {
        let mut mapped = Vec::with_capacity(stroke.len());
        let mut prev = match stroke.first() {
            Some(p) => p.xy(),
            None => return mapped,
        };

        for point in stroke {
            let direction = travel_direction(prev, point.xy());
            mapped.push(self.map_point(point, direction, scale, start));
            prev = point.xy();
        }
        mapped
    }

    fn map_point(
        &self,
        point: &StrokePoint,
        direction: [f64; 2],
        scale: f64,
        start: [f64; 3],
    ) -> [f64; 3] {
        let x = point.x * scale;
        let y = point.y * scale;
        let w = (point.width * scale).max(0.0);

        let (deviation, height) = match self {
            Self::DoubleLinear => {
                let w = w.min(DEEPEST_WIDTH);
                if w <= MIDDLE_WIDTH {
                    (
                        lerp(STRAIGHT_WIDTH, MIDDLE_WIDTH, STRAIGHT_DEVIATION, MIDDLE_DEVIATION, w),
                        lerp(STRAIGHT_WIDTH, MIDDLE_WIDTH, STRAIGHT_HEIGHT, MIDDLE_HEIGHT, w),
                    )
                } else {
                    (
                        lerp(MIDDLE_WIDTH, DEEPEST_WIDTH, MIDDLE_DEVIATION, DEEPEST_DEVIATION, w),
                        lerp(MIDDLE_WIDTH, DEEPEST_WIDTH, MIDDLE_HEIGHT, DEEPEST_HEIGHT, w),
                    )
                }
            }
            Self::NaiveDepth => (0.0, NAIVE_MAX_WIDTH - w.min(NAIVE_MAX_WIDTH)),
        };

        [
            x + direction[0] * deviation + start[0],
            y + direction[1] * deviation + start[1],
            height + start[2],
        ]
    }
}

/// Unit travel direction from `prev` to `current`, or the zero vector when
/// the points coincide (which yields zero deviation downstream).
fn travel_direction(prev: [f64; 2], current: [f64; 2]) -> [f64; 2] {
    let dx = current[0] - prev[0];
    let dy = current[1] - prev[1];
    let norm = (dx * dx + dy * dy).sqrt();
    if norm == 0.0 {
        [0.0, 0.0]
    } else {
        [dx / norm, dy / norm]
    }
}
