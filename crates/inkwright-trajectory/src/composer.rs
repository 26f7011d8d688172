//! Per-character trajectory composition.
//!
//! Orchestrates one character's flow: optional rotation of the stroke
//! points, brush mapping, entry lift, segmentation, waypoint reduction,
//! exit lift, and the horizontal layout advance between characters.

use crate::mapper::BrushMapping;
use crate::reducer::reduce_by_stride;
use crate::segmenter::segment_stroke;
use crate::types::{Character, CharacterMotion, SubStroke};
use inkwright_core::{Pose, Result, TrajectoryError};

/// Entry lift above the first contact point (m)
const ENTRY_LIFT: f64 = 0.02;
/// Horizontal bias of the entry lift, against the initial travel direction (m)
const ENTRY_BIAS: f64 = 0.009;
/// Exit lift above the final contact point (m)
const EXIT_LIFT: f64 = 0.045;
/// Horizontal bias of the exit lift, along the final travel direction (m)
const EXIT_BIAS: f64 = 0.03;
/// Travel height between characters, above the layout cursor (m)
const APPROACH_LIFT: f64 = 0.15;
/// Waypoint reduction stride applied to every sub-stroke
const REDUCE_STRIDE: usize = 4;
/// Layout advance per character, as a multiple of the scale factor
const ADVANCE_FACTOR: f64 = 300.0;
/// Rotation pivot in library units
const ROTATION_PIVOT: [f64; 2] = [150.0, 150.0];

/// Shared layout state threaded through the writing run
///
/// Holds the current character's start position and the constant tool
/// orientation. The cursor moves leftward after each character (a negative
/// scale flips the direction), including characters that were skipped, so
/// spacing is preserved.
#[derive(Debug, Clone)]
pub struct LayoutState {
    /// Start position of the next character (m)
    pub cursor: [f64; 3],
    /// Constant tool orientation (rotation vector), fixed for the run
    pub orientation: [f64; 3],
}

impl LayoutState {
    /// Create a layout starting at `cursor` with a fixed tool orientation
    pub fn new(cursor: [f64; 3], orientation: [f64; 3]) -> Self {
        Self { cursor, orientation }
    }

    /// The lifted travel pose above the current cursor
    pub fn approach(&self) -> Pose {
        Pose::from_parts(self.cursor, self.orientation).raised(APPROACH_LIFT)
    }

    /// Advance the cursor to the next character's start position
    pub fn advance(&mut self, scale: f64) {
        self.cursor[0] -= scale * ADVANCE_FACTOR;
    }
}

/// Rotate every stroke point of a character about the fixed pivot.
///
/// The angle is counterclockwise, in radians. Widths are untouched.
pub fn rotate_character(character: &mut Character, angle: f64) {
    let (sin, cos) = angle.sin_cos();
    let [ox, oy] = ROTATION_PIVOT;
    for stroke in character.iter_mut() {
        for point in stroke.iter_mut() {
            let (dx, dy) = (point.x - ox, point.y - oy);
            point.x = ox + cos * dx - sin * dy;
            point.y = oy + sin * dx + cos * dy;
        }
    }
}

/// Builds one character's motion program from its stroke data
#[derive(Debug, Clone)]
pub struct CharacterComposer {
    mapping: BrushMapping,
    scale: f64,
    rotation: f64,
}

impl CharacterComposer {
    /// Create a composer for the given mapping strategy, scale factor, and
    /// rotation angle (radians, applied about the library pivot)
    pub fn new(mapping: BrushMapping, scale: f64, rotation: f64) -> Self {
        Self {
            mapping,
            scale,
            rotation,
        }
    }

    /// Compose the full motion program for one character.
    ///
    /// `glyph` is used only for error context. The layout cursor is read but
    /// not advanced here; the caller advances it once per character slot.
    pub fn compose(
        &self,
        glyph: char,
        character: &Character,
        layout: &LayoutState,
    ) -> Result<CharacterMotion> {
        let mut character = character.clone();
        if self.rotation != 0.0 {
            rotate_character(&mut character, self.rotation);
        }

        let mut motion: CharacterMotion = Vec::new();
        for (index, stroke) in character.iter().enumerate() {
            if stroke.is_empty() {
                return Err(TrajectoryError::EmptyStroke {
                    character: glyph,
                    index,
                }
                .into());
            }

            let mut points = self.mapping.map_stroke(stroke, self.scale, layout.cursor);
            points.insert(0, entry_lift(&points));

            let waypoints: Vec<Pose> = points
                .into_iter()
                .map(|p| Pose::from_parts(p, layout.orientation))
                .collect();

            let groups = segment_stroke(waypoints);
            tracing::debug!(
                glyph = %glyph,
                stroke = index,
                sub_strokes = groups.len(),
                "stroke segmented"
            );

            for group in groups {
                motion.push(SubStroke {
                    waypoints: reduce_by_stride(&group.waypoints, REDUCE_STRIDE),
                    ..group
                });
            }

            append_exit_lift(&mut motion)?;
        }
        Ok(motion)
    }
}

/// The lift point prepended before a stroke's first contact point: raised by
/// the entry lift and, when a travel direction exists, biased back along the
/// unit vector from the second point to the first so the tool does not
/// plunge vertically.
fn entry_lift(points: &[[f64; 3]]) -> [f64; 3] {
    let mut lift = points[0];
    lift[2] += ENTRY_LIFT;

    if points.len() > 1 {
        let dx = points[0][0] - points[1][0];
        let dy = points[0][1] - points[1][1];
        let dz = points[0][2] - points[1][2];
        let norm = (dx * dx + dy * dy + dz * dz).sqrt();
        if norm > 0.0 {
            lift[0] += dx / norm * ENTRY_BIAS;
            lift[1] += dy / norm * ENTRY_BIAS;
        }
    }
    lift
}

/// Append the exit lift to the final sub-stroke of the stroke just
/// composed: the last waypoint raised by the exit lift and biased along the
/// unit vector from the second-to-last to the last contact point.
fn append_exit_lift(motion: &mut CharacterMotion) -> Result<()> {
    let last = motion
        .last_mut()
        .ok_or(TrajectoryError::TooFewWaypoints { count: 0 })?;
    let n = last.waypoints.len();
    if n < 2 {
        return Err(TrajectoryError::TooFewWaypoints { count: n }.into());
    }

    let (c, d) = (&last.waypoints[n - 2], &last.waypoints[n - 1]);
    let dx = d.x - c.x;
    let dy = d.y - c.y;
    let norm = (dx * dx + dy * dy).sqrt();

    let mut lift = last.waypoints[n - 1].raised(EXIT_LIFT);
    if norm > 0.0 {
        lift.x += dx / norm * EXIT_BIAS;
        lift.y += dy / norm * EXIT_BIAS;
    }
    last.waypoints.push(lift);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrokePoint;

    fn layout() -> LayoutState {
        LayoutState::new(
            [0.10018570816351019, -0.4535427417650308, 0.2590640572333883],
            [0.0, std::f64::consts::PI, 0.0],
        )
    }

    #[test]
    fn two_point_stroke_becomes_three_waypoints_in_one_sub_stroke() {
        let character = vec![vec![
            StrokePoint::new(0.0, 0.0, 0.0),
            StrokePoint::new(1.0, 0.0, 0.0),
        ]];
        let composer = CharacterComposer::new(BrushMapping::DoubleLinear, 1.0, 0.0);
        let motion = composer.compose('x', &character, &layout()).unwrap();

        assert_eq!(motion.len(), 1);
        assert!(!motion[0].slow_down);
        assert!(motion[0].is_first);
        // Lift + two mapped points + exit lift.
        assert_eq!(motion[0].waypoints.len(), 4);
    }

    #[test]
    fn entry_lift_is_raised_and_biased_backward() {
        let character = vec![vec![
            StrokePoint::new(0.0, 0.0, 0.0),
            StrokePoint::new(1.0, 0.0, 0.0),
        ]];
        let composer = CharacterComposer::new(BrushMapping::DoubleLinear, 1.0, 0.0);
        let start = layout();
        let motion = composer.compose('x', &character, &start).unwrap();

        let lift = &motion[0].waypoints[0];
        let first_contact = &motion[0].waypoints[1];
        assert!((lift.z - (first_contact.z + ENTRY_LIFT)).abs() < 1e-12);
        // Stroke travels in +x, so the lift is biased toward -x.
        assert!(lift.x < first_contact.x);
    }

    #[test]
    fn exit_lift_extends_along_final_direction() {
        let character = vec![vec![
            StrokePoint::new(0.0, 0.0, 0.0),
            StrokePoint::new(1.0, 0.0, 0.0),
        ]];
        let composer = CharacterComposer::new(BrushMapping::DoubleLinear, 1.0, 0.0);
        let motion = composer.compose('x', &character, &layout()).unwrap();

        let waypoints = &motion[0].waypoints;
        let exit = &waypoints[3];
        let last_contact = &waypoints[2];
        assert!((exit.z - (last_contact.z + EXIT_LIFT)).abs() < 1e-12);
        assert!((exit.x - (last_contact.x + EXIT_BIAS)).abs() < 1e-12);
    }

    #[test]
    fn empty_stroke_is_rejected() {
        let character: Character = vec![vec![]];
        let composer = CharacterComposer::new(BrushMapping::DoubleLinear, 1.0, 0.0);
        let err = composer.compose('x', &character, &layout()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn orientation_is_constant_across_all_waypoints() {
        let character = vec![vec![
            StrokePoint::new(0.0, 0.0, 2.0),
            StrokePoint::new(5.0, 3.0, 4.0),
            StrokePoint::new(9.0, 1.0, 1.0),
        ]];
        let composer = CharacterComposer::new(BrushMapping::DoubleLinear, 0.001, 0.0);
        let motion = composer.compose('x', &character, &layout()).unwrap();

        let orientation = [0.0, std::f64::consts::PI, 0.0];
        for sub in &motion {
            for waypoint in &sub.waypoints {
                assert_eq!(waypoint.orientation(), orientation);
            }
        }
    }

    #[test]
    fn rotation_about_pivot_keeps_pivot_fixed() {
        let mut character = vec![vec![
            StrokePoint::new(150.0, 150.0, 1.0),
            StrokePoint::new(160.0, 150.0, 1.0),
        ]];
        rotate_character(&mut character, std::f64::consts::PI);
        let p = &character[0];
        assert!((p[0].x - 150.0).abs() < 1e-9);
        assert!((p[0].y - 150.0).abs() < 1e-9);
        assert!((p[1].x - 140.0).abs() < 1e-9);
        assert!((p[1].y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn layout_advances_leftward_by_scale_multiple() {
        let mut state = layout();
        let x0 = state.cursor[0];
        state.advance(0.0004);
        assert!((state.cursor[0] - (x0 - 0.12)).abs() < 1e-12);
    }

    #[test]
    fn approach_pose_is_lifted_travel_height() {
        let state = layout();
        let approach = state.approach();
        assert!((approach.z - (state.cursor[2] + APPROACH_LIFT)).abs() < 1e-12);
        assert_eq!(approach.orientation(), state.orientation);
    }
}
