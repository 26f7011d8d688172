//! Curvature-based stroke segmentation.
//!
//! The controller overshoots when it is asked to hold blended speed through
//! a sharp direction change, so a stroke's trajectory is split at curvature
//! reversals. Everything up to and including a reversal becomes a sub-stroke
//! that decelerates into the reversal point; the trailing remainder runs at
//! full blended speed.

use crate::types::SubStroke;
use inkwright_core::Pose;

/// Strokes with fewer waypoints than this are never split
pub const MIN_SPLIT_POINTS: usize = 11;

/// Interior margin: the first and last few waypoints are never reversal
/// candidates
const EDGE_MARGIN: usize = 5;

/// Minimum per-segment delta (scaled units) for a sign flip to count as a
/// reversal
const REVERSAL_TOLERANCE: f64 = 0.006;

/// Split one stroke's waypoints into kinematically safe sub-strokes.
///
/// All sub-strokes except the last are marked `slow_down`; the first is
/// marked `is_first`. Every returned sub-stroke has at least two waypoints:
/// a reversal directly adjacent to the previous cut is ignored, and a
/// trailing remainder too short to stand alone is merged into the previous
/// sub-stroke (which then becomes the full-speed tail).
pub fn segment_stroke(waypoints: Vec<Pose>) -> Vec<SubStroke> {
    let n = waypoints.len();
    if n < MIN_SPLIT_POINTS {
        tracing::debug!(points = n, "stroke below split threshold");
        return vec![SubStroke {
            waypoints,
            slow_down: false,
            is_first: true,
        }];
    }

    let mut groups: Vec<SubStroke> = Vec::new();
    let mut cut = 0usize;

    for i in EDGE_MARGIN..(n - EDGE_MARGIN) {
        if is_reversal(&waypoints[i - 1], &waypoints[i], &waypoints[i + 1]) && i >= cut + 1 {
            groups.push(SubStroke {
                waypoints: waypoints[cut..=i].to_vec(),
                slow_down: true,
                is_first: false,
            });
            cut = i + 1;
        }
    }

    if n - cut >= 2 {
        groups.push(SubStroke {
            waypoints: waypoints[cut..].to_vec(),
            slow_down: false,
            is_first: false,
        });
    } else if let Some(last) = groups.last_mut() {
        // Remainder too short to stand alone; fold it into the previous
        // group, which becomes the full-speed tail.
        last.waypoints.extend_from_slice(&waypoints[cut..]);
        last.slow_down = false;
    }

    if let Some(first) = groups.first_mut() {
        first.is_first = true;
    }
    groups
}

/// A curvature reversal: the x-delta (or y-delta) sign flips between the
/// two segments around `mid`, and either delta exceeds the tolerance.
fn is_reversal(prev: &Pose, mid: &Pose, next: &Pose) -> bool {
    let x_dif0 = mid.x - prev.x;
    let x_dif1 = next.x - mid.x;
    let y_dif0 = mid.y - prev.y;
    let y_dif1 = next.y - mid.y;

    let x_flips = x_dif0 * x_dif1 < 0.0
        && (x_dif0.abs() > REVERSAL_TOLERANCE || x_dif1.abs() > REVERSAL_TOLERANCE);
    let y_flips = y_dif0 * y_dif1 < 0.0
        && (y_dif0.abs() > REVERSAL_TOLERANCE || y_dif1.abs() > REVERSAL_TOLERANCE);

    x_flips || y_flips
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waypoint(x: f64, y: f64) -> Pose {
        Pose::new(x, y, 0.25, 0.0, std::f64::consts::PI, 0.0)
    }

    /// x rises, falls, rises again, with steps well above the tolerance.
    fn sawtooth(len: usize) -> Vec<Pose> {
        let step = 0.01;
        (0..len)
            .map(|i| {
                let x = match i {
                    0..=6 => i as f64 * step,
                    7..=12 => (12 - i) as f64 * step,
                    _ => (i - 12) as f64 * step,
                };
                waypoint(x, 0.0)
            })
            .collect()
    }

    #[test]
    fn short_stroke_is_one_full_speed_sub_stroke() {
        let waypoints: Vec<Pose> = (0..10).map(|i| waypoint(i as f64 * 0.01, 0.0)).collect();
        let groups = segment_stroke(waypoints.clone());
        assert_eq!(groups.len(), 1);
        assert!(!groups[0].slow_down);
        assert!(groups[0].is_first);
        assert_eq!(groups[0].waypoints, waypoints);
    }

    #[test]
    fn sawtooth_splits_with_slow_groups_before_the_tail() {
        let groups = segment_stroke(sawtooth(20));
        assert!(groups.len() >= 2);
        for group in &groups[..groups.len() - 1] {
            assert!(group.slow_down);
        }
        assert!(!groups.last().unwrap().slow_down);
        assert!(groups[0].is_first);
        assert!(groups[1..].iter().all(|g| !g.is_first));
    }

    #[test]
    fn segmentation_preserves_waypoint_order() {
        let original = sawtooth(25);
        let groups = segment_stroke(original.clone());
        let rejoined: Vec<Pose> = groups.iter().flat_map(|g| g.waypoints.clone()).collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn every_sub_stroke_has_at_least_two_waypoints() {
        // Tight zigzag: reversals on consecutive interior indices.
        let zigzag: Vec<Pose> = (0..15)
            .map(|i| waypoint(if i % 2 == 0 { 0.0 } else { 0.02 }, 0.0))
            .collect();
        for group in segment_stroke(zigzag) {
            assert!(group.waypoints.len() >= 2);
        }
    }

    #[test]
    fn straight_stroke_never_splits() {
        let straight: Vec<Pose> = (0..40).map(|i| waypoint(i as f64 * 0.01, 0.0)).collect();
        let groups = segment_stroke(straight);
        assert_eq!(groups.len(), 1);
        assert!(!groups[0].slow_down);
    }

    #[test]
    fn sub_tolerance_wobble_is_ignored() {
        // Sign flips every step but deltas stay at 0.001, below tolerance.
        let wobble: Vec<Pose> = (0..20)
            .map(|i| waypoint(i as f64 * 0.01, if i % 2 == 0 { 0.0 } else { 0.001 }))
            .collect();
        assert_eq!(segment_stroke(wobble).len(), 1);
    }
}
