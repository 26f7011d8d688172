//! Pose convergence monitoring.
//!
//! The scripting protocol gives no completion acknowledgement, so the only
//! way to know a motion finished is to poll telemetry until the reported
//! pose settles on the commanded target. Position error is a plain L1
//! distance. Orientation error needs care: a rotation vector and its
//! negation describe the same physical orientation, and the controller is
//! free to report either, so the error is evaluated against the target and
//! its negation and the smaller one wins.

use crate::link::PoseSource;
use inkwright_core::{LinkError, Pose, Result};
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

/// L1 distance between the position components of two poses
pub fn position_error(current: &Pose, target: &Pose) -> f64 {
    let a = current.position();
    let b = target.position();
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

fn axis_error(current: [f64; 3], target: [f64; 3]) -> f64 {
    current
        .iter()
        .zip(target.iter())
        .map(|(x, y)| {
            let d = (x - y).abs();
            // Components can sit a full turn apart and still agree.
            if d > TAU {
                TAU - d
            } else {
                d
            }
        })
        .sum()
}

/// Orientation error between two rotation vectors, sign-ambiguity aware
pub fn orientation_error(current: &Pose, target: &Pose) -> f64 {
    let cur = current.orientation();
    let tgt = target.orientation();
    let negated = [-tgt[0], -tgt[1], -tgt[2]];
    axis_error(cur, tgt).min(axis_error(cur, negated))
}

/// Tolerances that define "the arm has arrived"
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceCriteria {
    /// Maximum position error (m, L1 over xyz)
    pub position_tolerance: f64,
    /// Maximum orientation error (rad, L1 over the rotation vector)
    pub orientation_tolerance: f64,
}

/// Whether `current` is within tolerance of `target`
pub fn is_converged(current: &Pose, target: &Pose, criteria: &ConvergenceCriteria) -> bool {
    position_error(current, target) < criteria.position_tolerance
        && orientation_error(current, target) < criteria.orientation_tolerance
}

/// Block until the arm's reported pose converges on `target`.
///
/// Polls `source` every `poll` interval. Gives up with a convergence
/// timeout once `deadline` has elapsed without the pose settling.
pub fn await_convergence<S: PoseSource>(
    source: &mut S,
    target: &Pose,
    criteria: &ConvergenceCriteria,
    poll: Duration,
    deadline: Duration,
) -> Result<()> {
    let started = Instant::now();
    loop {
        let current = source.pose()?;
        if is_converged(&current, target, criteria) {
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "motion converged"
            );
            return Ok(());
        }
        if started.elapsed() >= deadline {
            tracing::error!(
                position_error = position_error(&current, target),
                orientation_error = orientation_error(&current, target),
                "motion did not converge before the deadline"
            );
            return Err(LinkError::ConvergenceTimeout {
                deadline_ms: deadline.as_millis() as u64,
            }
            .into());
        }
        std::thread::sleep(poll);
    }
}
