//! Motion execution.
//!
//! The driver owns one command channel and one pose source and runs the
//! per-sub-stroke sequence: point-to-point preamble moves, tool activation,
//! program transmission, invocation, and finally convergence on the
//! terminal waypoint. Sub-strokes are executed strictly one at a time; the
//! next one is not sent until the previous one has converged.

use crate::convergence::{await_convergence, ConvergenceCriteria};
use crate::link::{CommandChannel, PoseSource};
use crate::script::{movel_command, MotionProgram, ACTIVATE_TOOL};
use inkwright_core::config::MotionSettings;
use inkwright_core::{Pose, Result};
use inkwright_trajectory::SubStroke;
use std::f64::consts::PI;
use std::time::Duration;

/// Position tolerance for point-to-point moves (m, L1 over xyz)
///
/// Looser than the program tolerance: point-to-point moves position the
/// tool in free air, where millimeter-scale error is irrelevant.
const MOVE_POSITION_TOLERANCE: f64 = 1e-2;

/// Executes motion against the controller
pub struct MotionDriver<C, S> {
    channel: C,
    telemetry: S,
    motion: MotionSettings,
}

impl<C: CommandChannel, S: PoseSource> MotionDriver<C, S> {
    /// Create a driver over a command channel and a pose source
    pub fn new(channel: C, telemetry: S, motion: MotionSettings) -> Self {
        Self {
            channel,
            telemetry,
            motion,
        }
    }

    fn deadline(&self) -> Duration {
        Duration::from_millis(self.motion.convergence_deadline_ms)
    }

    /// Drive the tool point-to-point to `target` and wait for arrival.
    ///
    /// The orientation tolerance widens with the blend radius: a blended
    /// move is allowed to settle short of the exact commanded orientation.
    pub fn move_to(&mut self, target: &Pose, blend: f64) -> Result<()> {
        let command = movel_command(
            target,
            self.motion.acceleration,
            self.motion.cruise_speed,
            blend,
        );
        tracing::debug!(x = target.x, y = target.y, z = target.z, "point-to-point move");
        self.channel.send(command.as_bytes())?;

        let criteria = ConvergenceCriteria {
            position_tolerance: MOVE_POSITION_TOLERANCE,
            orientation_tolerance: self.motion.orientation_tolerance + blend * 3.0 * PI,
        };
        let poll = Duration::from_millis(self.motion.move_poll_ms);
        let deadline = self.deadline();
        await_convergence(&mut self.telemetry, target, &criteria, poll, deadline)
    }

    /// Execute one sub-stroke to completion.
    ///
    /// Preamble waypoints go point-to-point and unblended, then the
    /// compound program is transmitted and invoked, and the call blocks
    /// until the reported pose converges on the terminal waypoint.
    pub fn run_sub_stroke(&mut self, sub: &SubStroke) -> Result<()> {
        let program = MotionProgram::build(sub, &self.motion);

        for pose in program.preamble() {
            self.move_to(pose, 0.0)?;
        }

        tracing::debug!(
            waypoints = sub.waypoints.len(),
            slow_down = sub.slow_down,
            "running sub-stroke program"
        );
        self.channel.send(ACTIVATE_TOOL.as_bytes())?;
        self.channel.send(program.render().as_bytes())?;
        self.channel.send(program.invocation().as_bytes())?;

        let criteria = ConvergenceCriteria {
            position_tolerance: self.motion.position_tolerance,
            orientation_tolerance: self.motion.orientation_tolerance,
        };
        let poll = Duration::from_millis(self.motion.program_poll_ms);
        let deadline = self.deadline();
        await_convergence(&mut self.telemetry, program.terminal(), &criteria, poll, deadline)
    }

    /// The arm's current reported pose
    pub fn current_pose(&mut self) -> Result<Pose> {
        self.telemetry.pose()
    }

    /// Consume the driver, returning the channel and pose source
    pub fn into_parts(self) -> (C, S) {
        (self.channel, self.telemetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Captures everything written to the command channel
    struct MockChannel {
        sent: Vec<String>,
    }

    impl CommandChannel for MockChannel {
        fn send(&mut self, data: &[u8]) -> Result<()> {
            self.sent.push(String::from_utf8_lossy(data).into_owned());
            Ok(())
        }
    }

    /// Always reports the pose it was primed with
    struct FixedPose {
        pose: Pose,
        polls: usize,
    }

    impl PoseSource for FixedPose {
        fn pose(&mut self) -> Result<Pose> {
            self.polls += 1;
            Ok(self.pose)
        }
    }

    fn waypoint(i: usize) -> Pose {
        Pose::new(0.1 + i as f64 * 0.001, -0.45, 0.26, 0.0, 3.14, 0.0)
    }

    fn driver_at(pose: Pose) -> MotionDriver<MockChannel, FixedPose> {
        MotionDriver::new(
            MockChannel { sent: Vec::new() },
            FixedPose { pose, polls: 0 },
            MotionSettings::default(),
        )
    }

    #[test]
    fn move_to_sends_one_movel_and_polls_until_converged() {
        let target = waypoint(0);
        let mut driver = driver_at(target);
        driver.move_to(&target, 0.0).unwrap();

        assert_eq!(driver.channel.sent.len(), 1);
        assert!(driver.channel.sent[0].starts_with("movel(p["));
        assert_eq!(driver.telemetry.polls, 1);
    }

    #[test]
    fn sub_stroke_sends_activation_program_and_invocation_in_order() {
        let sub = SubStroke {
            waypoints: (0..5).map(waypoint).collect(),
            slow_down: true,
            is_first: false,
        };
        let mut driver = driver_at(waypoint(4));
        driver.run_sub_stroke(&sub).unwrap();

        let sent = &driver.channel.sent;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], ACTIVATE_TOOL);
        assert!(sent[1].starts_with("def tes():\n"));
        assert_eq!(sent[2], "tes()\n");
    }

    #[test]
    fn first_sub_stroke_prepends_point_to_point_moves() {
        let sub = SubStroke {
            waypoints: (0..5).map(waypoint).collect(),
            slow_down: false,
            is_first: true,
        };
        // The fixed pose sits at the terminal waypoint and within the loose
        // point-to-point tolerance of the two preamble waypoints.
        let mut driver = driver_at(waypoint(4));
        driver.run_sub_stroke(&sub).unwrap();

        let sent = &driver.channel.sent;
        assert_eq!(sent.len(), 5);
        assert!(sent[0].starts_with("movel(p["));
        assert!(sent[1].starts_with("movel(p["));
        assert_eq!(sent[2], ACTIVATE_TOOL);
    }

    #[test]
    fn unconverged_program_times_out() {
        let sub = SubStroke {
            waypoints: (0..5).map(waypoint).collect(),
            slow_down: true,
            is_first: false,
        };
        let mut driver = driver_at(Pose::new(0.5, 0.5, 0.5, 0.0, 3.14, 0.0));
        driver.motion.convergence_deadline_ms = 5;
        driver.motion.program_poll_ms = 1;
        let err = driver.run_sub_stroke(&sub).unwrap_err();
        assert!(err.is_convergence_timeout());
    }
}
