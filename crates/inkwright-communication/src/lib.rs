//! # Inkwright Communication
//!
//! Controller link for the writing arm:
//! - Text scripting protocol (point-to-point and compound blended motion)
//! - Persistent command socket and per-poll binary telemetry
//! - Pose convergence monitoring with orientation-ambiguity handling

pub mod convergence;
pub mod link;
pub mod motion;
pub mod script;

pub use convergence::{
    await_convergence, is_converged, orientation_error, position_error, ConvergenceCriteria,
};
pub use link::{decode_pose, CommandChannel, ControllerLink, PoseSource, RetryPolicy, TelemetryClient};
pub use motion::MotionDriver;
pub use script::{movel_command, MotionProgram, ACTIVATE_TOOL};
