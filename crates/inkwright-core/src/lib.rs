//! # Inkwright Core
//!
//! Core types, errors, and configuration for Inkwright.
//! Provides the fundamental abstractions shared by the trajectory,
//! library, and communication crates.

pub mod config;
pub mod error;
pub mod pose;

pub use config::{LinkSettings, MotionSettings, WriterConfig};
pub use error::{Error, LibraryError, LinkError, Result, TrajectoryError};
pub use pose::Pose;
