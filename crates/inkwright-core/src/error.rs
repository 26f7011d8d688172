//! Error handling for Inkwright
//!
//! Provides error types for all layers of the application:
//! - Link errors (controller connectivity and convergence)
//! - Library errors (character library and trajectory cache)
//! - Trajectory errors (geometry and segmentation)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Controller link error type
///
/// Represents errors on the command and telemetry channels, including
/// connection failures, malformed telemetry frames, and motions that
/// never converge.
#[derive(Error, Debug, Clone)]
pub enum LinkError {
    /// Failed to establish the persistent command connection
    #[error("Failed to connect to {host}:{port}: {reason}")]
    ConnectFailed {
        /// The controller hostname or IP.
        host: String,
        /// The TCP port.
        port: u16,
        /// The underlying connection failure.
        reason: String,
    },

    /// Writing to the command socket failed
    #[error("Command write failed: {reason}")]
    CommandWriteFailed {
        /// The underlying write failure.
        reason: String,
    },

    /// Telemetry could not be read even after retrying
    #[error("Telemetry unavailable after {attempts} attempts: {reason}")]
    TelemetryUnavailable {
        /// How many read attempts were made.
        attempts: u32,
        /// The last read failure.
        reason: String,
    },

    /// Telemetry frame too short to contain a pose
    #[error("Telemetry frame truncated: got {actual} bytes, need {expected}")]
    FrameTruncated {
        /// Bytes required to decode the pose.
        expected: usize,
        /// Bytes actually received.
        actual: usize,
    },

    /// Motion did not converge before the deadline
    #[error("Motion failed to converge within {deadline_ms}ms")]
    ConvergenceTimeout {
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },
}

/// Character library and cache error type
#[derive(Error, Debug, Clone)]
pub enum LibraryError {
    /// Library or cache file could not be read
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// The file path.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Library or cache file could not be written
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// The file path.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// On-disk content did not match the expected shape
    #[error("Schema mismatch in {path}: {reason}")]
    SchemaMismatch {
        /// The file path.
        path: String,
        /// What failed to validate.
        reason: String,
    },

    /// Requested character has no entry in the library
    #[error("Character '{character}' (key {key}) not in library")]
    CharacterNotFound {
        /// The character that was requested.
        character: char,
        /// The hex codepoint key used for the lookup.
        key: String,
    },
}

/// Trajectory generation error type
#[derive(Error, Debug, Clone)]
pub enum TrajectoryError {
    /// A stroke with no points cannot be mapped
    #[error("Stroke {index} of character '{character}' is empty")]
    EmptyStroke {
        /// The character containing the stroke.
        character: char,
        /// The index of the empty stroke.
        index: usize,
    },

    /// A sub-stroke ended up with fewer than two waypoints
    #[error("Sub-stroke has only {count} waypoint(s), need at least 2")]
    TooFewWaypoints {
        /// The waypoint count.
        count: usize,
    },

    /// Width band anchors coincide, making interpolation undefined
    #[error("Degenerate width band: anchors {x1} and {x2} coincide")]
    DegenerateBand {
        /// The lower anchor.
        x1: f64,
        /// The upper anchor.
        x2: f64,
    },
}

/// Main error type for Inkwright
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Controller link error
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Library or cache error
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Trajectory generation error
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a convergence deadline error
    pub fn is_convergence_timeout(&self) -> bool {
        matches!(self, Error::Link(LinkError::ConvergenceTimeout { .. }))
    }

    /// Check if this is a recoverable missing-character error
    pub fn is_character_not_found(&self) -> bool {
        matches!(self, Error::Library(LibraryError::CharacterNotFound { .. }))
    }

    /// Check if this is a link error
    pub fn is_link_error(&self) -> bool {
        matches!(self, Error::Link(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_error_display_includes_endpoint() {
        let err = Error::from(LinkError::ConnectFailed {
            host: "10.0.0.5".to_string(),
            port: 30002,
            reason: "connection refused".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("10.0.0.5:30002"));
        assert!(msg.contains("connection refused"));
        assert!(err.is_link_error());
    }

    #[test]
    fn convergence_timeout_is_classified() {
        let err = Error::from(LinkError::ConvergenceTimeout { deadline_ms: 120_000 });
        assert!(err.is_convergence_timeout());
        assert!(!err.is_character_not_found());
    }
}
