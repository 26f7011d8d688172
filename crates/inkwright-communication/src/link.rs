//! Controller link.
//!
//! Two channels connect the writer to the arm's controller:
//! - The command channel: one persistent TCP connection, opened at session
//!   start. A connect failure is fatal; there is nothing useful to do
//!   without the controller.
//! - The telemetry channel: a fresh TCP connection per poll with a short
//!   read timeout, returning a fixed-layout binary frame. The tool pose
//!   sits at a fixed byte offset as six contiguous big-endian f64 values.
//!
//! Both channels are blocking; the whole system is single-threaded and
//! every read/write suspends the calling thread.

use inkwright_core::config::LinkSettings;
use inkwright_core::{LinkError, Pose, Result};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Byte offset of the tool pose within a telemetry frame
const POSE_OFFSET: usize = 4 + 8 + 48 * 9;
/// Six big-endian f64 values, contiguous
const POSE_BYTES: usize = 6 * 8;

/// Writer side of the command channel
///
/// A seam for tests: the motion driver only needs to push bytes at the
/// controller, so mocks can capture the exact wire traffic.
pub trait CommandChannel {
    /// Send raw command bytes, blocking until fully written
    fn send(&mut self, data: &[u8]) -> Result<()>;
}

/// Source of live tool poses
pub trait PoseSource {
    /// The arm's current tool pose
    fn pose(&mut self) -> Result<Pose>;
}

/// The persistent command connection
pub struct ControllerLink {
    stream: TcpStream,
    peer: String,
}

impl ControllerLink {
    /// Connect to the controller's scripting interface.
    ///
    /// There is no retry: if the controller is unreachable at startup the
    /// run cannot proceed and the error propagates to the caller.
    pub fn connect(settings: &LinkSettings) -> Result<Self> {
        let peer = format!("{}:{}", settings.host, settings.command_port);
        let stream = TcpStream::connect(&peer).map_err(|e| LinkError::ConnectFailed {
            host: settings.host.clone(),
            port: settings.command_port,
            reason: e.to_string(),
        })?;
        tracing::info!(peer = %peer, "command channel connected");
        Ok(Self { stream, peer })
    }

    /// The remote endpoint this link is connected to
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

impl CommandChannel for ControllerLink {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream
            .write_all(data)
            .map_err(|e| LinkError::CommandWriteFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Bounded retry policy for telemetry reads
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, minimum 1
    pub attempts: u32,
    /// Delay between attempts
    pub backoff: Duration,
}

impl From<&LinkSettings> for RetryPolicy {
    fn from(settings: &LinkSettings) -> Self {
        Self {
            attempts: settings.telemetry_attempts.max(1),
            backoff: Duration::from_millis(settings.retry_backoff_ms),
        }
    }
}

/// Telemetry poller
///
/// Opens a new socket for every poll; the controller pushes a fresh frame
/// to each connection, so holding one open would only serve stale data.
pub struct TelemetryClient {
    host: String,
    port: u16,
    read_timeout: Duration,
    retry: RetryPolicy,
}

impl TelemetryClient {
    /// Create a poller for the controller's telemetry interface
    pub fn new(settings: &LinkSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.telemetry_port,
            read_timeout: Duration::from_millis(settings.read_timeout_ms),
            retry: RetryPolicy::from(settings),
        }
    }

    fn read_frame(&self) -> std::io::Result<Vec<u8>> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))?;
        stream.set_read_timeout(Some(self.read_timeout))?;

        // Only the prefix up to and including the pose field is needed.
        let mut frame = vec![0u8; POSE_OFFSET + POSE_BYTES];
        stream.read_exact(&mut frame)?;
        Ok(frame)
    }
}

impl PoseSource for TelemetryClient {
    fn pose(&mut self) -> Result<Pose> {
        let mut last_error = String::new();
        for attempt in 1..=self.retry.attempts {
            match self.read_frame() {
                Ok(frame) => return decode_pose(&frame),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "telemetry read failed");
                    last_error = e.to_string();
                    if attempt < self.retry.attempts {
                        std::thread::sleep(self.retry.backoff);
                    }
                }
            }
        }
        Err(LinkError::TelemetryUnavailable {
            attempts: self.retry.attempts,
            reason: last_error,
        }
        .into())
    }
}

/// Decode the tool pose from a telemetry frame.
///
/// The six pose values (x, y, z, rx, ry, rz) are big-endian f64, 8 bytes
/// each, starting at the fixed pose offset.
pub fn decode_pose(frame: &[u8]) -> Result<Pose> {
    let end = POSE_OFFSET + POSE_BYTES;
    if frame.len() < end {
        return Err(LinkError::FrameTruncated {
            expected: end,
            actual: frame.len(),
        }
        .into());
    }

    let mut values = [0.0f64; 6];
    for (i, value) in values.iter_mut().enumerate() {
        let at = POSE_OFFSET + i * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&frame[at..at + 8]);
        *value = f64::from_be_bytes(bytes);
    }
    Ok(Pose::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_pose(pose: [f64; 6]) -> Vec<u8> {
        let mut frame = vec![0u8; POSE_OFFSET + POSE_BYTES];
        for (i, v) in pose.iter().enumerate() {
            let at = POSE_OFFSET + i * 8;
            frame[at..at + 8].copy_from_slice(&v.to_be_bytes());
        }
        frame
    }

    #[test]
    fn decodes_pose_at_fixed_offset() {
        let pose = [0.1, -0.45, 0.26, 0.0, 3.14, -0.01];
        let decoded = decode_pose(&frame_with_pose(pose)).unwrap();
        assert_eq!(decoded.to_array(), pose);
    }

    #[test]
    fn pose_offset_matches_frame_layout() {
        // 4-byte length, 8-byte timestamp, nine 48-byte joint blocks.
        assert_eq!(POSE_OFFSET, 444);
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let err = decode_pose(&[0u8; 100]).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn retry_policy_enforces_at_least_one_attempt() {
        let mut settings = LinkSettings::default();
        settings.telemetry_attempts = 0;
        assert_eq!(RetryPolicy::from(&settings).attempts, 1);
    }
}
