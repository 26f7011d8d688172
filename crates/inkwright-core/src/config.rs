//! Configuration for the Inkwright writer
//!
//! Provides configuration file handling and validation. Settings are stored
//! as JSON and organized into logical sections:
//! - Link settings (controller endpoints, timeouts, retry policy)
//! - Motion settings (speeds, acceleration, blend radii, convergence)
//! - Data file locations (character library, trajectory cache)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Controller link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Controller hostname or IP address
    pub host: String,
    /// TCP port of the scripting (command) interface
    pub command_port: u16,
    /// TCP port of the realtime telemetry interface
    pub telemetry_port: u16,
    /// Read timeout for a single telemetry frame, in milliseconds
    pub read_timeout_ms: u64,
    /// Total telemetry read attempts before giving up (minimum 1)
    pub telemetry_attempts: u32,
    /// Delay between telemetry read attempts, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            host: "172.19.97.157".to_string(),
            command_port: 30002,
            telemetry_port: 30003,
            read_timeout_ms: 1000,
            telemetry_attempts: 2,
            retry_backoff_ms: 50,
        }
    }
}

/// Motion profile and convergence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionSettings {
    /// Steady-state tool speed (m/s)
    pub cruise_speed: f64,
    /// Tool acceleration (m/s^2), constant for all moves
    pub acceleration: f64,
    /// Blend radius for blended waypoints (m)
    pub blend_radius: f64,
    /// Position convergence tolerance for compound programs (m, L1 over xyz)
    pub position_tolerance: f64,
    /// Orientation convergence tolerance (rad, L1 over the rotation vector)
    pub orientation_tolerance: f64,
    /// Sleep between convergence polls after a compound program (ms)
    pub program_poll_ms: u64,
    /// Sleep between convergence polls after a point-to-point move (ms)
    pub move_poll_ms: u64,
    /// Deadline for a single motion to converge (ms)
    pub convergence_deadline_ms: u64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            cruise_speed: 0.28,
            acceleration: 0.2,
            blend_radius: 0.002,
            position_tolerance: 1e-3,
            orientation_tolerance: 0.1,
            program_poll_ms: 5,
            move_poll_ms: 2,
            convergence_deadline_ms: 120_000,
        }
    }
}

/// Complete writer configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Controller link settings
    pub link: LinkSettings,
    /// Motion profile settings
    pub motion: MotionSettings,
    /// Path to the character library (stroke paths with widths)
    pub library_path: PathBuf,
    /// Path to the persisted trajectory cache
    pub cache_path: PathBuf,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            link: LinkSettings::default(),
            motion: MotionSettings::default(),
            library_path: PathBuf::from("data/character_library.json"),
            cache_path: PathBuf::from("data/trajectory_cache.json"),
        }
    }
}

impl WriterConfig {
    /// Load config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::other(format!("Invalid JSON config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.link.host.is_empty() {
            return Err(Error::other("Controller host must not be empty"));
        }

        if self.link.telemetry_attempts == 0 {
            return Err(Error::other("Telemetry attempts must be >= 1"));
        }

        if self.motion.cruise_speed <= 0.0 || self.motion.acceleration <= 0.0 {
            return Err(Error::other("Cruise speed and acceleration must be > 0"));
        }

        if self.motion.blend_radius < 0.0 {
            return Err(Error::other("Blend radius must be >= 0"));
        }

        if self.motion.position_tolerance <= 0.0 || self.motion.orientation_tolerance <= 0.0 {
            return Err(Error::other("Convergence tolerances must be > 0"));
        }

        if self.motion.convergence_deadline_ms == 0 {
            return Err(Error::other("Convergence deadline must be > 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        WriterConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut config = WriterConfig::default();
        config.link.telemetry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("writer.json");

        let mut config = WriterConfig::default();
        config.link.host = "192.168.1.20".to_string();
        config.motion.cruise_speed = 0.25;
        config.save_to_file(&path).unwrap();

        let loaded = WriterConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.link.host, "192.168.1.20");
        assert_eq!(loaded.motion.cruise_speed, 0.25);
    }
}
