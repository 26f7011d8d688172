//! # Inkwright
//!
//! Drives a 6-axis robot arm to reproduce handwriting and calligraphy from
//! a character stroke library:
//! - 2D stroke paths with per-point width become 3D brush trajectories
//! - Trajectories are segmented at curvature reversals and speed-ramped
//! - Motion programs stream over TCP to the arm's controller, with binary
//!   pose telemetry polled until each motion converges
//!
//! ## Architecture
//!
//! Inkwright is organized as a workspace with multiple crates:
//!
//! 1. **inkwright-core** - Pose type, configuration, error types
//! 2. **inkwright-trajectory** - Brush mapping, segmentation, composition
//! 3. **inkwright-library** - Character library and trajectory cache
//! 4. **inkwright-communication** - Scripting protocol, telemetry, convergence
//! 5. **inkwright** - Main binary that integrates all crates

pub mod session;

pub use inkwright_communication::{ControllerLink, MotionDriver, TelemetryClient};
pub use inkwright_core::config::WriterConfig;
pub use inkwright_core::{Error, Pose, Result};
pub use inkwright_library::{CharacterLibrary, TrajectoryCache};
pub use inkwright_trajectory::{BrushMapping, CharacterComposer, LayoutState};
pub use session::WritingSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
