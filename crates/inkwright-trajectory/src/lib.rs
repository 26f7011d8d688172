//! # Inkwright Trajectory
//!
//! Turns 2D stroke paths with per-point width into 3D tool trajectories:
//! - Brush geometry mapping (width to depth and lateral deviation)
//! - Waypoint reduction and curvature-based stroke segmentation
//! - Per-character composition with entry/exit lifts and layout advance

pub mod composer;
pub mod mapper;
pub mod reducer;
pub mod segmenter;
pub mod types;

pub use composer::{rotate_character, CharacterComposer, LayoutState};
pub use mapper::{lerp, BrushMapping};
pub use reducer::reduce_by_stride;
pub use segmenter::segment_stroke;
pub use types::{Character, CharacterMotion, Stroke, StrokePoint, SubStroke};
