//! # Inkwright Library
//!
//! Persisted data access for Inkwright:
//! - The read-only character library (stroke paths with per-point widths,
//!   produced offline by the vision pipeline)
//! - The trajectory cache that memoizes per-character motion programs

pub mod cache;
pub mod charlib;

pub use cache::{CacheKey, TrajectoryCache};
pub use charlib::{character_key, CharacterLibrary};
