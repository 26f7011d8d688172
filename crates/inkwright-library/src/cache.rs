//! Trajectory cache.
//!
//! Memoizes the full text-to-waypoints computation. The key combines every
//! input that affects the generated motion (text, scale, rotation angle,
//! mapping strategy); a hit replays the stored sub-stroke records verbatim
//! and skips all geometry work. On a miss the caller computes the motion
//! for every character and the whole map is written back to storage.

use inkwright_core::{LibraryError, Result};
use inkwright_trajectory::{BrushMapping, CharacterMotion};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Composite key identifying one writing run's trajectory data
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    /// The text that was written
    pub text: String,
    /// Scale factor from library units to meters
    pub scale: f64,
    /// Rotation angle in radians
    pub angle: f64,
    /// Width-to-depth mapping strategy
    pub mapping: BrushMapping,
}

impl std::fmt::Display for CacheKey {
    // The rendered form is the on-disk key; existing cache files depend on
    // this exact concatenation.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {},{}, {}",
            self.text,
            self.scale,
            self.angle,
            self.mapping.id()
        )
    }
}

/// Persisted trajectory cache
///
/// The full map is loaded eagerly at open and rewritten as a whole on every
/// store, matching the on-disk format: rendered key to per-character lists
/// of `[waypoints, slow_down, is_first]` records.
#[derive(Debug)]
pub struct TrajectoryCache {
    path: PathBuf,
    entries: HashMap<String, Vec<CharacterMotion>>,
}

impl TrajectoryCache {
    /// Open a cache file, starting empty if the file does not exist yet.
    ///
    /// A present but malformed file is a hard error; silently dropping an
    /// existing cache would hide data loss.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no trajectory cache yet, starting empty");
            return Ok(Self {
                path: path.to_path_buf(),
                entries: HashMap::new(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| LibraryError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let entries: HashMap<String, Vec<CharacterMotion>> = serde_json::from_str(&content)
            .map_err(|e| LibraryError::SchemaMismatch {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            entries = entries.len(),
            path = %path.display(),
            "trajectory cache loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Stored motion data for `key`, if this exact run was computed before
    pub fn lookup(&self, key: &CacheKey) -> Option<&Vec<CharacterMotion>> {
        self.entries.get(&key.to_string())
    }

    /// Insert an entry and persist the entire cache map
    pub fn store(&mut self, key: &CacheKey, motions: Vec<CharacterMotion>) -> Result<()> {
        self.entries.insert(key.to_string(), motions);

        let content =
            serde_json::to_string(&self.entries).map_err(|e| LibraryError::WriteFailed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        std::fs::write(&self.path, content).map_err(|e| LibraryError::WriteFailed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(entries = self.entries.len(), "trajectory cache persisted");
        Ok(())
    }

    /// Number of cached runs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
