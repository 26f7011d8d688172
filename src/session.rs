//! Writing session orchestration.
//!
//! A session turns one line of text into motion: plan the full trajectory
//! (from the cache when this exact run was computed before, otherwise by
//! composing every character), then stream every sub-stroke to the arm in
//! order, waiting for convergence after each one.

use inkwright_communication::{CommandChannel, MotionDriver, PoseSource};
use inkwright_core::Result;
use inkwright_library::{CacheKey, CharacterLibrary, TrajectoryCache};
use inkwright_trajectory::{BrushMapping, CharacterComposer, CharacterMotion, LayoutState};

/// Start position of the first character, in the arm's base frame (m)
pub const START_POSITION: [f64; 3] =
    [0.10018570816351019, -0.4535427417650308, 0.2590640572333883];

/// Tool orientation held for the whole run (rotation vector, rad)
pub const TOOL_ORIENTATION: [f64; 3] = [0.0, std::f64::consts::PI, 0.0];

/// Rotation applied to library stroke data (rad)
///
/// The library stores glyphs in camera orientation; a half turn puts them
/// upright on the writing surface.
pub const GLYPH_ROTATION: f64 = std::f64::consts::PI;

/// Plan the trajectory for `text` at `scale`.
///
/// Checks the cache first; on a miss, composes every character and stores
/// the result. Characters missing from the library are skipped with a
/// warning, but the layout cursor advances for them anyway so the
/// surrounding characters keep their spacing.
pub fn plan_text(
    text: &str,
    scale: f64,
    library: &CharacterLibrary,
    cache: &mut TrajectoryCache,
) -> Result<Vec<CharacterMotion>> {
    let key = CacheKey {
        text: text.to_string(),
        scale,
        angle: GLYPH_ROTATION,
        mapping: BrushMapping::DoubleLinear,
    };
    if let Some(found) = cache.lookup(&key) {
        tracing::info!(text = %text, "trajectory cache hit");
        return Ok(found.clone());
    }

    let composer = CharacterComposer::new(key.mapping, scale, key.angle);
    let mut layout = LayoutState::new(START_POSITION, TOOL_ORIENTATION);
    let mut motions = Vec::new();
    for glyph in text.chars() {
        match library.get(glyph) {
            Ok(character) => {
                motions.push(composer.compose(glyph, character, &layout)?);
            }
            Err(e) if e.is_character_not_found() => {
                tracing::warn!(glyph = %glyph, "character not in library, skipping");
            }
            Err(e) => return Err(e),
        }
        layout.advance(scale);
    }

    cache.store(&key, motions.clone())?;
    Ok(motions)
}

/// One writing run against a connected arm
pub struct WritingSession<C, S> {
    driver: MotionDriver<C, S>,
    library: CharacterLibrary,
    cache: TrajectoryCache,
}

impl<C: CommandChannel, S: PoseSource> WritingSession<C, S> {
    /// Create a session over a connected motion driver and loaded data
    pub fn new(driver: MotionDriver<C, S>, library: CharacterLibrary, cache: TrajectoryCache) -> Self {
        Self {
            driver,
            library,
            cache,
        }
    }

    /// Write `text` at `scale`.
    ///
    /// Sub-strokes are streamed strictly in sequence; an error anywhere
    /// aborts the run immediately since the arm's position is then unknown.
    pub fn write(&mut self, text: &str, scale: f64) -> Result<()> {
        let motions = plan_text(text, scale, &self.library, &mut self.cache)?;
        let total: usize = motions.iter().map(|m| m.len()).sum();
        tracing::info!(
            text = %text,
            characters = motions.len(),
            sub_strokes = total,
            "starting writing run"
        );

        for (index, motion) in motions.iter().enumerate() {
            tracing::info!(character = index, sub_strokes = motion.len(), "writing character");
            for sub in motion {
                self.driver.run_sub_stroke(sub)?;
            }
        }
        Ok(())
    }
}
