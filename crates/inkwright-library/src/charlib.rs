//! Character stroke library.
//!
//! A persisted mapping from character-code hex string to stroke data:
//! each entry is an ordered list of strokes, each stroke an ordered list of
//! `[[x, y], width]` pairs, unscaled. The library is produced offline by
//! the vision pipeline and is read-only here; the shape is validated
//! strictly at load so malformed data fails fast instead of surfacing deep
//! in trajectory generation.

use inkwright_core::{LibraryError, Result};
use inkwright_trajectory::Character;
use std::collections::HashMap;
use std::path::Path;

/// The library key for a character: its codepoint as lowercase hex,
/// zero-padded to at least four digits
pub fn character_key(glyph: char) -> String {
    format!("{:04x}", glyph as u32)
}

/// Read-only character library
#[derive(Debug, Clone)]
pub struct CharacterLibrary {
    characters: HashMap<String, Character>,
}

impl CharacterLibrary {
    /// Load and validate a library file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LibraryError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let characters: HashMap<String, Character> =
            serde_json::from_str(&content).map_err(|e| LibraryError::SchemaMismatch {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        for (key, character) in &characters {
            if character.is_empty() || character.iter().any(|stroke| stroke.is_empty()) {
                return Err(LibraryError::SchemaMismatch {
                    path: path.display().to_string(),
                    reason: format!("entry {} has an empty stroke list or stroke", key),
                }
                .into());
            }
        }

        tracing::info!(
            characters = characters.len(),
            path = %path.display(),
            "character library loaded"
        );
        Ok(Self { characters })
    }

    /// Number of characters in the library
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Whether the library holds stroke data for `glyph`
    pub fn contains(&self, glyph: char) -> bool {
        self.characters.contains_key(&character_key(glyph))
    }

    /// Stroke data for `glyph`, or a recoverable not-found error
    pub fn get(&self, glyph: char) -> Result<&Character> {
        let key = character_key(glyph);
        self.characters
            .get(&key)
            .ok_or_else(|| LibraryError::CharacterNotFound { character: glyph, key }.into())
    }
}
