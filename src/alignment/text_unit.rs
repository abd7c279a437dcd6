/*!
 * Text units and subtitle cues, the two sequences fed to the aligner.
 */

use serde::{Deserialize, Serialize};

use super::normalizer::normalize;

/// One line of dialogue or caption text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    /// Ordinal position in the source sequence
    pub id: usize,

    /// Text as it appeared in the source
    pub raw_text: String,

    /// Canonical form used for comparison
    pub normalized_text: String,

    /// Optional semantic embedding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl TextUnit {
    /// Create a unit and compute its normalized text
    pub fn new(id: usize, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = normalize(&raw_text);
        Self {
            id,
            raw_text,
            normalized_text,
            embedding: None,
        }
    }

    /// Attach an embedding
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A subtitle text unit carrying its display interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Text content of the cue
    pub unit: TextUnit,

    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms
    pub end_ms: u64,
}

impl SubtitleCue {
    pub fn new(id: usize, raw_text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            unit: TextUnit::new(id, raw_text),
            start_ms,
            end_ms,
        }
    }

    /// Attach an embedding to the cue's text
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.unit.embedding = Some(embedding);
        self
    }
}
