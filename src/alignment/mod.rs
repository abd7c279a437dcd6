/*!
 * Script-to-subtitle alignment core.
 *
 * - `normalizer`: canonical text used for comparison
 * - `scorer`: bounded pairwise cost (edit distance + embedding cosine distance)
 * - `engine`: banded dynamic program and path recovery
 * - `projector`: timestamps for every script line from the recovered path
 *
 * Everything here is synchronous and free of I/O. Embeddings are attached to
 * the text units before alignment starts.
 */

pub mod engine;
pub mod normalizer;
pub mod path;
pub mod projector;
pub mod scorer;
pub mod text_unit;

pub use engine::AlignmentEngine;
pub use normalizer::normalize;
pub use path::{AlignmentPath, AlignmentStep};
pub use projector::{Resolution, TimedScriptLine, project};
pub use scorer::{ScoringStrategy, SimilarityScorer};
pub use text_unit::{SubtitleCue, TextUnit};

use crate::app_config::AlignmentConfig;
use crate::errors::AlignError;

/// Result of one alignment run
#[derive(Debug, Clone)]
pub struct AlignmentOutcome {
    pub path: AlignmentPath,
    pub lines: Vec<TimedScriptLine>,
}

/// Align `script` against `subtitles` and project timings onto every script line
pub fn align_script(
    script: &[TextUnit],
    subtitles: &[SubtitleCue],
    config: &AlignmentConfig,
) -> Result<AlignmentOutcome, AlignError> {
    let engine = AlignmentEngine::new(config.clone())?;
    let path = engine.align(script, subtitles)?;
    let lines = project(&path, script, subtitles)?;
    Ok(AlignmentOutcome { path, lines })
}
