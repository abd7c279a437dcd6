/*!
 * # script-aligner
 *
 * A Rust library that aligns screenplay dialogue with the subtitle track of
 * the matching video and estimates a start and end time for every line.
 *
 * ## Features
 *
 * - Layout-based parsing of plain-text screenplays
 * - SRT loading with markup stripping
 * - Banded global alignment with asymmetric gap costs
 * - Blended lexical (edit distance) and semantic (embedding cosine) scoring
 * - Timestamp interpolation for script lines without a subtitle counterpart
 * - HTML, JSON and SRT outputs, batch processing of whole directories
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `alignment`: the synchronous core:
 *   - `alignment::normalizer`: canonical comparison text
 *   - `alignment::scorer`: pairwise cost model
 *   - `alignment::engine`: banded dynamic program and backtracking
 *   - `alignment::projector`: timing projection and interpolation
 * - `screenplay`: screenplay layout analysis and event classification
 * - `subtitle_processor`: SRT parsing and writing
 * - `embedding`: embedding backends (Ollama, hashing) and the per-run cache
 * - `report`: HTML alignment report
 * - `app_config`: Configuration management
 * - `app_controller`: Pipeline orchestration and batch mode
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod embedding;
pub mod errors;
pub mod file_utils;
pub mod report;
pub mod screenplay;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use alignment::{
    AlignmentEngine, AlignmentOutcome, AlignmentPath, AlignmentStep, Resolution, SubtitleCue,
    TextUnit, TimedScriptLine, align_script, normalize,
};
pub use app_config::{AlignmentConfig, Config};
pub use app_controller::{AlignOptions, Controller};
pub use embedding::{EmbeddingCache, Embedder};
pub use errors::{AlignError, EmbeddingError, ParseError, ProviderError};
pub use screenplay::{EventKind, ScriptEvent, Screenplay};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
