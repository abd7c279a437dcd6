/*!
 * Embedding collaborators.
 *
 * Embeddings are computed once per distinct normalized text before the
 * alignment starts, then attached to the text units:
 * - `ollama`: HTTP client for a local Ollama server
 * - `hashing`: deterministic character-trigram vectors, no network
 * - `cache`: per-run text -> vector map
 * - `mock`: scripted embedder for tests
 */

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::alignment::{SubtitleCue, TextUnit};
use crate::app_config::{EmbeddingConfig, EmbeddingProvider};
use crate::errors::{AlignError, EmbeddingError};

pub mod cache;
pub mod hashing;
pub mod mock;
pub mod ollama;

pub use cache::EmbeddingCache;
pub use hashing::HashingEmbedder;
pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;

/// Common trait for all embedding backends
///
/// Implementations must be deterministic for identical input and return
/// vectors of one fixed dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Compute the embedding of a normalized text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

/// Build the embedder selected in the configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Arc<dyn Embedder> {
    match config.provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(config)),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
    }
}

/// Embed every text, requesting each distinct text once
///
/// Results come back in input order. A failed text maps to
/// `AlignError::EmbeddingUnavailable`; the failures are logged once as a
/// single warning.
pub async fn embed_units(
    embedder: &dyn Embedder,
    cache: &EmbeddingCache,
    texts: &[&str],
    concurrency: usize,
    progress: Option<&ProgressBar>,
) -> Vec<Result<Vec<f32>, AlignError>> {
    let mut seen = HashSet::new();
    let pending: Vec<&str> = texts
        .iter()
        .copied()
        .filter(|text| !cache.contains(text) && seen.insert(*text))
        .collect();

    debug!(
        "Embedding {} distinct texts out of {} with '{}'",
        pending.len(),
        texts.len(),
        embedder.name()
    );
    if let Some(pb) = progress {
        pb.set_length(pending.len() as u64);
    }

    let failures: HashMap<&str, String> = stream::iter(pending)
        .map(|text| async move {
            let result = embedder.embed(text).await;
            (text, result)
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|(text, result)| async move {
            if let Some(pb) = progress {
                pb.inc(1);
            }
            match result {
                Ok(vector) => {
                    cache.store(text, vector);
                    None
                }
                Err(e) => Some((text, e.to_string())),
            }
        })
        .collect()
        .await;

    if !failures.is_empty() {
        warn!(
            "{} text(s) could not be embedded with '{}', falling back to lexical scoring for them",
            failures.len(),
            embedder.name()
        );
    }

    texts
        .iter()
        .map(|text| match cache.get(text) {
            Some(vector) => Ok(vector),
            None => Err(AlignError::EmbeddingUnavailable {
                text: text.to_string(),
                reason: failures
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| "not embedded".to_string()),
            }),
        })
        .collect()
}

/// Embed and attach vectors to both sequences, returning the failure count
pub async fn attach_embeddings(
    embedder: &dyn Embedder,
    cache: &EmbeddingCache,
    script: &mut [TextUnit],
    subtitles: &mut [SubtitleCue],
    concurrency: usize,
    progress: Option<&ProgressBar>,
) -> usize {
    let texts: Vec<String> = script
        .iter()
        .map(|unit| unit.normalized_text.clone())
        .chain(subtitles.iter().map(|cue| cue.unit.normalized_text.clone()))
        .collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    let results = embed_units(embedder, cache, &text_refs, concurrency, progress).await;

    let units = script
        .iter_mut()
        .chain(subtitles.iter_mut().map(|cue| &mut cue.unit));
    let mut failed = 0;
    for (unit, result) in units.zip(results) {
        match result {
            Ok(vector) => unit.embedding = Some(vector),
            Err(_) => {
                unit.embedding = None;
                failed += 1;
            }
        }
    }

    let (hits, misses, _) = cache.stats();
    info!(
        "Embedded {} units ({} without vector), cache {} hits / {} misses",
        texts.len(),
        failed,
        hits,
        misses
    );

    failed
}
