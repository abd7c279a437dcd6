/*!
 * Mock embedder for testing.
 *
 * - `MockEmbedder::working()` - trigram vectors, always succeeds
 * - `MockEmbedder::failing()` - always fails with a connection error
 * - `MockEmbedder::failing_on(..)` - fails for texts containing a marker
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Embedder;
use super::hashing::HashingEmbedder;
use crate::errors::{EmbeddingError, ProviderError};

/// Behavior mode for the mock embedder
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    Working,
    Failing,
    /// Fails for every text containing the marker
    FailingOn(String),
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct MockEmbedder {
    behavior: MockBehavior,
    inner: HashingEmbedder,
    request_count: Arc<AtomicUsize>,
}

impl MockEmbedder {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            inner: HashingEmbedder::new(64),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailingOn(marker.into()))
    }

    /// Number of `embed` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn failure(text: &str) -> EmbeddingError {
        EmbeddingError::Provider(ProviderError::ConnectionError(format!(
            "mock embedder refused '{}'",
            text
        )))
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Working => self.inner.embed_sync(text),
            MockBehavior::Failing => Err(Self::failure(text)),
            MockBehavior::FailingOn(marker) if text.contains(marker.as_str()) => {
                Err(Self::failure(text))
            }
            MockBehavior::FailingOn(_) => self.inner.embed_sync(text),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                self.inner.embed_sync(text)
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
