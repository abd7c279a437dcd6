/*!
 * Deterministic in-process embedder.
 *
 * Hashes character trigrams into a fixed number of buckets. Texts sharing
 * many trigrams end up with a high cosine similarity, which is enough to
 * exercise the semantic term without a model server.
 */

use async_trait::async_trait;

use super::Embedder;
use crate::errors::EmbeddingError;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Synchronous core of [`Embedder::embed`]
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::Empty(text.to_string()));
        }

        let padded: Vec<char> = format!(" {} ", text).chars().collect();
        let mut vector = vec![0.0f32; self.dimensions];

        for trigram in padded.windows(3) {
            let hash = fnv1a(trigram);
            let bucket = (hash % self.dimensions as u64) as usize;
            // High bit picks the sign so unrelated trigrams partly cancel out
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        Ok(vector)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

fn fnv1a(chars: &[char]) -> u64 {
    let mut hash = FNV_OFFSET;
    for c in chars {
        let mut buf = [0u8; 4];
        for byte in c.encode_utf8(&mut buf).as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}
