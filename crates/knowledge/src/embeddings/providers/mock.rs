//! Offline embedding provider built from hashed words and character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;
use venturegraph_core::AppResult;

/// Deterministic, content-dependent vectors for tests and offline runs.
///
/// Texts sharing vocabulary land close together, which is enough to
/// exercise hybrid retrieval end to end without a network.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub const DEFAULT_DIMENSIONS: usize = 384;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str, seed: u64) -> usize {
        // FNV-1a
        let hash = token.bytes().fold(0xcbf2_9ce4_8422_2325 ^ seed, |acc, b| {
            (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
        (hash % self.dimensions as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let mut frequencies: HashMap<String, u32> = HashMap::new();
        for word in text.unicode_words() {
            if word.chars().count() > 2 {
                *frequencies.entry(word.to_lowercase()).or_insert(0) += 1;
            }
        }

        for (word, freq) in &frequencies {
            vector[self.bucket(word, 0)] += *freq as f32;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram, 1)] += (*freq as f32).sqrt();
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }
}
