use async_trait::async_trait;

use super::{Embedder, EmbeddingError};

/// Dimension of hashed vectors. Matches the small sentence models usually served locally.
pub const HASHING_DIMENSION: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature-hashing embedder: token counts folded into a fixed number of buckets,
/// then L2-normalised. Deterministic across runs and platforms.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: HASHING_DIMENSION,
        }
    }
}

impl HashingEmbedder {
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in tokenize(text) {
            let bucket = (fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Lowercased alphanumeric runs; CJK ideographs and kana count as one token each.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if is_cjk(c) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(c.to_string());
        } else if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF     // hiragana, katakana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0xAC00..=0xD7AF   // hangul syllables
        | 0xF900..=0xFAFF)  // CJK compatibility ideographs
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::cosine_similarity;

    #[test]
    fn test_tokenize_splits_on_punctuation_and_lowercases() {
        assert_eq!(
            tokenize("Rust, Tokio & gRPC!"),
            vec!["rust", "tokio", "grpc"]
        );
    }

    #[test]
    fn test_tokenize_splits_cjk_per_character() {
        assert_eq!(tokenize("深度学习ML"), vec!["深", "度", "学", "习", "ml"]);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let v = HashingEmbedder::default().embed_text("distributed systems engineer");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(v.len(), HASHING_DIMENSION);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = HashingEmbedder::default().embed_text("   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let embedder = HashingEmbedder::default();
        assert_eq!(
            embedder.embed_text("computer vision"),
            embedder.embed_text("computer vision")
        );
    }

    #[test]
    fn test_overlapping_texts_score_higher() {
        let embedder = HashingEmbedder::default();
        let resume = embedder.embed_text("Python PyTorch computer vision model training");
        let related = embedder.embed_text("computer vision engineer with PyTorch");
        let unrelated = embedder.embed_text("accounting payroll bookkeeping");
        assert!(
            cosine_similarity(&resume, &related) > cosine_similarity(&resume, &unrelated)
        );
    }
}
