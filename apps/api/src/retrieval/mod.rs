//! In-memory retrieval over a single document: split, embed, rank by cosine similarity.

pub mod splitter;

pub use splitter::TextSplitter;

use tracing::warn;

use crate::embedding::{cosine_similarity, Embedder, EmbeddingError, HashingEmbedder};

/// Number of chunks retrieved per document when grounding an interview turn.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone)]
struct IndexedChunk {
    content: String,
    embedding: Vec<f32>,
}

/// Chunks of one document with their embeddings.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Splits `text` and embeds every chunk in one batch.
    pub async fn build(
        text: &str,
        splitter: &TextSplitter,
        embedder: &dyn Embedder,
    ) -> Result<Self, EmbeddingError> {
        let contents = splitter.split(text);
        if contents.is_empty() {
            return Ok(Self::default());
        }

        let embeddings = embedder.embed_batch(&contents).await?;
        if embeddings.len() != contents.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "embedded {} of {} chunks",
                embeddings.len(),
                contents.len()
            )));
        }

        Ok(Self {
            chunks: contents
                .into_iter()
                .zip(embeddings)
                .map(|(content, embedding)| IndexedChunk { content, embedding })
                .collect(),
        })
    }

    /// Returns up to `k` chunk texts, most similar first.
    ///
    /// A query vector whose dimension differs from the indexed vectors (the
    /// embedding endpoint failed over between build and search) is never compared
    /// directly; chunks are then ranked with local hashing vectors instead.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<String>, EmbeddingError> {
        if self.chunks.is_empty() || k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = embedder.embed(query).await?;
        let indexed_dimension = self.dimension();
        if indexed_dimension != Some(query_embedding.len()) {
            warn!(
                "Query vector has {} dimensions but the index has {:?}; ranking with hashing vectors",
                query_embedding.len(),
                indexed_dimension
            );
            return Ok(self.rank_with_hashing(query, k));
        }

        Ok(top_k(
            self.chunks
                .iter()
                .map(|chunk| (cosine_similarity(&query_embedding, &chunk.embedding), chunk)),
            k,
        ))
    }

    /// Dimension of the indexed vectors, `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.chunks.first().map(|chunk| chunk.embedding.len())
    }

    fn rank_with_hashing(&self, query: &str, k: usize) -> Vec<String> {
        let hashing = HashingEmbedder::default();
        let query_embedding = hashing.embed_text(query);
        top_k(
            self.chunks.iter().map(|chunk| {
                let embedding = hashing.embed_text(&chunk.content);
                (cosine_similarity(&query_embedding, &embedding), chunk)
            }),
            k,
        )
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn top_k<'a>(scored: impl Iterator<Item = (f32, &'a IndexedChunk)>, k: usize) -> Vec<String> {
    let mut scored: Vec<(f32, &IndexedChunk)> = scored.collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(k)
        .map(|(_, chunk)| chunk.content.clone())
        .collect()
}
