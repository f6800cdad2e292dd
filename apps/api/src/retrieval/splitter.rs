use text_splitter::{Characters, ChunkConfig};

/// Semantic character splitter.
///
/// Chunks break on the coarsest boundary that fits (paragraphs, lines, sentences,
/// words, then graphemes), hold at most `chunk_size` characters and share up to
/// `chunk_overlap` characters with their neighbour. Chunks are trimmed and blank
/// chunks are dropped.
pub struct TextSplitter {
    inner: text_splitter::TextSplitter<Characters>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let chunk_overlap = chunk_overlap.min(chunk_size - 1);
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .unwrap_or_else(|_| ChunkConfig::new(chunk_size));

        Self {
            inner: text_splitter::TextSplitter::new(config),
            chunk_size,
            chunk_overlap,
        }
    }

    /// Splitter used for resume text.
    pub fn for_resume() -> Self {
        Self::new(1000, 200)
    }

    /// Splitter used for job descriptions.
    pub fn for_job() -> Self {
        Self::new(800, 150)
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.inner
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| chunk.to_string())
            .collect()
    }
}

impl std::fmt::Debug for TextSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSplitter")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(chunk: &str) -> usize {
        chunk.chars().count()
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = TextSplitter::for_resume().split("  Jane Doe\nRust engineer  ");
        assert_eq!(chunks, vec!["Jane Doe\nRust engineer"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(TextSplitter::for_job().split("").is_empty());
        assert!(TextSplitter::for_job().split(" \n\n\t ").is_empty());
    }

    #[test]
    fn test_words_are_kept_whole_within_chunk_size() {
        let text = "aaaa bbbb cccc dddd eeee ffff";
        let chunks = TextSplitter::new(20, 5).split(text);

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| char_len(c) <= 20));
        assert!(chunks[0].starts_with("aaaa"));
        assert!(chunks.last().unwrap().ends_with("ffff"));
        for word in text.split(' ') {
            assert!(chunks.iter().any(|c| c.split(' ').any(|w| w == word)));
        }
    }

    #[test]
    fn test_unbroken_text_is_cut_at_chunk_size() {
        let chunks = TextSplitter::new(5, 0).split("abcdefghij");
        assert!(chunks.iter().all(|c| char_len(c) <= 5));
        assert_eq!(chunks.concat(), "abcdefghij");
    }

    #[test]
    fn test_paragraphs_stay_within_chunk_size() {
        let paragraph = "Built detection models for retail cameras using PyTorch. ".repeat(4);
        let text = [paragraph.as_str(); 6].join("\n\n");
        let chunks = TextSplitter::new(300, 50).split(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| char_len(c) <= 300));
        assert!(chunks.iter().all(|c| c.contains("PyTorch")));
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let text = "机器学习工程师".repeat(3);
        let chunks = TextSplitter::new(7, 0).split(&text);

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| char_len(c) <= 7));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_overlap_is_clamped_below_chunk_size() {
        let splitter = TextSplitter::new(10, 50);
        assert_eq!(splitter.chunk_overlap, 9);
        assert!(!splitter.split("some words to split apart").is_empty());
    }
}
