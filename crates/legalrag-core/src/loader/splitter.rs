//! Recursive character splitting for embedding
//!
//! Text is split on the coarsest separator present (paragraphs, then lines,
//! sentences, words, characters) and the pieces are greedily merged back into
//! chunks of at most `chunk_size` characters, each sharing up to
//! `chunk_overlap` trailing characters with its predecessor.

use crate::error::{LegalRagError, Result};

/// Separators tried in order, coarsest first
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ".", " ", ""];

/// Recursive character text splitter
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(LegalRagError::Config("chunk_size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(LegalRagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into trimmed, non-empty chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &DEFAULT_SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(idx).copied().unwrap_or("");
        let remaining = separators.get(idx + 1..).unwrap_or(&[]);

        // Separators stay attached to the end of the piece they terminate
        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split_inclusive(separator).map(String::from).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(&piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window);

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        push_joined(&mut chunks, &window);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &std::collections::VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_content_is_single_chunk() {
        let splitter = TextSplitter::new(100, 20).unwrap();
        let chunks = splitter.split_text("Small content.");
        assert_eq!(chunks, vec!["Small content.".to_string()]);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(30, 5).unwrap();
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = splitter.split_text(content);
        assert_eq!(
            chunks,
            vec![
                "First paragraph.".to_string(),
                "Second paragraph.".to_string(),
                "Third paragraph.".to_string(),
            ]
        );
    }

    #[test]
    fn test_chunks_respect_size() {
        let splitter = TextSplitter::new(40, 10).unwrap();
        let content = "The statute of limitations for written contracts is four years. \
                       Oral contracts carry a two year limit. Tolling may apply.";
        let chunks = splitter.split_text(content);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 40, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn test_overlap_repeats_trailing_words() {
        let splitter = TextSplitter::new(20, 8).unwrap();
        let chunks = splitter.split_text("alpha beta gamma delta epsilon zeta");
        assert!(chunks.len() >= 2);
        let first_last_word = chunks[0].split_whitespace().last().unwrap();
        assert!(chunks[1].starts_with(first_last_word));
    }

    #[test]
    fn test_handles_unicode() {
        let splitter = TextSplitter::new(5, 1).unwrap();
        let chunks = splitter.split_text("§§§§§§§§§§§§");
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 5);
        }
    }

    #[test]
    fn test_rejects_bad_overlap() {
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        let splitter = TextSplitter::new(10, 2).unwrap();
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }
}
