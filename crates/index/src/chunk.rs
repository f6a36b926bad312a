//! Character-based document splitting

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 700;

const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

/// Splits text into chunks of at most `chunk_size` characters, preferring
/// paragraph boundaries, then line boundaries, then word boundaries.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into chunks. Whitespace-only pieces are dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_with(text, 0, &mut chunks);
        chunks
    }

    fn split_with(&self, text: &str, level: usize, out: &mut Vec<String>) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if text.chars().count() <= self.chunk_size {
            out.push(text.to_string());
            return;
        }
        if level >= SEPARATORS.len() {
            // No separator left, split at a raw character boundary
            let chars: Vec<char> = text.chars().collect();
            for piece in chars.chunks(self.chunk_size) {
                let piece: String = piece.iter().collect();
                let piece = piece.trim();
                if !piece.is_empty() {
                    out.push(piece.to_string());
                }
            }
            return;
        }

        let separator = SEPARATORS[level];
        let mut current = String::new();

        for piece in text.split(separator) {
            let piece_len = piece.chars().count();
            let current_len = current.chars().count();

            if piece_len > self.chunk_size {
                if !current.trim().is_empty() {
                    out.push(current.trim().to_string());
                }
                current = String::new();
                self.split_with(piece, level + 1, out);
                continue;
            }

            let sep_len = if current.is_empty() {
                0
            } else {
                separator.chars().count()
            };
            if current_len + sep_len + piece_len > self.chunk_size {
                if !current.trim().is_empty() {
                    out.push(current.trim().to_string());
                }
                current = piece.to_string();
            } else {
                if !current.is_empty() {
                    current.push_str(separator);
                }
                current.push_str(piece);
            }
        }

        if !current.trim().is_empty() {
            out.push(current.trim().to_string());
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = Chunker::new(100);
        let chunks = chunker.split("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let chunker = Chunker::default();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\n  ").is_empty());
    }

    #[test]
    fn splits_on_paragraphs_first() {
        let chunker = Chunker::new(20);
        let chunks = chunker.split("first paragraph\n\nsecond paragraph");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "first paragraph");
        assert_eq!(chunks[1], "second paragraph");
    }

    #[test]
    fn chunks_respect_size_limit() {
        let chunker = Chunker::new(30);
        let text = "one two three four five six seven eight nine ten eleven twelve";
        for chunk in chunker.split(text) {
            assert!(chunk.chars().count() <= 30, "chunk too long: {}", chunk);
        }
    }

    #[test]
    fn oversized_word_is_hard_split() {
        let chunker = Chunker::new(10);
        let chunks = chunker.split(&"x".repeat(25));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn all_content_is_preserved() {
        let chunker = Chunker::new(15);
        let text = "alpha beta gamma delta epsilon";
        let joined = chunker.split(text).join(" ");
        assert_eq!(joined, text);
    }
}
