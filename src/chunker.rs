pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 80;

/// Splits document text into overlapping chunks for embedding.
///
/// Chunks are at most `chunk_size` characters, breaking on whitespace where
/// possible, and consecutive chunks share `overlap` characters of context.
#[must_use]
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    assert!(overlap < chunk_size, "overlap must be smaller than chunk size");

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let hard_end = (start + chunk_size).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            break_point(&chars, start, hard_end)
        };

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end == chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Prefers the last whitespace before the hard cut so words stay intact.
fn break_point(chars: &[char], start: usize, hard_end: usize) -> usize {
    chars[start..hard_end]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(hard_end, |relative| {
            let candidate = start + relative + 1;
            if candidate > start { candidate } else { hard_end }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let chunks = split_text("hello world", CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn chunks_respect_the_size_bound() {
        let text = "lorem ipsum dolor sit amet ".repeat(100);
        let chunks = split_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= CHUNK_SIZE);
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = "word ".repeat(300);
        let chunks = split_text(&text, 100, 20);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().rev().take(10).collect();
            let tail: String = tail.chars().rev().collect();
            assert!(
                pair[1].contains(tail.trim()),
                "chunk should carry context from its predecessor"
            );
        }
    }

    #[test]
    fn unbroken_text_still_makes_progress() {
        let text = "a".repeat(1200);
        let chunks = split_text(&text, 500, 80);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 500);
        }
    }
}
