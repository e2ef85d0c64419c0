//! Fixed-size overlapping text chunker.
//!
//! Documents are split into character windows of `chunk_size`, each trimmed
//! of surrounding whitespace, with consecutive windows sharing `overlap`
//! characters. Positions are character-based so multi-byte text never
//! splits inside a UTF-8 sequence.

use crate::error::RetrievalError;

/// Split `text` into overlapping windows of at most `chunk_size` characters.
///
/// The window start advances by `chunk_size - overlap` each step; iteration
/// stops once a window reaches the end of the text. Windows that trim to the
/// empty string are kept, so the output length always matches the advance
/// schedule. Empty input yields an empty vector.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, RetrievalError> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(RetrievalError::InvalidConfiguration {
            chunk_size,
            overlap,
        });
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = usize::min(start + chunk_size, chars.len());
        let window: String = chars[start..end].iter().collect();
        chunks.push(window.trim().to_string());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_advances_by_size_minus_overlap() {
        let chunks = split_text("abcdefghij", 4, 1).unwrap();
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_text("", 300, 20).unwrap().is_empty());
    }

    #[test]
    fn test_split_text_shorter_than_chunk_size() {
        let chunks = split_text("hello", 300, 20).unwrap();
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_split_rejects_overlap_ge_size() {
        assert!(split_text("abc", 4, 4).is_err());
        assert!(split_text("abc", 4, 5).is_err());
    }

    #[test]
    fn test_split_rejects_zero_chunk_size() {
        assert!(split_text("abc", 0, 0).is_err());
    }

    #[test]
    fn test_split_trims_whitespace() {
        let chunks = split_text("  ab  ", 6, 1).unwrap();
        assert_eq!(chunks, vec!["ab"]);
    }

    #[test]
    fn test_split_keeps_empty_trimmed_window() {
        // Second window covers only whitespace and trims to "".
        let chunks = split_text("ab    cd", 3, 1).unwrap();
        assert!(chunks.contains(&String::new()));
    }

    #[test]
    fn test_split_multibyte_text() {
        let chunks = split_text("héllo wörld émoji 🌍 text", 5, 1).unwrap();
        assert!(!chunks.is_empty());
        // Windows count characters, not bytes.
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn test_split_reconstructs_text_with_overlap_removed() {
        // Whitespace-free input so trimming is the identity and the windows
        // can be stitched back together exactly.
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let size = 8;
        let overlap = 2;
        let step = size - overlap;
        let chunks = split_text(text, size, overlap).unwrap();

        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 == chunks.len() {
                rebuilt.push_str(chunk);
            } else {
                rebuilt.extend(chunk.chars().take(step));
            }
        }
        assert_eq!(rebuilt, text);
    }
}
