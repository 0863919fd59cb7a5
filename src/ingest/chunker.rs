//! Splits extracted document text into overlapping passages.
//!
//! Windows are measured in characters. A window is cut early at the last
//! sentence ending found in its trailing fifth; otherwise the full fixed
//! window is taken. Consecutive windows share `overlap` characters.

/// Split `text` into overlapping chunks.
///
/// Callers must guarantee `chunk_size > overlap` (enforced at config
/// validation). Empty input yields no chunks; whitespace-only windows
/// are dropped.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let cut = if end < chars.len() {
            sentence_boundary(&chars[start..end])
                .map(|offset| start + offset)
                .unwrap_or(end)
        } else {
            end
        };

        let piece: String = chars[start..cut].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Last sentence ending in the trailing 20% of the window, as an offset
/// one past the terminator pair.
fn sentence_boundary(window: &[char]) -> Option<usize> {
    if window.len() < 2 {
        return None;
    }
    let search_start = window.len() * 4 / 5;
    for idx in (search_start..window.len() - 1).rev() {
        if matches!(window[idx], '.' | '!' | '?') && matches!(window[idx + 1], ' ' | '\n') {
            return Some(idx + 2);
        }
    }
    None
}
