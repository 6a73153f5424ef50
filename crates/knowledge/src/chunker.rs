//! Sliding-window text chunking.

use venturegraph_core::{AppError, AppResult};

/// Default window size in characters.
pub const DEFAULT_WINDOW: usize = 1000;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_OVERLAP: usize = 200;

/// Split `text` into windows of at most `window` characters.
///
/// Every window after the first starts `overlap` characters before the
/// previous one ended. The window that reaches the end of the text is the
/// last one. Windows are not trimmed.
pub fn chunk_text(text: &str, window: usize, overlap: usize) -> AppResult<Vec<String>> {
    if window == 0 {
        return Err(AppError::Request("Chunk window must be positive".to_string()));
    }
    if overlap >= window {
        return Err(AppError::Request(format!(
            "Chunk overlap ({}) must be smaller than the window ({})",
            overlap, window
        )));
    }

    // Byte offset of every char boundary, including the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = boundaries.len() - 1;

    let mut windows = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + window).min(total);
        windows.push(text[boundaries[start]..boundaries[end]].to_string());

        if end == total {
            break;
        }
        start = end - overlap;
    }

    tracing::debug!(
        "Chunked {} chars into {} windows (window: {}, overlap: {})",
        total,
        windows.len(),
        window,
        overlap
    );

    Ok(windows)
}
