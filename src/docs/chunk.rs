use super::types::Chunk;

/// Words per chunk when the caller does not choose.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split `text` into consecutive, non-overlapping windows of `chunk_size`
/// whitespace-separated words. The last window may be shorter.
///
/// Each chunk carries its `[start_index, end_index)` word range so callers can
/// cite where a passage came from without re-splitting the document.
pub fn chunk_text(doc_id: &str, text: &str, chunk_size: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(chunk_size)
        .enumerate()
        .map(|(n, window)| {
            let start_index = n * chunk_size;
            Chunk {
                id: format!("{}-chunk-{}", doc_id, n),
                doc_id: doc_id.to_string(),
                content: window.join(" "),
                start_index,
                end_index: start_index + window.len(),
                embedding: None,
            }
        })
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
