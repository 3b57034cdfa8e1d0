//! Chunk splitting.
//!
//! Turns a body of text or markup into an ordered, immutable sequence of bounded-length
//! chunks. Lengths are counted in `char`s, so a boundary never falls inside a UTF-8
//! sequence.
//!
//! Markup content gets a repair pass after the plain cut: a boundary that lands inside
//! a tag is moved so the whole tag ends up in whichever neighbouring chunk already held
//! the larger part of it. Repaired chunks may exceed the requested length.
//!
//! In both modes, concatenating the chunks reproduces the input exactly, and empty
//! input produces exactly one empty chunk.

use crate::model::{ContentError, ContentType};

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 10_240;

/// Split `content` into consecutive pieces of at most `max_chunk_len` characters.
///
/// # Errors
///
/// Returns [`ContentError::InvalidChunkSize`] when `max_chunk_len` is zero.
///
/// # Examples
///
/// ```
/// use virtual_content::chunk::split_plain;
///
/// let chunks = split_plain("0123456789ab", 5).unwrap();
/// assert_eq!(chunks, vec!["01234", "56789", "ab"]);
///
/// assert_eq!(split_plain("", 5).unwrap(), vec![""]);
/// ```
pub fn split_plain(content: &str, max_chunk_len: usize) -> Result<Vec<String>, ContentError> {
    if max_chunk_len == 0 {
        return Err(ContentError::InvalidChunkSize);
    }
    if content.is_empty() {
        return Ok(vec![String::new()]);
    }

    let mut chunks = Vec::with_capacity(content.len() / max_chunk_len + 1);
    let mut start = 0;
    let mut count = 0;
    for (byte_idx, _) in content.char_indices() {
        if count == max_chunk_len {
            chunks.push(content[start..byte_idx].to_string());
            start = byte_idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(content[start..].to_string());

    Ok(chunks)
}

/// Split markup so that no chunk boundary falls inside a tag.
///
/// Applies [`split_plain`] and then [`repair_tag_boundaries`].
///
/// # Errors
///
/// Returns [`ContentError::InvalidChunkSize`] when `max_chunk_len` is zero.
///
/// # Examples
///
/// ```
/// use virtual_content::chunk::split_markup;
///
/// // "<di" stays behind (3 chars) vs "v>" would move (2 chars): pull the close back.
/// let chunks = split_markup("abc<div>xyz", 6).unwrap();
/// assert_eq!(chunks, vec!["abc<div>", "xyz"]);
/// ```
pub fn split_markup(content: &str, max_chunk_len: usize) -> Result<Vec<String>, ContentError> {
    let mut chunks = split_plain(content, max_chunk_len)?;
    repair_tag_boundaries(&mut chunks);
    Ok(chunks)
}

/// Repair chunk boundaries that cut through a tag.
///
/// For every non-final chunk whose last `<` comes after its last `>`, the tag fragment
/// left in the chunk (`tail`, from the `<` to the end) is compared with the fragment of
/// the next chunk up to and including its first `>` (`head`). When `tail` is longer,
/// `head` is pulled back; otherwise `tail` is pushed forward. A next chunk without any
/// `>` always receives the tail. Chunks are processed left to right, so a pushed tail is
/// examined again as part of the following chunk.
pub fn repair_tag_boundaries(chunks: &mut [String]) {
    for i in 0..chunks.len().saturating_sub(1) {
        let (left, right) = chunks.split_at_mut(i + 1);
        let current = &mut left[i];
        let next = &mut right[0];

        let Some(open) = unclosed_tag_start(current) else {
            continue;
        };
        let tail_len = current[open..].chars().count();

        match next.find('>') {
            Some(close) if tail_len > next[..=close].chars().count() => {
                let head: String = next.drain(..=close).collect();
                current.push_str(&head);
            }
            _ => {
                let tail = current.split_off(open);
                next.insert_str(0, &tail);
            }
        }
    }
}

/// Byte offset of a `<` that is not closed before the end of `chunk`.
fn unclosed_tag_start(chunk: &str) -> Option<usize> {
    let open = chunk.rfind('<')?;
    match chunk.rfind('>') {
        Some(close) if close > open => None,
        _ => Some(open),
    }
}

/// An immutable, ordered sequence of chunks addressed by index `0..len`.
///
/// Never empty: empty content is represented by a single empty chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSequence {
    chunks: Vec<String>,
}

impl ChunkSequence {
    /// Split `content` according to its content type.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidChunkSize`] when `max_chunk_len` is zero.
    pub fn split(
        content: &str,
        max_chunk_len: usize,
        content_type: ContentType,
    ) -> Result<Self, ContentError> {
        let chunks = match content_type {
            ContentType::Html => split_markup(content, max_chunk_len)?,
            ContentType::Text => split_plain(content, max_chunk_len)?,
        };
        Ok(Self { chunks })
    }

    /// Number of chunks (always at least one).
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the sequence holds no chunks. False for anything built by [`Self::split`].
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.chunks.get(index).map(String::as_str)
    }

    /// Iterate over chunks in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(String::as_str)
    }

    /// Concatenation of every chunk (the original content).
    pub fn concat(&self) -> String {
        self.chunks.concat()
    }
}

impl Default for ChunkSequence {
    fn default() -> Self {
        Self {
            chunks: vec![String::new()],
        }
    }
}
