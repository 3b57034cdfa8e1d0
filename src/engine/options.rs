//! Per-instance configuration.

use super::scheduler::DEFAULT_SCROLL_THROTTLE;
use crate::chunk::DEFAULT_CHUNK_SIZE;
use crate::model::{ContentError, ContentType};
use crate::view_state::window::{WindowMode, DEFAULT_THRESHOLD};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Transform applied to a chunk's content right before it is materialized.
///
/// # Examples
///
/// ```
/// use virtual_content::engine::ChunkPreProcessor;
///
/// let upper = ChunkPreProcessor::new(|chunk| chunk.to_uppercase());
/// assert_eq!(upper.apply("abc"), "ABC");
/// ```
#[derive(Clone)]
pub struct ChunkPreProcessor(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl ChunkPreProcessor {
    /// Wrap a transform.
    pub fn new(transform: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(transform))
    }

    /// Apply the transform to one chunk.
    pub fn apply(&self, chunk: &str) -> String {
        (self.0)(chunk)
    }
}

impl fmt::Debug for ChunkPreProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChunkPreProcessor(..)")
    }
}

/// Configuration of one [`VirtualContent`](super::VirtualContent) instance.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Maximum chunk length in characters (before markup repair).
    pub chunk_size: usize,
    /// Windowing policy.
    pub mode: WindowMode,
    /// Chunks kept on each side of the pointer.
    pub threshold: usize,
    /// How content passed to `set_content` is interpreted.
    pub content_type: ContentType,
    /// Optional transform applied to each chunk before materialization.
    pub chunk_pre_processor: Option<ChunkPreProcessor>,
    /// Minimum time between two scroll-driven updates.
    pub scroll_throttle: Duration,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: WindowMode::Replace,
            threshold: DEFAULT_THRESHOLD,
            content_type: ContentType::Html,
            chunk_pre_processor: None,
            scroll_throttle: DEFAULT_SCROLL_THROTTLE,
        }
    }
}

impl ContentConfig {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the windowing policy.
    pub fn with_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    /// Select append mode (`true`) or replace mode (`false`).
    pub fn with_append(self, append: bool) -> Self {
        self.with_mode(WindowMode::from_append(append))
    }

    /// Set the threshold radius.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Set the chunk pre-processor.
    pub fn with_pre_processor(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.chunk_pre_processor = Some(ChunkPreProcessor::new(transform));
        self
    }

    /// Set the scroll throttle interval.
    pub fn with_scroll_throttle(mut self, interval: Duration) -> Self {
        self.scroll_throttle = interval;
        self
    }

    /// Check that sizes are positive.
    ///
    /// # Errors
    ///
    /// [`ContentError::InvalidChunkSize`] or [`ContentError::InvalidThreshold`].
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.chunk_size == 0 {
            return Err(ContentError::InvalidChunkSize);
        }
        if self.threshold == 0 {
            return Err(ContentError::InvalidThreshold);
        }
        Ok(())
    }
}
