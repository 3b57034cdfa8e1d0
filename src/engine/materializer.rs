//! Materialization: executing a [`WindowPlan`] against a [`Backend`].
//!
//! The materializer keeps `visible` exact while it works: every chunk is inserted into
//! the set as soon as the backend accepted it, so a failure halfway through leaves the
//! set describing what is really on the surface.

use super::backend::Backend;
use super::ChunkPreProcessor;
use crate::chunk::ChunkSequence;
use crate::model::{ContentError, ContentType};
use crate::view_state::{ChunkRange, GeometryCache, WindowPlan};
use std::collections::BTreeSet;
use tracing::debug;

/// Borrowed view of everything a rebuild touches.
pub(crate) struct Materializer<'a, B: Backend> {
    pub(crate) backend: &'a mut B,
    pub(crate) chunks: &'a ChunkSequence,
    pub(crate) geometry: &'a mut GeometryCache,
    pub(crate) visible: &'a mut BTreeSet<usize>,
    pub(crate) content_type: ContentType,
    pub(crate) pre_processor: Option<&'a ChunkPreProcessor>,
}

impl<B: Backend> Materializer<'_, B> {
    /// Run `plan`.
    pub(crate) fn execute(&mut self, plan: WindowPlan) -> Result<(), ContentError> {
        match plan {
            WindowPlan::Rebuild {
                range,
                top_filler,
                bottom_filler,
            } => {
                debug!(
                    start = range.start,
                    end = range.end,
                    top_filler,
                    bottom_filler,
                    "Rebuilding window"
                );
                self.backend.clear();
                self.visible.clear();
                self.backend.push_filler(top_filler);
                self.push_range(range)?;
                self.backend.push_filler(bottom_filler);
                Ok(())
            }
            WindowPlan::Append { range } => {
                debug!(start = range.start, end = range.end, "Appending chunks");
                self.push_range(range)
            }
        }
    }

    fn push_range(&mut self, range: ChunkRange) -> Result<(), ContentError> {
        for index in range.indices() {
            let Some(raw) = self.chunks.get(index) else {
                break;
            };
            let content = match self.pre_processor {
                Some(pre_processor) => pre_processor.apply(raw),
                None => raw.to_string(),
            };

            let measurement = self
                .backend
                .push_chunk(index, &content, self.content_type)
                .map_err(|e| ContentError::Backend(Box::new(e)))?;
            self.visible.insert(index);
            self.geometry.record(index, measurement)?;
        }
        Ok(())
    }
}
