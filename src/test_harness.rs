//! Scripted backend for engine tests.
//!
//! Every chunk reports the same height and is laid out directly below whatever was
//! pushed before it, so offsets are predictable. All calls are logged in order.

use crate::engine::Backend;
use crate::model::ContentType;
use crate::view_state::Measurement;

/// Injected failure.
#[derive(Debug, thiserror::Error)]
#[error("scripted failure: {0}")]
pub struct ScriptedFailure(pub &'static str);

/// One logged backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Attach(&'static str),
    Detach,
    Clear,
    Filler(f64),
    Chunk(usize, String),
    SetScroll(f64),
    Listening(bool),
    Focus,
}

/// Backend with fixed chunk heights, a call log and failure injection.
#[derive(Debug)]
pub struct ScriptedBackend {
    pub chunk_height: f64,
    pub width: f64,
    pub scroll: f64,
    pub surface_offset: f64,
    pub listening: bool,
    pub attached_to: Option<&'static str>,
    pub fail_attach: bool,
    pub fail_on_chunk: Option<usize>,
    pub calls: Vec<Call>,
    cursor: f64,
}

impl ScriptedBackend {
    pub fn new(chunk_height: f64) -> Self {
        Self {
            chunk_height,
            width: 80.0,
            scroll: 0.0,
            surface_offset: 0.0,
            listening: false,
            attached_to: None,
            fail_attach: false,
            fail_on_chunk: None,
            calls: Vec::new(),
            cursor: 0.0,
        }
    }

    /// Indexes of chunks pushed since the last `Clear`.
    pub fn live_chunks(&self) -> Vec<usize> {
        let start = self
            .calls
            .iter()
            .rposition(|call| *call == Call::Clear)
            .map_or(0, |pos| pos + 1);
        self.calls[start..]
            .iter()
            .filter_map(|call| match call {
                Call::Chunk(index, _) => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Filler heights pushed since the last `Clear`.
    pub fn live_fillers(&self) -> Vec<f64> {
        let start = self
            .calls
            .iter()
            .rposition(|call| *call == Call::Clear)
            .map_or(0, |pos| pos + 1);
        self.calls[start..]
            .iter()
            .filter_map(|call| match call {
                Call::Filler(height) => Some(*height),
                _ => None,
            })
            .collect()
    }

    /// Number of `Clear` calls.
    pub fn clears(&self) -> usize {
        self.calls.iter().filter(|call| **call == Call::Clear).count()
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Backend for ScriptedBackend {
    type Container = &'static str;
    type Error = ScriptedFailure;

    fn attach(&mut self, container: &'static str) -> Result<(), ScriptedFailure> {
        if self.fail_attach {
            return Err(ScriptedFailure("attach"));
        }
        self.attached_to = Some(container);
        self.calls.push(Call::Attach(container));
        Ok(())
    }

    fn detach(&mut self) {
        self.attached_to = None;
        self.calls.push(Call::Detach);
    }

    fn clear(&mut self) {
        self.cursor = 0.0;
        self.calls.push(Call::Clear);
    }

    fn push_filler(&mut self, height: f64) {
        self.cursor += height;
        self.calls.push(Call::Filler(height));
    }

    fn push_chunk(
        &mut self,
        index: usize,
        content: &str,
        _content_type: ContentType,
    ) -> Result<Measurement, ScriptedFailure> {
        if self.fail_on_chunk == Some(index) {
            return Err(ScriptedFailure("push_chunk"));
        }
        let measurement = Measurement::new(self.chunk_height, self.cursor, 0.0);
        self.cursor += self.chunk_height;
        self.calls.push(Call::Chunk(index, content.to_string()));
        Ok(measurement)
    }

    fn scroll_position(&self) -> f64 {
        self.scroll
    }

    fn set_scroll_position(&mut self, position: f64) {
        self.scroll = position;
        self.calls.push(Call::SetScroll(position));
    }

    fn surface_offset(&self) -> f64 {
        self.surface_offset
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn focus(&mut self) {
        self.calls.push(Call::Focus);
    }

    fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
        self.calls.push(Call::Listening(listening));
    }
}
