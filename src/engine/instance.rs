//! VirtualContent - one chunked, windowed content instance.
//!
//! An instance owns its chunk sequence, geometry cache, window state and scroll
//! throttle exclusively. Its [`Backend`] stands in for the render surface and the
//! scrollable it listens on.
//!
//! # Lifecycle
//!
//! 1. [`VirtualContent::new`] with a [`ContentConfig`].
//! 2. [`set_text`](VirtualContent::set_text) / [`set_html`](VirtualContent::set_html)
//!    any number of times; each call resets pointer, geometry and visible set.
//! 3. [`render_to`](VirtualContent::render_to) attaches and renders the first window.
//! 4. The event loop forwards scroll notifications to
//!    [`on_scroll`](VirtualContent::on_scroll) and calls
//!    [`poll`](VirtualContent::poll) at [`next_deadline`](VirtualContent::next_deadline).
//! 5. [`destroy`](VirtualContent::destroy) stops listening, deregisters from the
//!    tracker and releases cached state. Late polls are ignored afterwards.

use super::backend::Backend;
use super::materializer::Materializer;
use super::options::ContentConfig;
use super::scheduler::{Throttle, UpdateOutcome};
use super::tracker::{self, Tracked};
use crate::chunk::ChunkSequence;
use crate::model::{ContentError, ContentType, ContentValue};
use crate::view_state::pointer;
use crate::view_state::{GeometryCache, WindowMode, WindowState};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process-unique identifier of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A body of content rendered through a bounded window of chunks.
#[derive(Debug)]
pub struct VirtualContent<B: Backend> {
    id: InstanceId,
    config: ContentConfig,
    backend: B,
    content_type: ContentType,
    chunks: ChunkSequence,
    geometry: GeometryCache,
    window: WindowState,
    throttle: Throttle,
    attached: bool,
    destroyed: bool,
}

impl<B: Backend> VirtualContent<B> {
    /// Create an instance holding a single empty chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidChunkSize`] or [`ContentError::InvalidThreshold`]
    /// for zero sizes.
    pub fn new(config: ContentConfig, backend: B) -> Result<Self, ContentError> {
        config.validate()?;
        let chunks = ChunkSequence::default();
        let instance = Self {
            id: InstanceId::next(),
            content_type: config.content_type,
            geometry: GeometryCache::new(chunks.len()),
            window: WindowState::new(config.mode, config.threshold),
            throttle: Throttle::new(config.scroll_throttle),
            chunks,
            config,
            backend,
            attached: false,
            destroyed: false,
        };
        debug!(
            instance = %instance.id,
            mode = ?instance.window.mode,
            threshold = instance.window.threshold,
            "Instance created"
        );
        Ok(instance)
    }

    /// Create an instance behind `Rc<RefCell<_>>`, ready for tracker registration.
    ///
    /// # Errors
    ///
    /// Same as [`VirtualContent::new`].
    pub fn shared(config: ContentConfig, backend: B) -> Result<Rc<RefCell<Self>>, ContentError> {
        Ok(Rc::new(RefCell::new(Self::new(config, backend)?)))
    }

    /// Identifier used by the tracker.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Configuration the instance was created with.
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Content type of the current chunks.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Current chunk sequence.
    pub fn chunks(&self) -> &ChunkSequence {
        &self.chunks
    }

    /// Geometry recorded so far.
    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    /// Windowing state.
    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably (e.g. to scroll it from an input handler).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Whether [`render_to`](Self::render_to) succeeded and the instance is not destroyed.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether [`destroy`](Self::destroy) was called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Replace the content with plain text.
    ///
    /// # Errors
    ///
    /// [`ContentError::InvalidContent`] for non-finite numbers (content unchanged),
    /// [`ContentError::Destroyed`] after `destroy`, or a rebuild failure when attached.
    pub fn set_text(&mut self, value: impl Into<ContentValue>) -> Result<&mut Self, ContentError> {
        self.replace_content(value.into(), ContentType::Text)
    }

    /// Replace the content with markup.
    ///
    /// # Errors
    ///
    /// Same as [`set_text`](Self::set_text).
    pub fn set_html(&mut self, value: impl Into<ContentValue>) -> Result<&mut Self, ContentError> {
        self.replace_content(value.into(), ContentType::Html)
    }

    /// Replace the content, interpreted with the configured content type.
    ///
    /// # Errors
    ///
    /// Same as [`set_text`](Self::set_text).
    pub fn set_content(
        &mut self,
        value: impl Into<ContentValue>,
    ) -> Result<&mut Self, ContentError> {
        self.replace_content(value.into(), self.config.content_type)
    }

    fn replace_content(
        &mut self,
        value: ContentValue,
        content_type: ContentType,
    ) -> Result<&mut Self, ContentError> {
        self.ensure_live()?;
        let content = value.into_string()?;
        let chunks = ChunkSequence::split(&content, self.config.chunk_size, content_type)?;

        info!(
            instance = %self.id,
            chunks = chunks.len(),
            bytes = content.len(),
            content_type = content_type.as_str(),
            "Content replaced"
        );

        self.chunks = chunks;
        self.content_type = content_type;
        self.geometry.reset(self.chunks.len());
        self.window.reset();
        self.throttle.reset();

        if self.attached {
            self.backend.set_scroll_position(0.0);
            self.rebuild(0)?;
        }
        Ok(self)
    }

    /// Attach to `container` and render the window for the current pointer.
    ///
    /// # Errors
    ///
    /// [`ContentError::MissingContainer`] when `container` is `None` (nothing is
    /// attached), [`ContentError::Destroyed`] after `destroy`, or
    /// [`ContentError::Backend`] when attaching or rendering fails.
    pub fn render_to(
        &mut self,
        container: Option<B::Container>,
    ) -> Result<&mut Self, ContentError> {
        self.ensure_live()?;
        let container = container.ok_or(ContentError::MissingContainer)?;
        self.backend
            .attach(container)
            .map_err(|e| ContentError::Backend(Box::new(e)))?;
        self.attached = true;
        self.window.last_known_width = self.backend.width();

        info!(instance = %self.id, width = self.window.last_known_width, "Attached");
        self.rebuild(self.window.pointer)?;
        Ok(self)
    }

    /// Scroll notification at `now`.
    ///
    /// Leading-edge notifications run an update immediately; notifications inside the
    /// throttle interval are coalesced into a trailing update delivered by
    /// [`poll`](Self::poll). Ignored before `render_to` and after `destroy`.
    ///
    /// # Errors
    ///
    /// Propagates rebuild failures.
    pub fn on_scroll(&mut self, now: Instant) -> Result<Option<UpdateOutcome>, ContentError> {
        if !self.is_live() {
            return Ok(None);
        }
        if !self.throttle.on_event(now) {
            debug!(instance = %self.id, "Scroll coalesced");
            return Ok(None);
        }
        self.update().map(Some)
    }

    /// Run the trailing update if it is due at `now`.
    ///
    /// A no-op before `render_to` and after `destroy`.
    ///
    /// # Errors
    ///
    /// Propagates rebuild failures.
    pub fn poll(&mut self, now: Instant) -> Result<Option<UpdateOutcome>, ContentError> {
        if !self.is_live() || !self.throttle.poll(now) {
            return Ok(None);
        }
        self.update().map(Some)
    }

    /// When the pending trailing update is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.is_live() {
            self.throttle.next_deadline()
        } else {
            None
        }
    }

    /// Resolve the pointer, check the width and rebuild if the window is dirty.
    ///
    /// Bypasses the throttle.
    ///
    /// # Errors
    ///
    /// [`ContentError::Destroyed`] after `destroy`; otherwise rebuild failures.
    pub fn update(&mut self) -> Result<UpdateOutcome, ContentError> {
        self.ensure_live()?;

        let effective =
            pointer::effective_scroll(self.backend.scroll_position(), self.backend.surface_offset());
        let next = pointer::resolve(&self.geometry, effective);
        let width_changed = self.check_width();

        let previous = self.window.pointer;
        let rebuild = self.attached && self.window.needs_update(previous, next, self.chunks.len());
        self.window.pointer = next;

        debug!(
            instance = %self.id,
            effective_scroll = effective,
            previous,
            pointer = next,
            rebuild,
            "Update"
        );

        if rebuild {
            self.rebuild(next)?;
        }

        Ok(UpdateOutcome {
            pointer: next,
            width_changed,
            rebuilt: rebuild,
        })
    }

    /// Compare the container width with the last stored width.
    ///
    /// On change the new width is stored and `true` returned. Recorded geometry is
    /// kept as-is: first measurements stay authoritative.
    pub fn check_width(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        let width = self.backend.width();
        if width == self.window.last_known_width {
            return false;
        }
        debug!(
            instance = %self.id,
            from = self.window.last_known_width,
            to = width,
            "Container width changed"
        );
        self.window.last_known_width = width;
        true
    }

    /// Stop listening, deregister from the tracker, detach and release cached state.
    ///
    /// Idempotent. Returns the instance for chaining.
    pub fn destroy(&mut self) -> &mut Self {
        if self.destroyed {
            return self;
        }

        self.backend.set_listening(false);
        self.throttle.reset();
        tracker::deregister(self.id);
        if self.attached {
            self.backend.clear();
            self.backend.detach();
        }

        self.attached = false;
        self.destroyed = true;
        self.chunks = ChunkSequence::default();
        self.geometry.reset(0);
        self.window.reset();

        info!(instance = %self.id, "Instance destroyed");
        self
    }

    /// Materialize the window for `pointer` with scroll listening suspended.
    ///
    /// Listening is resumed whether or not the materializer succeeds.
    fn rebuild(&mut self, pointer: usize) -> Result<(), ContentError> {
        let plan = self.window.plan(pointer, self.chunks.len(), &self.geometry)?;

        self.backend.set_listening(false);
        let saved_scroll = self.backend.scroll_position();

        let result = Materializer {
            backend: &mut self.backend,
            chunks: &self.chunks,
            geometry: &mut self.geometry,
            visible: &mut self.window.visible,
            content_type: self.content_type,
            pre_processor: self.config.chunk_pre_processor.as_ref(),
        }
        .execute(plan);

        self.backend.focus();
        if self.window.mode == WindowMode::Replace {
            self.backend.set_scroll_position(saved_scroll);
        }
        self.backend.set_listening(true);

        if let Err(err) = &result {
            warn!(instance = %self.id, error = %err, "Rebuild failed");
        }
        result
    }

    fn is_live(&self) -> bool {
        self.attached && !self.destroyed
    }

    fn ensure_live(&self) -> Result<(), ContentError> {
        if self.destroyed {
            Err(ContentError::Destroyed(self.id))
        } else {
            Ok(())
        }
    }
}

impl<B: Backend> Tracked for VirtualContent<B> {
    fn instance_id(&self) -> InstanceId {
        self.id
    }

    fn check_width(&mut self) -> bool {
        VirtualContent::check_width(self)
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
