//! Error types for the virtual content engine.
//!
//! This module defines the error taxonomy using `thiserror`. Every failure is local and
//! synchronous: it is returned to the immediate caller and never retried internally.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the `vcontent` binary
//!   - [`ContentError`] - Instance operations (content validation, attachment, rebuilds)
//!     - [`GeometryError`] - Cumulative geometry lookups beyond the known chunk count
//!   - [`TrackerError`] - Instance tracker registration failures
//!   - [`ConfigError`](crate::config::ConfigError) - Config file read/parse failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing subscriber setup failures
//!   - `std::io::Error` - Terminal and input failures
//!
//! # Rebuild Failures
//!
//! A backend failure in the middle of a rebuild leaves the render surface in whatever
//! partial state it reached. The engine still resumes scroll listening before returning
//! [`ContentError::Backend`], so the instance keeps receiving notifications.

use crate::engine::InstanceId;
use thiserror::Error;

/// Boxed error produced by a [`Backend`](crate::engine::Backend) implementation.
pub type BackendFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for the `vcontent` binary.
///
/// Library callers deal with the specific error types; the binary funnels them all
/// through this enum so `main` can report a single failure.
#[derive(Debug, Error)]
pub enum AppError {
    /// An instance operation failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Registering with the instance tracker failed.
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// The configuration file could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or input I/O failed.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors returned by [`VirtualContent`](crate::engine::VirtualContent) operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Content passed to `set_text`/`set_html` is neither a string nor a finite number.
    ///
    /// The previous content is left in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use virtual_content::model::error::ContentError;
    ///
    /// let err = ContentError::InvalidContent { value: f64::NAN };
    /// assert!(err.to_string().contains("finite"));
    /// ```
    #[error("Content must be a string or a finite number (got {value})")]
    InvalidContent {
        /// The rejected numeric value.
        value: f64,
    },

    /// `render_to` was called without a container.
    ///
    /// No attachment is attempted.
    #[error("A container is required to render into")]
    MissingContainer,

    /// The configured chunk size is zero.
    #[error("Chunk size must be a positive integer")]
    InvalidChunkSize,

    /// The configured threshold radius is zero.
    #[error("Threshold must be a positive integer")]
    InvalidThreshold,

    /// The instance was destroyed and can no longer be used.
    #[error("Instance {0} has been destroyed")]
    Destroyed(InstanceId),

    /// A geometry lookup failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The backend failed while materializing chunks.
    #[error("Backend failure: {0}")]
    Backend(#[source] BackendFailure),
}

/// Errors returned by [`GeometryCache`](crate::view_state::geometry::GeometryCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The requested index lies beyond the current chunk count.
    ///
    /// # Examples
    ///
    /// ```
    /// use virtual_content::model::error::GeometryError;
    ///
    /// let err = GeometryError::IndexOutOfRange { index: 12, len: 10 };
    /// assert!(err.to_string().contains("12"));
    /// ```
    #[error("Chunk index {index} out of range (len: {len})")]
    IndexOutOfRange {
        /// The index that was asked for.
        index: usize,
        /// The number of chunks the cache knows about.
        len: usize,
    },
}

/// Errors returned by the [instance tracker](crate::engine::tracker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The instance is already registered; the existing registration is kept.
    #[error("Instance {0} is already registered with the tracker")]
    AlreadyRegistered(InstanceId),
}
