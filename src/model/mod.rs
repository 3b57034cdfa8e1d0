//! Domain model types (pure).
//!
//! Content values, content types, pager actions and the error taxonomy.

pub mod content;
pub mod error;
pub mod key_action;

// Re-export for convenience
pub use content::{ContentType, ContentValue};
pub use error::{AppError, BackendFailure, ContentError, GeometryError, TrackerError};
pub use key_action::KeyAction;
