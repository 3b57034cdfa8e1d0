//! Virtual content engine.
//!
//! Ties the pure pieces (`chunk`, `view_state`) to a render surface:
//!
//! - [`Backend`] - boundary trait for the surface and its scrollable
//! - [`VirtualContent`] - one instance: content, window, geometry, throttle
//! - [`Throttle`] - leading + trailing scroll throttle
//! - [`tracker`] - thread-local periodic width checks

pub mod backend;
pub mod instance;
pub(crate) mod materializer;
pub mod options;
pub mod scheduler;
pub mod tracker;

pub use backend::Backend;
pub use instance::{InstanceId, VirtualContent};
pub use options::{ChunkPreProcessor, ContentConfig};
pub use scheduler::{Throttle, UpdateOutcome, DEFAULT_SCROLL_THROTTLE};
pub use tracker::{Tracked, Tracker};
