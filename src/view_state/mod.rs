//! View-state layer - geometry, pointer resolution and windowing
//!
//! Pure data structures and functions that decide which chunks belong on the render
//! surface. Nothing in here talks to a backend.
//!
//! # Module Structure
//!
//! - `geometry`: GeometryCache - write-once measurements with Fenwick prefix sums
//! - `pointer`: scroll position → chunk index resolution
//! - `range`: ChunkRange - half-open chunk index range
//! - `window`: WindowState / WindowMode - replace and append policies

pub mod geometry;
pub mod pointer;
pub mod range;
pub mod window;

pub use geometry::{GeometryCache, Measurement};
pub use range::ChunkRange;
pub use window::{WindowMode, WindowPlan, WindowState};
