//! Virtual Content
//!
//! Chunked, windowed rendering of very large text and markup bodies. Content is
//! split into chunks, and only the chunks around the current scroll position are
//! materialized on the render surface; the rest is stood in for by fillers sized
//! from measurements recorded the first time each chunk was rendered.
//!
//! Pure core (`chunk`, `model`, `view_state`), engine (`engine`) and impure shell
//! (`view`, `config`, `logging`).

pub mod chunk;
pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod view;
pub mod view_state;

#[cfg(test)]
mod test_harness;
