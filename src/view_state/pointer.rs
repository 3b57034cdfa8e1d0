//! Pointer resolution: scroll position → chunk index at the top of the viewport.

use super::geometry::GeometryCache;

/// Scroll position of the tracked scrollable, expressed relative to the render surface.
///
/// The scrollable may be an ancestor of the render surface, in which case
/// `surface_offset` is the static distance between the two.
pub fn effective_scroll(raw_scroll: f64, surface_offset: f64) -> f64 {
    raw_scroll - surface_offset
}

/// Greatest chunk index whose recorded offset is `<= effective_scroll`.
///
/// Recorded offsets are monotonic in index, so this is a binary search. Returns `0`
/// when nothing recorded lies at or above the position (including when nothing is
/// recorded yet). When every chunk has been measured and the position lies past the
/// last offset, the result is the last chunk index.
///
/// Unmeasured chunks never win: with sparse measurements the fallback is the greatest
/// *recorded* index, not the last chunk of the sequence.
///
/// # Examples
///
/// ```
/// # use virtual_content::view_state::geometry::{GeometryCache, Measurement};
/// # use virtual_content::view_state::pointer::resolve;
/// let mut cache = GeometryCache::new(3);
/// cache.record(0, Measurement::new(10.0, 0.0, 0.0)).unwrap();
/// cache.record(1, Measurement::new(10.0, 10.0, 0.0)).unwrap();
/// cache.record(2, Measurement::new(10.0, 20.0, 0.0)).unwrap();
///
/// assert_eq!(resolve(&cache, 0.0), 0);
/// assert_eq!(resolve(&cache, 15.0), 1);
/// assert_eq!(resolve(&cache, 20.0), 2);
/// assert_eq!(resolve(&cache, 500.0), 2);
/// ```
pub fn resolve(geometry: &GeometryCache, effective_scroll: f64) -> usize {
    let recorded = geometry.recorded_offsets();
    let below = recorded.partition_point(|&(_, offset)| offset <= effective_scroll);
    let index = match below {
        0 => 0,
        n => recorded[n - 1].0,
    };
    index.min(geometry.len().saturating_sub(1))
}
