//! Window policies: which chunks must be materialized for a given pointer.
//!
//! Two mutually exclusive modes:
//!
//! - [`WindowMode::Replace`]: a bounded sliding window of `2 * threshold` chunks around
//!   the pointer. Every qualifying update clears the surface and rebuilds the window
//!   between a top and a bottom filler.
//! - [`WindowMode::Append`]: a window that only grows. Chunks up to
//!   `pointer + threshold` are appended after the last visible one and never evicted.
//!
//! Range and dirty-check functions are pure: the same inputs always produce the same
//! answer.

use super::geometry::GeometryCache;
use super::range::ChunkRange;
use crate::model::GeometryError;
use std::collections::BTreeSet;

/// Default threshold radius.
pub const DEFAULT_THRESHOLD: usize = 2;

/// Windowing policy of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// Bounded sliding window rebuilt on every qualifying update.
    #[default]
    Replace,
    /// Monotonically growing window; chunks are never removed.
    Append,
}

impl WindowMode {
    /// `Append` when `append` is set, `Replace` otherwise.
    pub fn from_append(append: bool) -> Self {
        if append {
            WindowMode::Append
        } else {
            WindowMode::Replace
        }
    }
}

/// Replace-mode window around `pointer`.
///
/// The candidate `[pointer - threshold, pointer + threshold)` is shifted rather than
/// truncated at the edges: underflow below 0 extends the end, overflow past `len`
/// pulls the start back. The result spans `min(2 * threshold, len)` chunks.
///
/// # Examples
///
/// ```
/// use virtual_content::view_state::window::replace_range;
/// use virtual_content::view_state::range::ChunkRange;
///
/// assert_eq!(replace_range(0, 2, 10), ChunkRange::new(0, 4));
/// assert_eq!(replace_range(5, 2, 10), ChunkRange::new(3, 7));
/// assert_eq!(replace_range(9, 2, 10), ChunkRange::new(6, 10));
/// assert_eq!(replace_range(1, 2, 3), ChunkRange::new(0, 3));
/// ```
pub fn replace_range(pointer: usize, threshold: usize, len: usize) -> ChunkRange {
    let span = threshold.saturating_mul(2).min(len);
    let start = pointer.saturating_sub(threshold).min(len - span);
    ChunkRange::new(start, start + span)
}

/// Append-mode indexes that must be visible for `pointer`: `[pointer, pointer + threshold)`
/// clamped to `len`.
pub fn append_range(pointer: usize, threshold: usize, len: usize) -> ChunkRange {
    let end = pointer.saturating_add(threshold).min(len);
    ChunkRange::new(pointer.min(end), end)
}

/// What the materializer has to do to bring the surface in line with a pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowPlan {
    /// Clear the surface and build `range` between two fillers.
    Rebuild {
        /// Chunks to materialize.
        range: ChunkRange,
        /// Height standing in for chunks `[0, range.start)`.
        top_filler: f64,
        /// Height standing in for chunks `[range.end, len)`.
        bottom_filler: f64,
    },
    /// Append `range` after the currently visible chunks.
    Append {
        /// Chunks to materialize.
        range: ChunkRange,
    },
}

/// Windowing state of one instance.
///
/// `visible` is the single source of truth for which chunks are materialized; the
/// dirty-check compares against it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    /// Active policy.
    pub mode: WindowMode,
    /// Chunk index at (or just above) the current scroll position.
    pub pointer: usize,
    /// Number of chunks kept on each side of the pointer.
    pub threshold: usize,
    /// Chunk indexes currently materialized.
    pub visible: BTreeSet<usize>,
    /// Container width observed at the last width check.
    pub last_known_width: f64,
}

impl WindowState {
    /// Create an empty window.
    pub fn new(mode: WindowMode, threshold: usize) -> Self {
        Self {
            mode,
            pointer: 0,
            threshold,
            visible: BTreeSet::new(),
            last_known_width: 0.0,
        }
    }

    /// Forget the pointer and the visible set (new content).
    pub fn reset(&mut self) {
        self.pointer = 0;
        self.visible.clear();
    }

    /// Highest materialized index.
    pub fn last_visible(&self) -> Option<usize> {
        self.visible.last().copied()
    }

    /// Indexes the active policy requires for `pointer`.
    pub fn target(&self, pointer: usize, len: usize) -> ChunkRange {
        match self.mode {
            WindowMode::Replace => replace_range(pointer, self.threshold, len),
            WindowMode::Append => append_range(pointer, self.threshold, len),
        }
    }

    /// Whether moving the pointer from `previous` to `next` requires materialization.
    ///
    /// - Replace: the windows for the two pointers differ, or the visible set is not
    ///   exactly the window for `next` (e.g. right after a content reset).
    /// - Append: some index in `[next, next + threshold)` is not visible yet.
    pub fn needs_update(&self, previous: usize, next: usize, len: usize) -> bool {
        match self.mode {
            WindowMode::Replace => {
                let next_range = replace_range(next, self.threshold, len);
                replace_range(previous, self.threshold, len) != next_range
                    || !self.visible.iter().copied().eq(next_range.indices())
            }
            WindowMode::Append => append_range(next, self.threshold, len)
                .indices()
                .any(|index| !self.visible.contains(&index)),
        }
    }

    /// Work needed to materialize the window for `pointer`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `len` exceeds the geometry cache.
    pub fn plan(
        &self,
        pointer: usize,
        len: usize,
        geometry: &GeometryCache,
    ) -> Result<WindowPlan, GeometryError> {
        match self.mode {
            WindowMode::Replace => {
                let range = replace_range(pointer, self.threshold, len);
                Ok(WindowPlan::Rebuild {
                    range,
                    top_filler: geometry.cumulative_offset_before(range.start)?,
                    bottom_filler: geometry.cumulative_height_from(range.end)?,
                })
            }
            WindowMode::Append => {
                let end = pointer.saturating_add(self.threshold).min(len);
                let start = self.last_visible().map_or(0, |last| last + 1).min(end);
                Ok(WindowPlan::Append {
                    range: ChunkRange::new(start, end),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::geometry::Measurement;
    use proptest::prelude::*;

    fn replace_state(threshold: usize, visible: &[usize]) -> WindowState {
        let mut state = WindowState::new(WindowMode::Replace, threshold);
        state.visible.extend(visible.iter().copied());
        state
    }

    fn append_state(threshold: usize, visible: &[usize]) -> WindowState {
        let mut state = WindowState::new(WindowMode::Append, threshold);
        state.visible.extend(visible.iter().copied());
        state
    }

    mod replace {
        use super::*;

        #[test]
        fn pointer_at_start_is_compensated() {
            assert_eq!(replace_range(0, 2, 10), ChunkRange::new(0, 4));
        }

        #[test]
        fn pointer_at_end_is_compensated() {
            assert_eq!(replace_range(9, 2, 10), ChunkRange::new(6, 10));
        }

        #[test]
        fn window_larger_than_content_covers_everything() {
            assert_eq!(replace_range(0, 5, 3), ChunkRange::new(0, 3));
            assert_eq!(replace_range(2, 5, 3), ChunkRange::new(0, 3));
        }

        #[test]
        fn single_chunk_content() {
            assert_eq!(replace_range(0, 2, 1), ChunkRange::new(0, 1));
        }

        #[test]
        fn same_window_needs_no_update() {
            let state = replace_state(2, &[0, 1, 2, 3]);
            // Pointers 0, 1 and 2 all resolve to [0, 4).
            assert!(!state.needs_update(0, 2, 10));
        }

        #[test]
        fn moved_window_needs_update() {
            let state = replace_state(2, &[0, 1, 2, 3]);
            assert!(state.needs_update(2, 3, 10));
        }

        #[test]
        fn empty_visible_set_needs_update_even_with_same_pointer() {
            let state = replace_state(2, &[]);
            assert!(state.needs_update(0, 0, 10));
        }

        #[test]
        fn plan_sizes_fillers_from_geometry() {
            let mut geometry = GeometryCache::new(10);
            for i in 0..10 {
                geometry
                    .record(i, Measurement::new(10.0, i as f64 * 10.0, 0.0))
                    .unwrap();
            }
            let state = replace_state(2, &[]);

            let plan = state.plan(5, 10, &geometry).unwrap();
            assert_eq!(
                plan,
                WindowPlan::Rebuild {
                    range: ChunkRange::new(3, 7),
                    top_filler: 30.0,
                    bottom_filler: 30.0,
                }
            );
        }

        #[test]
        fn plan_with_unmeasured_geometry_has_zero_fillers() {
            let geometry = GeometryCache::new(1);
            let state = replace_state(2, &[]);
            assert_eq!(
                state.plan(0, 1, &geometry).unwrap(),
                WindowPlan::Rebuild {
                    range: ChunkRange::new(0, 1),
                    top_filler: 0.0,
                    bottom_filler: 0.0,
                }
            );
        }

        #[test]
        fn plan_beyond_geometry_fails() {
            let geometry = GeometryCache::new(2);
            let state = replace_state(2, &[]);
            assert!(state.plan(0, 10, &geometry).is_err());
        }
    }

    mod append {
        use super::*;

        #[test]
        fn visible_prefix_covering_window_needs_no_update() {
            let state = append_state(2, &[0, 1, 2]);
            assert!(!state.needs_update(0, 1, 10));
        }

        #[test]
        fn missing_next_index_needs_update() {
            let state = append_state(2, &[0, 1, 2]);
            assert!(state.needs_update(1, 2, 10));
        }

        #[test]
        fn window_clamped_at_end_needs_no_update() {
            let state = append_state(2, &[0, 1, 2]);
            assert!(!state.needs_update(1, 2, 3));
        }

        #[test]
        fn plan_appends_after_last_visible() {
            let state = append_state(2, &[0, 1, 2]);
            let geometry = GeometryCache::new(10);
            assert_eq!(
                state.plan(3, 10, &geometry).unwrap(),
                WindowPlan::Append {
                    range: ChunkRange::new(3, 5)
                }
            );
        }

        #[test]
        fn plan_from_empty_starts_at_zero() {
            let state = append_state(2, &[]);
            let geometry = GeometryCache::new(10);
            assert_eq!(
                state.plan(0, 10, &geometry).unwrap(),
                WindowPlan::Append {
                    range: ChunkRange::new(0, 2)
                }
            );
        }

        #[test]
        fn plan_after_scrolling_back_is_empty() {
            let state = append_state(2, &[0, 1, 2, 3, 4, 5]);
            let geometry = GeometryCache::new(10);
            let WindowPlan::Append { range } = state.plan(1, 10, &geometry).unwrap() else {
                panic!("append mode must plan an append");
            };
            assert!(range.is_empty());
        }
    }

    #[test]
    fn reset_clears_pointer_and_visible() {
        let mut state = replace_state(2, &[3, 4]);
        state.pointer = 4;
        state.last_known_width = 80.0;
        state.reset();

        assert_eq!(state.pointer, 0);
        assert!(state.visible.is_empty());
        assert_eq!(state.last_known_width, 80.0);
    }

    #[test]
    fn huge_threshold_covers_everything() {
        assert_eq!(replace_range(0, usize::MAX, 10), ChunkRange::new(0, 10));
        assert_eq!(replace_range(9, usize::MAX, 10), ChunkRange::new(0, 10));
        assert_eq!(replace_range(0, 1 << 62, 10), ChunkRange::new(0, 10));
        assert_eq!(append_range(3, usize::MAX, 10), ChunkRange::new(3, 10));
    }

    #[test]
    fn empty_len_is_empty_window() {
        assert_eq!(replace_range(0, 2, 0), ChunkRange::new(0, 0));
    }

    #[test]
    fn mode_from_append_flag() {
        assert_eq!(WindowMode::from_append(true), WindowMode::Append);
        assert_eq!(WindowMode::from_append(false), WindowMode::Replace);
        assert_eq!(WindowMode::default(), WindowMode::Replace);
    }

    proptest! {
        /// Replace windows span min(2t, n) chunks and stay in bounds.
        #[test]
        fn prop_replace_range_span(
            len in 1usize..200,
            threshold in prop_oneof![1usize..20, Just(1usize << 62), Just(usize::MAX / 2 + 1), Just(usize::MAX)],
            pointer_seed in 0usize..1000
        ) {
            let pointer = pointer_seed % len;
            let range = replace_range(pointer, threshold, len);
            prop_assert!(range.end <= len);
            prop_assert!(range.start <= range.end);
            prop_assert_eq!(range.len(), threshold.saturating_mul(2).min(len));
        }

        /// The dirty-check is a pure function of its inputs.
        #[test]
        fn prop_needs_update_idempotent(
            len in 1usize..100,
            threshold in 1usize..10,
            previous_seed in 0usize..1000,
            next_seed in 0usize..1000,
            append in any::<bool>(),
            visible in prop::collection::btree_set(0usize..100, 0..20)
        ) {
            let mut state = WindowState::new(WindowMode::from_append(append), threshold);
            state.visible = visible;
            let previous = previous_seed % len;
            let next = next_seed % len;

            let first = state.needs_update(previous, next, len);
            let second = state.needs_update(previous, next, len);
            prop_assert_eq!(first, second);
        }
    }
}
