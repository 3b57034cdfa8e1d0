//! GeometryCache - write-once chunk measurements with O(log n) prefix sums
//!
//! Stores the first measured height, offset and left indent of every chunk that has
//! been materialized. Heights feed a Fenwick tree so the filler sizes above and below
//! a window are cheap to compute; recorded offsets are kept sorted for pointer
//! resolution by binary search.
//!
//! Unmeasured chunks count as zero height. Filler sizes are therefore an
//! approximation until every chunk has been visited.
//!
//! # Complexity
//!
//! - `record`: O(log n) (plus O(m) insertion into the sorted offset list)
//! - `cumulative_offset_before`: O(log n)
//! - `cumulative_height_from`: O(log n)
//! - `height` / `offset` / `left_indent`: O(1)
//! - `reset`: O(n)

use crate::model::GeometryError;

/// One measurement reported by the backend for a materialized chunk.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Rendered height of the chunk.
    pub height: f64,
    /// Distance from the top of the render surface to the top of the chunk.
    pub offset_from_top: f64,
    /// Horizontal indent of the chunk within the render surface.
    pub left_indent: f64,
}

impl Measurement {
    /// Create a measurement.
    pub fn new(height: f64, offset_from_top: f64, left_indent: f64) -> Self {
        Self {
            height,
            offset_from_top,
            left_indent,
        }
    }
}

/// Sparse, write-once geometry for a chunk sequence of fixed length.
///
/// The first value recorded for each field of an index is authoritative; later
/// measurements of the same index are ignored.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    /// Fenwick tree over heights (0-indexed API, 1-indexed internally by `fenwick`).
    tree: Vec<f64>,
    heights: Vec<Option<f64>>,
    offsets: Vec<Option<f64>>,
    left_indents: Vec<Option<f64>>,
    /// `(index, offset)` pairs sorted by index.
    recorded_offsets: Vec<(usize, f64)>,
}

impl GeometryCache {
    /// Creates an empty cache for `len` chunks.
    ///
    /// # Examples
    ///
    /// ```
    /// # use virtual_content::view_state::geometry::GeometryCache;
    /// let cache = GeometryCache::new(3);
    /// assert_eq!(cache.len(), 3);
    /// assert_eq!(cache.height(0), 0.0);
    /// assert_eq!(cache.total_height(), 0.0);
    /// ```
    pub fn new(len: usize) -> Self {
        Self {
            tree: vec![0.0; len],
            heights: vec![None; len],
            offsets: vec![None; len],
            left_indents: vec![None; len],
            recorded_offsets: Vec::new(),
        }
    }

    /// Drops every measurement and resizes the cache for `len` chunks.
    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    /// Number of chunks the cache covers.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns true if the cache covers no chunks.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Stores `measurement` for `index`, field by field, unless already stored.
    ///
    /// Returns `true` if any field was newly stored.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use virtual_content::view_state::geometry::{GeometryCache, Measurement};
    /// let mut cache = GeometryCache::new(2);
    /// assert!(cache.record(0, Measurement::new(10.0, 0.0, 4.0)).unwrap());
    /// assert!(!cache.record(0, Measurement::new(99.0, 5.0, 0.0)).unwrap());
    /// assert_eq!(cache.height(0), 10.0);
    /// assert_eq!(cache.left_indent(0), 4.0);
    /// ```
    pub fn record(&mut self, index: usize, measurement: Measurement) -> Result<bool, GeometryError> {
        self.check_index(index)?;
        let mut stored = false;

        if self.heights[index].is_none() {
            self.heights[index] = Some(measurement.height);
            if measurement.height != 0.0 {
                fenwick::array::update(&mut self.tree, index, measurement.height);
            }
            stored = true;
        }

        if self.offsets[index].is_none() {
            self.offsets[index] = Some(measurement.offset_from_top);
            let pos = self.recorded_offsets.partition_point(|&(i, _)| i < index);
            self.recorded_offsets
                .insert(pos, (index, measurement.offset_from_top));
            stored = true;
        }

        if self.left_indents[index].is_none() {
            self.left_indents[index] = Some(measurement.left_indent);
            stored = true;
        }

        Ok(stored)
    }

    /// Whether a height has been recorded for `index`.
    pub fn is_measured(&self, index: usize) -> bool {
        self.heights.get(index).is_some_and(Option::is_some)
    }

    /// Recorded height of `index`, or `0.0`.
    pub fn height(&self, index: usize) -> f64 {
        self.heights.get(index).copied().flatten().unwrap_or(0.0)
    }

    /// Recorded offset from top of `index`, or `0.0`.
    pub fn offset(&self, index: usize) -> f64 {
        self.offsets.get(index).copied().flatten().unwrap_or(0.0)
    }

    /// Recorded left indent of `index`, or `0.0`.
    pub fn left_indent(&self, index: usize) -> f64 {
        self.left_indents.get(index).copied().flatten().unwrap_or(0.0)
    }

    /// Recorded `(index, offset)` pairs in ascending index order.
    pub fn recorded_offsets(&self) -> &[(usize, f64)] {
        &self.recorded_offsets
    }

    /// Sum of heights of chunks `[0, index)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index > len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use virtual_content::view_state::geometry::{GeometryCache, Measurement};
    /// let mut cache = GeometryCache::new(4);
    /// cache.record(0, Measurement::new(3.0, 0.0, 0.0)).unwrap();
    /// cache.record(2, Measurement::new(5.0, 3.0, 0.0)).unwrap();
    /// assert_eq!(cache.cumulative_offset_before(0).unwrap(), 0.0);
    /// assert_eq!(cache.cumulative_offset_before(2).unwrap(), 3.0);
    /// assert_eq!(cache.cumulative_offset_before(4).unwrap(), 8.0);
    /// assert!(cache.cumulative_offset_before(5).is_err());
    /// ```
    pub fn cumulative_offset_before(&self, index: usize) -> Result<f64, GeometryError> {
        if index > self.len() {
            return Err(GeometryError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        if index == 0 {
            return Ok(0.0);
        }
        Ok(fenwick::array::prefix_sum(&self.tree, index - 1).max(0.0))
    }

    /// Sum of heights of chunks `[index, len)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index > len()`.
    pub fn cumulative_height_from(&self, index: usize) -> Result<f64, GeometryError> {
        let before = self.cumulative_offset_before(index)?;
        Ok((self.total_height() - before).max(0.0))
    }

    /// Sum of every recorded height.
    pub fn total_height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            fenwick::array::prefix_sum(&self.tree, self.len() - 1).max(0.0)
        }
    }

    fn check_index(&self, index: usize) -> Result<(), GeometryError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(GeometryError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
}
