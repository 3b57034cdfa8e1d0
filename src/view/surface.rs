//! In-memory terminal surface implementing the engine's [`Backend`].
//!
//! The surface is its own scrollable. Units are terminal rows: a chunk is as tall
//! as its wrapped line count, a filler of height `h` is `h` blank rows, and the
//! scroll position is the index of the first row shown.

use crate::engine::Backend;
use crate::model::ContentType;
use crate::view::markup;
use crate::view_state::Measurement;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

/// Columns a tab expands to.
const TAB_WIDTH: usize = 4;

/// Errors raised by [`TerminalSurface`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The container has no columns to wrap into.
    #[error("Container has zero width")]
    ZeroWidth,

    /// A chunk was pushed while no container was attached.
    #[error("Surface is not attached")]
    Detached,
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Filler(usize),
    Chunk { index: usize, lines: Vec<String> },
}

impl Block {
    fn rows(&self) -> usize {
        match self {
            Block::Filler(rows) => *rows,
            Block::Chunk { lines, .. } => lines.len(),
        }
    }
}

/// Rows materialized by the engine plus a viewport over them.
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    area: Option<Rect>,
    blocks: Vec<Block>,
    total_rows: usize,
    scroll_top: usize,
    listening: bool,
    open_row: Option<usize>,
}

impl TerminalSurface {
    /// Create a detached, empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Container the surface is attached to.
    pub fn area(&self) -> Option<Rect> {
        self.area
    }

    /// Move to a new container (terminal resize). Ignored while detached.
    pub fn resize(&mut self, area: Rect) {
        if self.area.is_some() {
            self.area = Some(area);
            self.scroll_top = self.scroll_top.min(self.max_scroll());
        }
    }

    /// Total rows, fillers included.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Rows visible at once.
    pub fn viewport_rows(&self) -> usize {
        self.area.map_or(0, |area| usize::from(area.height))
    }

    /// First visible row.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Largest valid scroll position.
    pub fn max_scroll(&self) -> usize {
        self.total_rows.saturating_sub(self.viewport_rows())
    }

    /// Whether scroll notifications should be forwarded to the engine.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Scroll by `delta` rows, clamped. Returns whether the position moved.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let target = self.scroll_top.saturating_add_signed(delta);
        self.scroll_to(target)
    }

    /// Scroll to `row`, clamped. Returns whether the position moved.
    pub fn scroll_to(&mut self, row: usize) -> bool {
        let target = row.min(self.max_scroll());
        let moved = target != self.scroll_top;
        self.scroll_top = target;
        moved
    }

    /// Indexes of the materialized chunks, in surface order.
    pub fn chunk_indexes(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Chunk { index, .. } => Some(*index),
                Block::Filler(_) => None,
            })
            .collect()
    }

    /// Last row on the surface, if it belongs to a chunk.
    fn last_row_mut(&mut self) -> Option<&mut String> {
        for block in self.blocks.iter_mut().rev() {
            match block {
                Block::Filler(_) => return None,
                Block::Chunk { lines, .. } if !lines.is_empty() => return lines.last_mut(),
                Block::Chunk { .. } => {}
            }
        }
        None
    }

    /// The rows currently inside the viewport. Filler rows are empty strings.
    pub fn visible_lines(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.viewport_rows());
        let mut skip = self.scroll_top;
        let mut remaining = self.viewport_rows();

        for block in &self.blocks {
            if remaining == 0 {
                break;
            }
            let rows = block.rows();
            if skip >= rows {
                skip -= rows;
                continue;
            }
            let take = (rows - skip).min(remaining);
            match block {
                Block::Filler(_) => out.extend(std::iter::repeat("").take(take)),
                Block::Chunk { lines, .. } => {
                    out.extend(lines[skip..skip + take].iter().map(String::as_str));
                }
            }
            remaining -= take;
            skip = 0;
        }
        out
    }
}

impl Backend for TerminalSurface {
    type Container = Rect;
    type Error = SurfaceError;

    fn attach(&mut self, container: Rect) -> Result<(), SurfaceError> {
        if container.width == 0 {
            return Err(SurfaceError::ZeroWidth);
        }
        self.area = Some(container);
        Ok(())
    }

    fn detach(&mut self) {
        self.area = None;
    }

    fn clear(&mut self) {
        self.blocks.clear();
        self.total_rows = 0;
        self.open_row = None;
    }

    fn push_filler(&mut self, height: f64) {
        let rows = height.max(0.0).round() as usize;
        self.total_rows += rows;
        self.open_row = None;
        self.blocks.push(Block::Filler(rows));
    }

    fn push_chunk(
        &mut self,
        index: usize,
        content: &str,
        content_type: ContentType,
    ) -> Result<Measurement, SurfaceError> {
        let area = self.area.ok_or(SurfaceError::Detached)?;
        let text = match content_type {
            ContentType::Html => markup::to_plain(content),
            ContentType::Text => content.to_string(),
        };
        let wrapped = wrap_after(&text, usize::from(area.width), self.open_row);

        // A chunk that continues an open row starts on that row.
        let continues = self.open_row.is_some() && !text.is_empty();
        if continues {
            if let Some(last) = self.last_row_mut() {
                last.push_str(&wrapped.carried);
            }
        }
        let first_row = if continues {
            self.total_rows.saturating_sub(1)
        } else {
            self.total_rows
        };
        let measurement = Measurement::new(wrapped.rows.len() as f64, first_row as f64, 0.0);

        self.total_rows += wrapped.rows.len();
        self.open_row = wrapped.open;
        self.blocks.push(Block::Chunk {
            index,
            lines: wrapped.rows,
        });
        Ok(measurement)
    }

    fn scroll_position(&self) -> f64 {
        self.scroll_top as f64
    }

    fn set_scroll_position(&mut self, position: f64) {
        self.scroll_to(position.max(0.0).round() as usize);
    }

    fn width(&self) -> f64 {
        self.area.map_or(0.0, |area| f64::from(area.width))
    }

    fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }
}

impl Widget for &TerminalSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row, line) in self.visible_lines().into_iter().enumerate() {
            if row >= usize::from(area.height) {
                break;
            }
            buf.set_stringn(
                area.x,
                area.y + row as u16,
                line,
                usize::from(area.width),
                Style::default(),
            );
        }
    }
}

/// Hard-wrap `text` to `width` display columns.
///
/// Each `\n`-separated line wraps independently; an empty line is one blank row.
/// Empty text has no rows.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    wrap_after(text, width, None).rows
}

/// Result of wrapping one chunk after whatever is already on the surface.
#[derive(Debug, Default, PartialEq)]
struct Wrapped {
    /// Text appended to the previous open row.
    carried: String,
    /// Rows started by this text.
    rows: Vec<String>,
    /// Columns used in the last row if it was left open (no trailing newline).
    open: Option<usize>,
}

#[derive(Clone, Copy, PartialEq)]
enum Target {
    Carry,
    Row,
    Closed,
}

/// Wrap `text`, continuing an open row of `carry` columns when given.
fn wrap_after(text: &str, width: usize, carry: Option<usize>) -> Wrapped {
    if text.is_empty() {
        return Wrapped {
            open: carry,
            ..Wrapped::default()
        };
    }

    let width = width.max(1);
    let mut out = Wrapped::default();
    let mut row = String::new();
    let mut used = carry.unwrap_or(0);
    let mut target = if carry.is_some() { Target::Carry } else { Target::Closed };

    fn finish(target: Target, row: &mut String, out: &mut Wrapped) {
        match target {
            Target::Carry => out.carried = std::mem::take(row),
            Target::Row | Target::Closed => out.rows.push(std::mem::take(row)),
        }
    }

    for ch in text.chars() {
        let (glyph, cols, count) = match ch {
            '\n' => {
                finish(target, &mut row, &mut out);
                target = Target::Closed;
                used = 0;
                continue;
            }
            '\t' => (' ', 1, TAB_WIDTH),
            '\r' => continue,
            other => (other, other.width().unwrap_or(0), 1),
        };
        for _ in 0..count {
            if target != Target::Closed && used + cols > width && used > 0 {
                finish(target, &mut row, &mut out);
                target = Target::Closed;
                used = 0;
            }
            if target == Target::Closed {
                target = Target::Row;
            }
            row.push(glyph);
            used += cols;
        }
    }

    if target != Target::Closed {
        finish(target, &mut row, &mut out);
        out.open = Some(used);
    }
    out
}
