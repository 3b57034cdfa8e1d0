//! Pager actions, independent of the keys that trigger them.

/// What the user asked the pager to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// One row down. Default: j/↓, wheel down
    ScrollDown,
    /// One row up. Default: k/↑, wheel up
    ScrollUp,
    /// One viewport down. Default: PgDn/Space/Ctrl+d
    PageDown,
    /// One viewport up. Default: PgUp/Ctrl+u
    PageUp,
    /// First row. Default: g/Home
    ScrollToTop,
    /// Last row. Default: G/End
    ScrollToBottom,
    /// Leave the pager. Default: q/Esc/Ctrl+c
    Quit,
}

impl KeyAction {
    /// Whether the action moves the viewport.
    pub fn is_scroll(self) -> bool {
        !matches!(self, KeyAction::Quit)
    }
}
