//! Terminal pager (impure shell).
//!
//! [`TuiApp`] owns one [`VirtualContent`] rendered into a [`TerminalSurface`] and
//! drives it from the crossterm event loop: scroll input goes to
//! [`VirtualContent::on_scroll`], and the loop wakes up for throttle and tracker
//! deadlines.

pub mod input;
pub mod markup;
pub mod surface;

pub use input::{action_for_key, action_for_mouse};
pub use surface::{SurfaceError, TerminalSurface};

use crate::engine::{tracker, ContentConfig, VirtualContent};
use crate::model::{AppError, KeyAction};
use crate::view_state::WindowMode;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, MouseEvent},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Terminal,
};
use std::cell::{Ref, RefCell};
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Longest sleep when no deadline is pending.
const IDLE_TIMEOUT: Duration = Duration::from_millis(500);

/// Rows reserved for the status line.
const STATUS_ROWS: u16 = 1;

type SharedContent = Rc<RefCell<VirtualContent<TerminalSurface>>>;

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    content: SharedContent,
    title: String,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Put the terminal in raw mode on the alternate screen and load `body`.
    ///
    /// # Errors
    ///
    /// Terminal setup failures, or content/tracker errors from [`TuiApp::with_terminal`].
    pub fn new(config: ContentConfig, body: String, title: String) -> Result<Self, AppError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Self::with_terminal(terminal, config, body, title)
    }

    /// Run the event loop until the user quits.
    ///
    /// Sleeps until the next input event or the earliest throttle/tracker deadline.
    ///
    /// # Errors
    ///
    /// Terminal I/O and rebuild failures.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.draw()?;

        loop {
            let timeout = self.next_timeout(Instant::now());
            if event::poll(timeout)? {
                let now = Instant::now();
                let quit = match event::read()? {
                    Event::Key(key) => self.handle_key(key, now)?,
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse, now)?;
                        false
                    }
                    Event::Resize(width, height) => {
                        self.handle_resize(width, height);
                        false
                    }
                    _ => continue,
                };
                if quit {
                    return Ok(());
                }
                self.tick(now)?;
                self.draw()?;
            } else if self.tick(Instant::now())? {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Build the app on an existing terminal, render the first window and start
    /// width tracking.
    ///
    /// # Errors
    ///
    /// Invalid configuration, a zero-width terminal, or terminal I/O failures.
    pub fn with_terminal(
        terminal: Terminal<B>,
        config: ContentConfig,
        body: String,
        title: String,
    ) -> Result<Self, AppError> {
        let size = terminal.size()?;
        let frame = Rect::new(0, 0, size.width, size.height);

        let content = VirtualContent::shared(config, TerminalSurface::new())?;
        {
            let mut instance = content.borrow_mut();
            instance.set_content(body)?;
            instance.render_to(Some(body_area(frame)))?;
            info!(
                title = %title,
                chunks = instance.chunks().len(),
                "Pager ready"
            );
        }
        tracker::register(&content)?;
        tracker::start_tracking(Instant::now());

        Ok(Self {
            terminal,
            content,
            title,
        })
    }

    /// The content instance.
    pub fn content(&self) -> Ref<'_, VirtualContent<TerminalSurface>> {
        self.content.borrow()
    }

    /// The terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Handle a key press. Returns `true` if the app should quit.
    ///
    /// # Errors
    ///
    /// Rebuild failures triggered by the scroll.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<bool, AppError> {
        match action_for_key(key) {
            Some(KeyAction::Quit) => Ok(true),
            Some(action) => {
                self.apply(action, now)?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Handle a mouse event; only the wheel scrolls.
    ///
    /// # Errors
    ///
    /// Rebuild failures triggered by the scroll.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Result<(), AppError> {
        if let Some(action) = action_for_mouse(mouse) {
            for _ in 0..input::WHEEL_ROWS {
                self.apply(action, now)?;
            }
        }
        Ok(())
    }

    /// Move the surface to the new body area. The tracker picks up the width change.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "Terminal resized");
        let area = body_area(Rect::new(0, 0, width, height));
        self.content.borrow_mut().backend_mut().resize(area);
    }

    /// Deliver due trailing updates and tracker sweeps. Returns whether anything ran.
    ///
    /// # Errors
    ///
    /// Rebuild failures from the trailing update.
    pub fn tick(&mut self, now: Instant) -> Result<bool, AppError> {
        let polled = self.content.borrow_mut().poll(now)?;
        let resized = tracker::poll(now);
        Ok(polled.is_some() || resized > 0)
    }

    /// Time until the earliest pending deadline, capped at the idle timeout.
    pub fn next_timeout(&self, now: Instant) -> Duration {
        let deadline = [self.content.borrow().next_deadline(), tracker::next_deadline()]
            .into_iter()
            .flatten()
            .min();
        deadline
            .map_or(IDLE_TIMEOUT, |deadline| deadline.saturating_duration_since(now))
            .min(IDLE_TIMEOUT)
    }

    /// Render the current frame.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures.
    pub fn draw(&mut self) -> Result<(), AppError> {
        let content = self.content.borrow();
        let status = status_text(&self.title, &content);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let body = body_area(area);
            frame.render_widget(content.backend(), body);

            let status_area = Rect::new(
                area.x,
                area.y + body.height,
                area.width,
                area.height - body.height,
            );
            frame.render_widget(
                Paragraph::new(Line::from(status))
                    .style(Style::default().add_modifier(Modifier::REVERSED)),
                status_area,
            );
        })?;
        Ok(())
    }

    /// Destroy the instance and stop width tracking.
    pub fn close(&mut self) {
        self.content.borrow_mut().destroy();
        tracker::shutdown();
    }

    fn apply(&mut self, action: KeyAction, now: Instant) -> Result<(), AppError> {
        let mut instance = self.content.borrow_mut();
        let surface = instance.backend_mut();
        let page = surface.viewport_rows().max(1) as isize;

        let moved = match action {
            KeyAction::ScrollDown => surface.scroll_by(1),
            KeyAction::ScrollUp => surface.scroll_by(-1),
            KeyAction::PageDown => surface.scroll_by(page),
            KeyAction::PageUp => surface.scroll_by(-page),
            KeyAction::ScrollToTop => surface.scroll_to(0),
            KeyAction::ScrollToBottom => {
                let bottom = surface.max_scroll();
                surface.scroll_to(bottom)
            }
            KeyAction::Quit => false,
        };

        if moved && surface.is_listening() {
            if let Some(outcome) = instance.on_scroll(now)? {
                debug!(
                    pointer = outcome.pointer,
                    rebuilt = outcome.rebuilt,
                    "Scroll handled"
                );
            }
        }
        Ok(())
    }
}

/// Everything above the status line.
fn body_area(frame: Rect) -> Rect {
    Rect::new(
        frame.x,
        frame.y,
        frame.width,
        frame.height.saturating_sub(STATUS_ROWS),
    )
}

fn status_text(title: &str, content: &VirtualContent<TerminalSurface>) -> String {
    let mode = match content.window().mode {
        WindowMode::Replace => "replace",
        WindowMode::Append => "append",
    };
    format!(
        "{title} | chunk {}/{} | row {} | {mode}",
        content.window().pointer + 1,
        content.chunks().len(),
        content.backend().scroll_top(),
    )
}

/// Load `body` into a full-screen pager and run it until the user quits.
///
/// The terminal is restored even when the app fails. Logging must be initialized by
/// the caller.
///
/// # Errors
///
/// Anything [`TuiApp::new`] or [`TuiApp::run`] returns, or a failure restoring the
/// terminal.
pub fn run_pager(config: ContentConfig, body: String, title: String) -> Result<(), AppError> {
    let result = TuiApp::new(config, body, title).and_then(|mut app| {
        let result = app.run();
        app.close();
        result
    });
    tracker::shutdown();

    restore_terminal()?;
    result
}

/// Disable raw mode and mouse capture, leave the alternate screen.
fn restore_terminal() -> Result<(), AppError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
