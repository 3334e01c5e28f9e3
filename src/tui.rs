use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use crate::app::App;
use crate::error::Result;
use crate::ui;

/// Raw-mode alternate screen the widgets draw on.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    mouse_captured: bool,
}

impl Tui {
    /// Enter raw mode and the alternate screen. Mouse capture is what lets
    /// menus track drags, so it is only skipped when the user turned it off.
    pub fn new(capture_mouse: bool) -> Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        if capture_mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        tracing::debug!(capture_mouse, "terminal initialised");
        Ok(Self {
            terminal,
            mouse_captured: capture_mouse,
        })
    }

    /// Full screen area, used to lay out menus and modals.
    pub fn area(&self) -> Result<Rect> {
        let size = self.terminal.size()?;
        Ok(Rect::new(0, 0, size.width, size.height))
    }

    pub fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    }

    /// Leave the alternate screen and give the terminal back.
    pub fn restore(&mut self) -> Result<()> {
        if self.mouse_captured {
            execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        }
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        tracing::debug!("terminal restored");
        Ok(())
    }
}

/// Restore the terminal before the default hook prints a panic, so the
/// message is readable.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        previous(info);
    }));
}
