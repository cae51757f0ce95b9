use std::panic;
use std::{error, io};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::Backend;
use ratatui::Terminal;

use crate::ui::{ProgressContent, Renderer};

pub type ContentResult<T> = Result<T, Box<dyn error::Error>>;

/// Terminal user interface: sets up the terminal, draws the progress screen and restores
/// the terminal afterwards.
#[derive(Debug)]
pub struct TerminalUI<B: Backend, R: Renderer> {
    terminal: Terminal<B>,
    renderer: R,
}

impl<B: Backend, R: Renderer> TerminalUI<B, R> {
    pub fn new(terminal: Terminal<B>, renderer: R) -> Self {
        Self { terminal, renderer }
    }

    /// Enables raw mode and the alternate screen. A panic hook restores the terminal so a
    /// crash does not leave it unusable.
    pub fn init(&mut self) -> ContentResult<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        let panic_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic| {
            if let Err(e) = reset_terminal() {
                eprintln!("failed to reset the terminal: {}", e);
            }
            panic_hook(panic);
        }));

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw_ui(&mut self, content: &mut ProgressContent) -> ContentResult<()> {
        self.terminal
            .draw(|frame| self.renderer.render_progress(content, frame))?;
        Ok(())
    }

    pub fn exit(&mut self) -> ContentResult<()> {
        reset_terminal()?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

fn reset_terminal() -> ContentResult<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

pub fn handle_key_events(key_event: KeyEvent, content: &mut ProgressContent) {
    if let KeyCode::Esc | KeyCode::Char('q') = key_event.code {
        content.request_stop();
    }
}
