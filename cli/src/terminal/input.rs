//! Keyboard input for `watch`.
//!
//! Keys are read on a dedicated thread in raw mode and turned into line
//! edits. Reading never blocks the runtime, so quitting never waits for Enter.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const QUIT_LINE: &str = "q";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The line being typed changed.
    Edit(String),
    /// Enter was pressed on a line.
    Submit(String),
    Quit,
}

/// Line editing state, independent of the terminal.
#[derive(Debug, Default)]
pub struct LineEditor {
    line: String,
}

impl LineEditor {
    pub fn handle(&mut self, key: KeyEvent) -> Option<InputEvent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Some(InputEvent::Quit),
            KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.line);
                if line.trim() == QUIT_LINE {
                    Some(InputEvent::Quit)
                } else {
                    Some(InputEvent::Submit(line))
                }
            }
            KeyCode::Backspace => self.line.pop().map(|_| InputEvent::Edit(self.line.clone())),
            KeyCode::Char(c) if !ctrl => {
                self.line.push(c);
                Some(InputEvent::Edit(self.line.clone()))
            }
            _ => None,
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

pub struct InputHandle {
    stop: Arc<AtomicBool>,
    raw: bool,
}

impl InputHandle {
    /// Starts the reader thread. Without a terminal no events are produced,
    /// and only Ctrl-C (handled by the caller) ends the session.
    pub fn start() -> (Self, UnboundedReceiver<InputEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        let raw = match enable_raw_mode() {
            Ok(()) => true,
            Err(e) => {
                warn!("Keyboard input unavailable: {e}");
                return (Self { stop, raw: false }, rx);
            }
        };

        let stop_flag = stop.clone();
        thread::spawn(move || read_keys(tx, stop_flag));

        (Self { stop, raw }, rx)
    }
}

fn read_keys(tx: UnboundedSender<InputEvent>, stop: Arc<AtomicBool>) {
    let mut editor = LineEditor::default();
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }

        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };

        if let Some(input) = editor.handle(key) {
            let quit = input == InputEvent::Quit;
            if tx.send(input).is_err() || quit {
                break;
            }
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.raw {
            let _ = disable_raw_mode();
        }
    }
}
