//! Live window for `watch`: one line per history slot, redrawn in place.

use std::io::{self, Write};

use colored::*;
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use pingr_common::ping;
use pingr_core::monitor::Snapshot;

use crate::terminal::{colors, print};
use crate::ui::form::InvokeOutcome;

/// Result of the most recent host change, shown under the window.
///
/// Every variant but `Idle` carries the click it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLine {
    Idle,
    Pending { click: u64, host: String },
    Changed { click: u64, host: String },
    Failed { click: u64, host: String, error: String },
}

impl StatusLine {
    pub fn from_outcome(outcome: &InvokeOutcome) -> Self {
        let click: u64 = outcome.click;
        match &outcome.result {
            // The monitor's normalized host, when the reply carries one.
            Ok(reply) => StatusLine::Changed {
                click,
                host: reply["host"]
                    .as_str()
                    .map_or_else(|| outcome.host.clone(), str::to_string),
            },
            Err(e) => StatusLine::Failed {
                click,
                host: outcome.host.clone(),
                error: e.to_string(),
            },
        }
    }

    pub fn click(&self) -> u64 {
        match self {
            StatusLine::Idle => 0,
            StatusLine::Pending { click, .. }
            | StatusLine::Changed { click, .. }
            | StatusLine::Failed { click, .. } => *click,
        }
    }

    /// Replies for clicks older than the one on screen are stale.
    pub fn supersedes(&self, outcome: &InvokeOutcome) -> bool {
        outcome.click < self.click()
    }

    fn render(&self) -> String {
        match self {
            StatusLine::Idle => "type a host and press enter to switch, 'q' to quit"
                .color(colors::SEPARATOR)
                .to_string(),
            StatusLine::Pending { host, .. } => format!("switching to '{host}'...")
                .color(colors::ACCENT)
                .to_string(),
            StatusLine::Changed { host, .. } => format!("now watching {host}")
                .color(colors::REPLY)
                .to_string(),
            StatusLine::Failed { host, error, .. } => {
                format!("could not switch to '{host}': {error}")
                    .color(colors::FAILURE)
                    .to_string()
            }
        }
    }
}

/// Window lines top to bottom. The last one is the prompt holding `typed`.
pub fn compose(snapshot: &Snapshot, status: &StatusLine, typed: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(snapshot.slots.len() + 4);

    lines.push(print::header_line(&format!(
        "{} via {}",
        snapshot.host, snapshot.method
    )));

    for slot in &snapshot.slots {
        let text: String = ping::render_slot(slot);
        let color = match slot {
            Some(Ok(_)) => colors::REPLY,
            Some(Err(_)) => colors::FAILURE,
            None => colors::EMPTY,
        };
        lines.push(text.color(color).to_string());
    }

    lines.push(
        format!(
            "{} sent, {} received, {:.1}% loss",
            snapshot.sent,
            snapshot.received,
            snapshot.loss_percent()
        )
        .color(colors::SEPARATOR)
        .to_string(),
    );
    lines.push(status.render());
    lines.push(format!("{} {typed}", "new host>".color(colors::PRIMARY)));
    lines
}

/// Clears the screen once before the first frame.
pub fn open() -> io::Result<()> {
    let mut stdout = io::stdout();
    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.flush()
}

/// Overwrites the window line by line, leaving the cursor after the prompt.
pub fn render(snapshot: &Snapshot, status: &StatusLine, typed: &str) -> io::Result<()> {
    let mut stdout = io::stdout();

    for (row, line) in compose(snapshot, status, typed).iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(stdout, MoveTo(0, row))?;
        write!(stdout, "{line}")?;
        queue!(stdout, Clear(ClearType::UntilNewLine))?;
    }
    // A shorter window must not leave old rows behind.
    queue!(stdout, Clear(ClearType::FromCursorDown))?;

    stdout.flush()
}
