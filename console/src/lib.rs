//! Console rendering for report lines.
//!
//! Each line is written in one locked call that sets the foreground color,
//! prints the text and resets the color. No color state outlives a call, so
//! the producer and consumer tasks can report concurrently without bleeding
//! colors into each other's lines.

use std::io::{self, Stdout, Write, stdout};
use std::sync::{Mutex, PoisonError};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use sluice_types::{Category, Report, Reporter};

/// Category colors.
mod colors {
    use super::Color;

    pub const READ: Color = Color::Green;
    pub const WRITE: Color = Color::Blue;
    pub const DROP: Color = Color::Red;
    pub const INFO: Color = Color::Yellow;
}

#[must_use]
pub const fn category_color(category: Category) -> Color {
    match category {
        Category::Read => colors::READ,
        Category::Write => colors::WRITE,
        Category::Drop => colors::DROP,
        Category::Info => colors::INFO,
    }
}

/// Line reporter over any writer. Stdout by default.
pub struct ConsoleReporter<W = Stdout> {
    out: Mutex<W>,
    color: bool,
}

impl ConsoleReporter<Stdout> {
    #[must_use]
    pub fn stdout(color: bool) -> Self {
        Self::new(stdout(), color)
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out: Mutex::new(out),
            color,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, report: &Report) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if self.color {
            queue!(
                out,
                SetForegroundColor(category_color(report.category())),
                Print(report.text()),
                ResetColor,
                Print("\n"),
            )?;
        } else {
            writeln!(out, "{}", report.text())?;
        }
        out.flush()
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report(&self, report: &Report) {
        if let Err(err) = self.write_line(report) {
            tracing::warn!(category = %report.category(), "Failed to write report line: {err}");
        }
    }
}
