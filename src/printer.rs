//! Definition of the `Printer`.
//!
//! This is the single sink for everything the reporter prints. It knows nothing about
//! ordering: callers hold the reporter lock for as long as a logical block of output takes,
//! so lines from concurrently delivered events never interleave.

use std::io::{self, Write};

use debug_ignore::DebugIgnore;
use owo_colors::OwoColorize;

use crate::output::{AnsiColor, OutputLevel, Styles};

#[derive(Debug)]
pub(crate) struct Printer {
    out: DebugIgnore<Box<dyn Write + Send>>,
    styles: Styles,
}

impl Printer {
    pub(crate) fn new(out: Box<dyn Write + Send>, colorize: bool) -> Self {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }

        Self {
            out: DebugIgnore(out),
            styles,
        }
    }

    /// Writes text in the given color without a trailing newline.
    pub(crate) fn write(&mut self, text: &str, color: AnsiColor) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        write!(self.out, "{}", text.style(self.styles.style(color)))
    }

    pub(crate) fn write_line(&mut self, text: &str, color: AnsiColor) -> io::Result<()> {
        self.write(text, color)?;
        writeln!(self.out)
    }

    pub(crate) fn write_line_level(&mut self, text: &str, level: OutputLevel) -> io::Result<()> {
        self.write_line(text, level.color())
    }

    /// Writes text verbatim. Used for section markers, which must never carry color.
    pub(crate) fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
