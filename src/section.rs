//! Collapsible sections for CI log viewers.
//!
//! A section is delimited by a pair of markers:
//!
//! ```text
//! section_start:<epoch_ms>:<name>[collapsed=true]\r<title>
//! ...
//! section_end:<epoch_ms>:<name>\r
//! ```
//!
//! Viewers that understand the markers fold everything in between under the title. Everything
//! else just shows the title and the body.

use std::{io, sync::Arc};

use chrono::Utc;

use crate::{output::AnsiColor, printer::Printer};

/// Source of the timestamps written into section markers.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// The wall clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// The title line of a section.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SectionHeader<'a> {
    pub(crate) title: &'a str,
    pub(crate) color: AnsiColor,
    pub(crate) collapsed: bool,
}

impl<'a> SectionHeader<'a> {
    pub(crate) fn new(title: &'a str) -> Self {
        Self {
            title,
            color: AnsiColor::Default,
            collapsed: false,
        }
    }

    pub(crate) fn color(self, color: AnsiColor) -> Self {
        Self { color, ..self }
    }

    pub(crate) fn collapsed(self, collapsed: bool) -> Self {
        Self { collapsed, ..self }
    }
}

/// Writes section markers. Holds no lock: the reporter serializes all access.
pub(crate) struct SectionWriter {
    counter: u64,
    clock: Arc<dyn Clock>,
}

impl SectionWriter {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self { counter: 0, clock }
    }

    /// Writes `body` inside a section.
    ///
    /// The end marker is written whether or not `body` succeeds. If both fail, the error from
    /// `body` wins.
    pub(crate) fn section<F>(
        &mut self,
        printer: &mut Printer,
        header: SectionHeader<'_>,
        body: F,
    ) -> io::Result<()>
    where
        F: FnOnce(&mut Printer) -> io::Result<()>,
    {
        self.counter += 1;
        let name = format!("section_{}", self.counter);

        let collapsed = if header.collapsed {
            "[collapsed=true]"
        } else {
            ""
        };
        printer.write_raw(&format!(
            "section_start:{}:{name}{collapsed}\r",
            self.clock.now_millis()
        ))?;
        printer.write_line(header.title, header.color)?;

        let result = body(printer);
        let end = printer.write_raw(&format!(
            "section_end:{}:{name}\r\n",
            self.clock.now_millis()
        ));

        result.and(end)
    }
}

impl std::fmt::Debug for SectionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionWriter")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}
