//! Prints out and aggregates test results.
//!
//! The main structure in this module is [`TestReporter`].

mod aggregator;
mod detail;

use std::{
    collections::BTreeMap,
    fmt, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

pub use self::aggregator::SourceSummary;
use self::aggregator::{source_file_name, LeafResult, LeafResults, RunTotals};
use crate::{
    config::{ReporterConfig, Verbosity},
    duration::{DisplayRunDuration, DisplayTestDuration},
    errors::ReportError,
    events::{MessageEvent, MessageLevel, RunComplete, TestEvent, TestOutcome, TestResult},
    output::{AnsiColor, Color, OutputLevel},
    printer::Printer,
    section::{Clock, SectionWriter, SystemClock},
};

/// Where the reporter writes its output.
pub enum ReporterOutput {
    /// Write to stdout.
    Stdout,

    /// Write to the given writer, e.g. a log file or an in-memory buffer for tests.
    Writer(Box<dyn io::Write + Send>),
}

impl fmt::Debug for ReporterOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterOutput::Stdout => f.write_str("Stdout"),
            ReporterOutput::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Test reporter builder.
#[derive(Default)]
pub struct TestReporterBuilder {
    config: ReporterConfig,
    color: Color,
    clock: Option<Arc<dyn Clock>>,
}

impl TestReporterBuilder {
    pub fn new(config: ReporterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets whether to colorize output. Defaults to [`Color::Auto`], which only colors
    /// [`ReporterOutput::Stdout`].
    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the clock used for section timestamps. Defaults to the system clock.
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
        self.clock = Some(clock);
        self
    }

    /// Creates a new test reporter.
    pub fn build(&self, output: ReporterOutput) -> TestReporter {
        let (out, colorize) = match output {
            ReporterOutput::Stdout => (
                Box::new(io::stdout()) as Box<dyn io::Write + Send>,
                self.color.should_colorize(supports_color::Stream::Stdout),
            ),
            // An arbitrary writer is only colored on request.
            ReporterOutput::Writer(out) => (out, self.color == Color::Always),
        };
        let clock = self
            .clock
            .clone()
            .unwrap_or_else(|| Arc::new(SystemClock));

        TestReporter {
            config: self.config.clone(),
            inner: Mutex::new(TestReporterImpl {
                printer: Printer::new(out, colorize),
                sections: SectionWriter::new(clock),
                leaves: LeafResults::default(),
                has_error_messages: false,
                is_complete: false,
            }),
        }
    }
}

impl fmt::Debug for TestReporterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestReporterBuilder")
            .field("config", &self.config)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

/// Turns test events into a CI-friendly report.
///
/// Events may be delivered from any number of threads: share the reporter through an `Arc`.
/// Handling an event, including everything it prints, happens under a single lock, so output
/// from different events never interleaves.
///
/// What is printed per test result depends on the verbosity:
///
/// | outcome         | quiet | minimal        | normal         | detailed       |
/// |-----------------|-------|----------------|----------------|----------------|
/// | failed          | -     | line + details | line + details | line + details |
/// | passed          | -     | -              | line           | line + details |
/// | skipped / other | -     | -              | line           | line + details |
#[derive(Debug)]
pub struct TestReporter {
    config: ReporterConfig,
    inner: Mutex<TestReporterImpl>,
}

impl TestReporter {
    /// Report a test event.
    ///
    /// Returns the run's [`Conclusion`] for [`TestEvent::RunComplete`].
    pub fn report_event(&self, event: TestEvent) -> Result<Option<Conclusion>, ReportError> {
        match event {
            TestEvent::Message(message) => self.on_message(&message).map(|()| None),
            TestEvent::TestResult(result) => self.on_test_result(&result).map(|()| None),
            TestEvent::RunComplete(complete) => self.on_run_complete(&complete).map(Some),
        }
    }

    /// Prints a host message, filtered by verbosity.
    pub fn on_message(&self, message: &MessageEvent) -> Result<(), ReportError> {
        let mut inner = self.lock()?;
        inner.write_message(&self.config, message)?;
        inner.printer.flush()?;
        Ok(())
    }

    /// Records a test result and prints it, filtered by verbosity.
    ///
    /// Fails with [`ReportError::DuplicateExecution`] if a result with the same execution id
    /// was already recorded.
    pub fn on_test_result(&self, result: &TestResult) -> Result<(), ReportError> {
        let mut inner = self.lock()?;
        inner.record_result(result)?;
        inner.write_result(&self.config, result)?;
        inner.printer.flush()?;
        Ok(())
    }

    /// Prints the per-source or whole-run summary. Must be called exactly once, last.
    pub fn on_run_complete(&self, complete: &RunComplete) -> Result<Conclusion, ReportError> {
        let mut inner = self.lock()?;
        inner.is_complete = true;
        let conclusion = inner.write_run_complete(&self.config, complete)?;
        inner.printer.flush()?;
        Ok(conclusion)
    }

    fn lock(&self) -> Result<MutexGuard<'_, TestReporterImpl>, ReportError> {
        // A panic while holding the lock leaves at worst a half-written line behind.
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.is_complete {
            return Err(ReportError::RunAlreadyComplete);
        }
        Ok(inner)
    }
}

/// Contains information about the entire test run. Returned once the run completes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use = "Check `has_failed()` to set the correct return code"]
pub struct Conclusion {
    /// Number of leaf results.
    pub num_total: usize,

    /// Number of passed tests.
    pub num_passed: usize,

    /// Number of failed tests.
    pub num_failed: usize,

    /// Number of skipped tests.
    pub num_skipped: usize,

    /// Whether the host reported any error-level messages.
    pub has_error_messages: bool,

    /// Whether the run was canceled.
    pub is_canceled: bool,

    /// Whether the run was aborted.
    pub is_aborted: bool,

    /// Statistics per test source.
    pub sources: BTreeMap<PathBuf, SourceSummary>,
}

impl Conclusion {
    /// Returns whether the run should be considered a failure.
    pub fn has_failed(&self) -> bool {
        self.num_failed > 0 || self.has_error_messages || self.is_canceled || self.is_aborted
    }
}

struct TestReporterImpl {
    printer: Printer,
    sections: SectionWriter,
    leaves: LeafResults,
    has_error_messages: bool,
    is_complete: bool,
}

impl TestReporterImpl {
    fn write_message(&mut self, config: &ReporterConfig, message: &MessageEvent) -> io::Result<()> {
        let level = match message.level {
            MessageLevel::Informational if config.verbosity >= Verbosity::Normal => {
                OutputLevel::Information
            }
            MessageLevel::Warning if config.verbosity >= Verbosity::Minimal => {
                OutputLevel::Warning
            }
            MessageLevel::Error => {
                self.has_error_messages = true;
                OutputLevel::Error
            }
            MessageLevel::Informational | MessageLevel::Warning => return Ok(()),
            MessageLevel::Unrecognized => {
                tracing::warn!(text = %message.text, "dropping message with unrecognized level");
                return Ok(());
            }
        };

        self.printer.write_line_level(&message.text, level)
    }

    fn record_result(&mut self, result: &TestResult) -> Result<(), ReportError> {
        let execution_id = result
            .execution_id
            .filter(|id| !id.is_nil())
            .unwrap_or_else(Uuid::new_v4);
        let parent_execution_id = result.parent_execution_id.filter(|id| !id.is_nil());

        self.leaves.record(
            execution_id,
            parent_execution_id,
            LeafResult::from_result(result),
        )
    }

    fn write_result(&mut self, config: &ReporterConfig, result: &TestResult) -> io::Result<()> {
        let (glyph, color, show_line, show_details) = match result.outcome {
            TestOutcome::Failed => (
                FAILED_GLYPH,
                AnsiColor::Red,
                config.verbosity >= Verbosity::Minimal,
                true,
            ),
            TestOutcome::Passed => (
                PASSED_GLYPH,
                AnsiColor::Green,
                config.verbosity >= Verbosity::Normal,
                config.verbosity >= Verbosity::Detailed,
            ),
            TestOutcome::Skipped | TestOutcome::Other => (
                SKIPPED_GLYPH,
                AnsiColor::Yellow,
                config.verbosity >= Verbosity::Normal,
                config.verbosity >= Verbosity::Detailed,
            ),
        };

        if !show_line {
            return Ok(());
        }

        self.printer.write(&format!("  {glyph} "), color)?;
        self.printer
            .write_line(&display_name(result), AnsiColor::Default)?;

        if show_details {
            detail::write_result_details(
                result,
                &config.collapse,
                &mut self.sections,
                &mut self.printer,
            )?;
        }

        if result.outcome == TestOutcome::Failed && !config.failed_test_separator.is_empty() {
            self.printer
                .write_line(&config.failed_test_separator, AnsiColor::Default)?;
        }

        Ok(())
    }

    fn write_run_complete(
        &mut self,
        config: &ReporterConfig,
        complete: &RunComplete,
    ) -> io::Result<Conclusion> {
        let sources = self.leaves.drain_summaries();
        let totals = RunTotals::new(sources.values(), self.has_error_messages);

        if config.verbosity <= Verbosity::Minimal {
            for (source, summary) in &sources {
                self.write_source_summary(config, source, summary)?;
            }
        } else {
            self.write_run_summary(complete, &totals)?;
        }

        Ok(Conclusion {
            num_total: totals.total,
            num_passed: totals.passed,
            num_failed: totals.failed,
            num_skipped: totals.skipped,
            has_error_messages: totals.has_error_messages,
            is_canceled: complete.is_canceled,
            is_aborted: complete.is_aborted,
            sources,
        })
    }

    fn write_source_summary(
        &mut self,
        config: &ReporterConfig,
        source: &Path,
        summary: &SourceSummary,
    ) -> io::Result<()> {
        let (label, color) = match summary.outcome() {
            Some(TestOutcome::Failed) => (format!("{FAILED_GLYPH} Failed!"), AnsiColor::Red),
            Some(TestOutcome::Passed) => (format!("{PASSED_GLYPH} Passed!"), AnsiColor::Green),
            Some(TestOutcome::Skipped) => {
                (format!("{SKIPPED_GLYPH} Skipped!"), AnsiColor::Yellow)
            }
            Some(TestOutcome::Other) | None => ("? Unknown!".to_owned(), AnsiColor::Default),
        };

        // Pad before styling so escapes don't count towards the width.
        self.printer.write(&format!("{label:<10}"), color)?;
        self.printer.write_line(
            &format!(
                " - Failed: {:>5}, Passed: {:>5}, Skipped: {:>5}, Total: {:>5}, Duration: {}",
                summary.failed,
                summary.passed,
                summary.skipped,
                summary.total,
                DisplayTestDuration(summary.duration()),
            ),
            AnsiColor::Default,
        )?;

        let mut line = format!("  - {}", source_file_name(source));
        if let Some(framework) = &config.target_framework {
            line.push_str(&format!(" ({framework})"));
        }
        self.printer.write_line(&line, AnsiColor::Default)
    }

    fn write_run_summary(&mut self, complete: &RunComplete, totals: &RunTotals) -> io::Result<()> {
        let attachments: Vec<_> = complete
            .attachment_sets
            .iter()
            .flat_map(|set| &set.attachments)
            .collect();
        if !attachments.is_empty() {
            self.printer.write_line("", AnsiColor::Default)?;
            self.printer.write_line("Attachments:", AnsiColor::Default)?;
            for attachment in attachments {
                self.printer.write_line(
                    &format!("  {}", attachment.path.display()),
                    AnsiColor::Default,
                )?;
            }
        }

        self.printer.write_line("", AnsiColor::Default)?;
        if complete.is_canceled || complete.is_aborted {
            let (state, color) = if complete.is_aborted {
                ("Aborted", AnsiColor::Red)
            } else {
                ("Canceled", AnsiColor::Yellow)
            };
            let status = match complete.error.as_deref().filter(|e| !e.trim().is_empty()) {
                Some(error) => format!("Test Run {state} with error: {error}"),
                None => format!("Test Run {state}."),
            };
            self.printer.write_line(&status, color)?;
        } else if totals.any_failed() {
            self.printer
                .write_line_level("Test Run Failed.", OutputLevel::Error)?;
        } else {
            self.printer.write_line("Test Run Successful.", AnsiColor::Green)?;
        }

        self.printer
            .write_line(&format!("Total tests: {}", totals.total), AnsiColor::Default)?;
        for (label, count, color) in [
            ("Passed", totals.passed, AnsiColor::Green),
            ("Failed", totals.failed, AnsiColor::Red),
            ("Skipped", totals.skipped, AnsiColor::Yellow),
        ] {
            if count > 0 {
                self.printer
                    .write_line(&format!("{label:>11}: {count}"), color)?;
            }
        }

        if !complete.elapsed.is_zero() {
            self.printer.write_line(
                &format!(" Total time: {}", DisplayRunDuration(complete.elapsed)),
                AnsiColor::Default,
            )?;
        }

        Ok(())
    }
}

impl fmt::Debug for TestReporterImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestReporterImpl")
            .field("printer", &self.printer)
            .field("sections", &self.sections)
            .field("leaves", &self.leaves)
            .field("has_error_messages", &self.has_error_messages)
            .field("is_complete", &self.is_complete)
            .finish()
    }
}

const PASSED_GLYPH: &str = "✓";
const FAILED_GLYPH: &str = "✗";
const SKIPPED_GLYPH: &str = "↷";

/// The result's name, followed by its duration in brackets if one was measured.
fn display_name(result: &TestResult) -> String {
    if result.duration.is_zero() {
        result.name().to_owned()
    } else {
        format!("{} [{}]", result.name(), DisplayTestDuration(result.duration))
    }
}
