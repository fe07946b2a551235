//! Turn a stream of test events into a report that reads well in a CI log.
//!
//! A test host (anything that discovers and runs tests) hands events to a [`TestReporter`]:
//! messages, one result per executed test, and a single completion event at the end. The
//! reporter prints
//!
//! - a colored status line per test, with the error message, stack trace and captured output
//!   wrapped in collapsible sections,
//! - a per-source summary (`Quiet`/`Minimal`) or a whole-run summary (`Normal`/`Detailed`)
//!   once the run completes.
//!
//! Collapsible sections use the `section_start`/`section_end` markers understood by GitLab CI
//! and similar log viewers. Other viewers just show the section title and body.
//!
//! # Usage
//!
//! ```
//! use ci_test_reporter::{
//!     Color, ReporterConfig, ReporterOutput, RunComplete, TestCase, TestEvent, TestOutcome,
//!     TestReporterBuilder, TestResult,
//! };
//!
//! let config = ReporterConfig::from_parameters([("verbosity", "normal")])?;
//! let reporter = TestReporterBuilder::new(config)
//!     .set_color(Color::Never)
//!     .build(ReporterOutput::Writer(Box::new(std::io::sink())));
//!
//! let case = TestCase {
//!     display_name: "Tests.Math.Add".to_owned(),
//!     source: "bin/Tests.dll".into(),
//! };
//! reporter.report_event(TestEvent::TestResult(TestResult::new(case, TestOutcome::Passed)))?;
//!
//! let conclusion = reporter.on_run_complete(&RunComplete::default())?;
//! assert!(!conclusion.has_failed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Hierarchical results
//!
//! Retries and data-driven tests are reported as a parent result plus one result per child.
//! Each child carries its parent's execution id; the parent is only counted if no child ever
//! refers to it. Hosts that carry identities in a property bag can use [`host::PropertyBag`]
//! to fill in the typed fields.

#![forbid(unsafe_code)]

mod config;
mod duration;
mod errors;
mod events;
pub mod host;
mod output;
mod printer;
mod reporter;
mod section;

pub use crate::{
    config::{short_framework_name, CollapseSettings, ReporterConfig, Verbosity},
    duration::{DisplayRunDuration, DisplayTestDuration},
    errors::{ConfigError, ReportError},
    events::{
        Attachment, AttachmentSet, MessageCategory, MessageEvent, MessageLevel, RunComplete,
        TestCase, TestEvent, TestOutcome, TestResult, TestResultMessage,
    },
    output::{AnsiColor, Color, OutputLevel},
    reporter::{Conclusion, ReporterOutput, SourceSummary, TestReporter, TestReporterBuilder},
    section::{Clock, SystemClock},
};
