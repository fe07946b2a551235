//! Events delivered by the test host.

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// A test event.
///
/// Events are produced by the test host and consumed by a [`TestReporter`](crate::TestReporter).
#[derive(Clone, Debug)]
pub enum TestEvent {
    /// A free-form message from the host or the test framework.
    Message(MessageEvent),

    /// A test finished running.
    TestResult(TestResult),

    /// The test run finished. Delivered exactly once, after every other event.
    RunComplete(RunComplete),
}

/// Severity of a [`MessageEvent`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageLevel {
    Informational,
    Warning,
    Error,

    /// A level this reporter does not know about. Logged and otherwise dropped.
    #[serde(other)]
    Unrecognized,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MessageEvent {
    pub level: MessageLevel,
    pub text: String,
}

impl MessageEvent {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Outcome of a single test execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,

    /// Anything else the host reports (not found, inconclusive, ...). Displayed like a skip.
    #[serde(other)]
    Other,
}

/// The category of a message captured while a test ran.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageCategory {
    StandardOutput,
    StandardError,
    DebugTrace,
    AdditionalInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TestResultMessage {
    pub category: MessageCategory,
    pub text: String,
}

/// The test case a result belongs to.
#[derive(Clone, Debug, Deserialize)]
pub struct TestCase {
    /// Name shown if the result has no display name of its own.
    pub display_name: String,

    /// The file or assembly the test came from. Results are grouped by this.
    pub source: PathBuf,
}

/// A completed test result.
///
/// Data-driven tests and retries produce a hierarchy of results: the parent is reported once
/// all of its children have been. Only results that never turn out to be a parent are
/// counted.
#[derive(Clone, Debug, Deserialize)]
pub struct TestResult {
    pub test_case: TestCase,

    /// Overrides the test case's display name, e.g. with data row arguments.
    #[serde(default)]
    pub display_name: Option<String>,

    pub outcome: TestOutcome,

    #[serde(default, rename = "duration_ms", deserialize_with = "deserialize_millis")]
    pub duration: Duration,

    #[serde(default)]
    pub start_time: DateTime<Utc>,

    #[serde(default)]
    pub end_time: DateTime<Utc>,

    #[serde(default)]
    pub messages: Vec<TestResultMessage>,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub error_stack_trace: Option<String>,

    /// This execution. A fresh id is generated if absent or nil.
    #[serde(default)]
    pub execution_id: Option<Uuid>,

    /// The execution this one is nested under, if any.
    #[serde(default)]
    pub parent_execution_id: Option<Uuid>,
}

impl TestResult {
    /// Creates a result with no timing, messages or identities.
    pub fn new(test_case: TestCase, outcome: TestOutcome) -> Self {
        Self {
            test_case,
            display_name: None,
            outcome,
            duration: Duration::ZERO,
            start_time: DateTime::<Utc>::default(),
            end_time: DateTime::<Utc>::default(),
            messages: Vec::new(),
            error_message: None,
            error_stack_trace: None,
            execution_id: None,
            parent_execution_id: None,
        }
    }

    /// The name to print for this result.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.test_case.display_name)
    }

    /// All captured text in one category, in the order it was reported. Each message starts
    /// on a new line.
    pub fn messages_in(&self, category: MessageCategory) -> String {
        let mut text = String::new();
        for message in self.messages.iter().filter(|m| m.category == category) {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&message.text);
        }
        text
    }
}

/// A file produced by the run, e.g. a coverage report.
#[derive(Clone, Debug, Deserialize)]
pub struct Attachment {
    pub path: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AttachmentSet {
    pub display_name: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Information about the finished run.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RunComplete {
    #[serde(default)]
    pub attachment_sets: Vec<AttachmentSet>,

    #[serde(default)]
    pub is_canceled: bool,

    #[serde(default)]
    pub is_aborted: bool,

    /// Error text supplied by the host for an aborted or canceled run.
    #[serde(default)]
    pub error: Option<String>,

    /// Wall time of the whole run. Zero means the host could not measure it.
    #[serde(default, rename = "elapsed_ms", deserialize_with = "deserialize_millis")]
    pub elapsed: Duration,
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn captured(texts: &[(MessageCategory, &str)]) -> TestResult {
        let mut result = TestResult::new(
            TestCase {
                display_name: "Tests.Io".to_owned(),
                source: "/out/Tests.dll".into(),
            },
            TestOutcome::Passed,
        );
        result.messages = texts
            .iter()
            .map(|(category, text)| TestResultMessage {
                category: *category,
                text: (*text).to_owned(),
            })
            .collect();
        result
    }

    #[test]
    fn messages_in_one_category() {
        let result = captured(&[
            (MessageCategory::StandardOutput, "a"),
            (MessageCategory::StandardError, "err"),
            (MessageCategory::StandardOutput, "b\n"),
            (MessageCategory::StandardOutput, "c"),
        ]);

        assert_eq!(result.messages_in(MessageCategory::StandardOutput), "a\nb\nc");
        assert_eq!(result.messages_in(MessageCategory::StandardError), "err");
        assert_eq!(result.messages_in(MessageCategory::DebugTrace), "");
    }
}
