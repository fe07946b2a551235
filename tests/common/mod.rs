#![allow(dead_code)]

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use ci_test_reporter::{
    Clock, Color, MessageCategory, ReporterConfig, ReporterOutput, TestCase, TestOutcome,
    TestReporter, TestReporterBuilder, TestResult, TestResultMessage,
};

/// Removes the common leading indentation of `s`, plus a leading and trailing blank line, so
/// expected logs can be written inline.
pub fn clean_expected_log(s: &str) -> String {
    let mut lines: Vec<&str> = s.split('\n').collect();
    if lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = String::new();
    for line in lines {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&line[indent..]);
            out.push('\n');
        }
    }
    out
}

#[macro_export]
macro_rules! assert_log {
    ($output:expr, $expected:expr) => {
        let actual = $output;
        let expected = $crate::common::clean_expected_log($expected);

        assert_eq!(actual, expected);
    };
}

/// An in-memory writer that can be read back after being handed to a reporter.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Always returns the same timestamp, so logs are reproducible.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

pub const TIMESTAMP: i64 = 1_700_000_000_000;

pub fn reporter_with(config: ReporterConfig, color: Color) -> (Arc<TestReporter>, SharedBuffer) {
    let buf = SharedBuffer::default();
    let reporter = TestReporterBuilder::new(config)
        .set_color(color)
        .set_clock(Arc::new(FixedClock(TIMESTAMP)))
        .build(ReporterOutput::Writer(Box::new(buf.clone())));
    (Arc::new(reporter), buf)
}

pub fn reporter<const N: usize>(params: [(&str, &str); N]) -> (Arc<TestReporter>, SharedBuffer) {
    let config = ReporterConfig::from_parameters(params).unwrap();
    reporter_with(config, Color::Never)
}

pub fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

pub fn result(name: &str, source: &str, outcome: TestOutcome) -> TestResult {
    TestResult::new(
        TestCase {
            display_name: name.to_owned(),
            source: PathBuf::from(source),
        },
        outcome,
    )
}

/// A result that ran from `start_ms` to `end_ms`.
pub fn timed_result(
    name: &str,
    source: &str,
    outcome: TestOutcome,
    start_ms: i64,
    end_ms: i64,
) -> TestResult {
    let mut result = result(name, source, outcome);
    result.start_time = at(start_ms);
    result.end_time = at(end_ms);
    result.duration = Duration::from_millis((end_ms - start_ms) as u64);
    result
}

pub fn message(category: MessageCategory, text: &str) -> TestResultMessage {
    TestResultMessage {
        category,
        text: text.to_owned(),
    }
}
