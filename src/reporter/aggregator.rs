//! Leaf result tracking and per-source statistics.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    errors::ReportError,
    events::{TestOutcome, TestResult},
};

/// What is kept of a result once it has been printed.
#[derive(Clone, Debug)]
pub(crate) struct LeafResult {
    pub(crate) source: PathBuf,
    pub(crate) outcome: TestOutcome,
    pub(crate) start_time: DateTime<Utc>,
    pub(crate) end_time: DateTime<Utc>,
}

impl LeafResult {
    pub(crate) fn from_result(result: &TestResult) -> Self {
        Self {
            source: result.test_case.source.clone(),
            outcome: result.outcome,
            start_time: result.start_time,
            end_time: result.end_time,
        }
    }
}

/// The results that have not (yet) turned out to be the parent of another result.
///
/// A parent is recorded before its children finish, and every child names it through its
/// parent id. Each result is provisionally treated as a leaf and evicted once a child referring
/// to it shows up.
#[derive(Debug, Default)]
pub(crate) struct LeafResults {
    leaves: HashMap<Uuid, LeafResult>,
}

impl LeafResults {
    /// Records a result under `execution_id`, evicting `parent_execution_id` if present.
    pub(crate) fn record(
        &mut self,
        execution_id: Uuid,
        parent_execution_id: Option<Uuid>,
        leaf: LeafResult,
    ) -> Result<(), ReportError> {
        if self.leaves.contains_key(&execution_id) {
            return Err(ReportError::DuplicateExecution { execution_id });
        }

        if let Some(parent) = parent_execution_id {
            if self.leaves.remove(&parent).is_none() {
                tracing::debug!(%parent, %execution_id, "parent execution was not a recorded leaf");
            }
        }

        self.leaves.insert(execution_id, leaf);
        Ok(())
    }

    /// Empties the leaf set, returning per-source summaries ordered by source path.
    pub(crate) fn drain_summaries(&mut self) -> BTreeMap<PathBuf, SourceSummary> {
        let mut summaries: BTreeMap<PathBuf, SourceSummary> = BTreeMap::new();
        for (_, leaf) in self.leaves.drain() {
            match summaries.get_mut(&leaf.source) {
                Some(summary) => summary.add(&leaf),
                None => {
                    let summary = SourceSummary::new(&leaf);
                    summaries.insert(leaf.source, summary);
                }
            }
        }
        summaries
    }

    #[cfg(test)]
    pub(crate) fn ids(&self) -> std::collections::HashSet<Uuid> {
        self.leaves.keys().copied().collect()
    }
}

/// Statistics for all leaf results of one source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl SourceSummary {
    fn new(leaf: &LeafResult) -> Self {
        let mut summary = Self {
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            start_time: leaf.start_time,
            end_time: leaf.end_time,
        };
        summary.add(leaf);
        summary
    }

    fn add(&mut self, leaf: &LeafResult) {
        self.total += 1;
        match leaf.outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed += 1,
            TestOutcome::Skipped => self.skipped += 1,
            TestOutcome::Other => {}
        }
        self.start_time = self.start_time.min(leaf.start_time);
        self.end_time = self.end_time.max(leaf.end_time);
    }

    /// Time from the earliest start to the latest end among the source's leaves.
    pub fn duration(&self) -> Duration {
        (self.end_time - self.start_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// The outcome shown for the source as a whole: any failure wins, then any pass, then any
    /// skip. `None` if every leaf had some other outcome.
    pub fn outcome(&self) -> Option<TestOutcome> {
        if self.failed > 0 {
            Some(TestOutcome::Failed)
        } else if self.passed > 0 {
            Some(TestOutcome::Passed)
        } else if self.skipped > 0 {
            Some(TestOutcome::Skipped)
        } else {
            None
        }
    }
}

/// Counters for the whole run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct RunTotals {
    pub(crate) total: usize,
    pub(crate) passed: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
    pub(crate) has_error_messages: bool,
}

impl RunTotals {
    pub(crate) fn new<'a>(
        summaries: impl IntoIterator<Item = &'a SourceSummary>,
        has_error_messages: bool,
    ) -> Self {
        summaries.into_iter().fold(
            Self {
                has_error_messages,
                ..Self::default()
            },
            |totals, summary| Self {
                total: totals.total + summary.total,
                passed: totals.passed + summary.passed,
                failed: totals.failed + summary.failed,
                skipped: totals.skipped + summary.skipped,
                ..totals
            },
        )
    }

    pub(crate) fn any_failed(&self) -> bool {
        self.failed > 0 || self.has_error_messages
    }
}

/// The last path component of a source, e.g. `Tests.dll` for `/out/bin/Tests.dll`.
pub(crate) fn source_file_name(source: &Path) -> String {
    source
        .file_name()
        .unwrap_or(source.as_os_str())
        .to_string_lossy()
        .into_owned()
}
