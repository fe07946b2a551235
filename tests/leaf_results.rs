use std::{collections::HashSet, path::Path};

use ci_test_reporter::{ReportError, RunComplete, TestOutcome, TestResult};
use common::{reporter, result};
use pretty_assertions::assert_eq;
use uuid::Uuid;

mod common;

const OUTCOMES: [TestOutcome; 4] = [
    TestOutcome::Passed,
    TestOutcome::Failed,
    TestOutcome::Skipped,
    TestOutcome::Other,
];

struct Node {
    id: Uuid,
    parent: Option<Uuid>,
    outcome: TestOutcome,
    source: &'static str,
}

/// A random forest, in an order where every parent precedes its children.
fn forest(rng: &fastrand::Rng, size: usize) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::with_capacity(size);
    for _ in 0..size {
        let parent = if nodes.is_empty() || rng.bool() {
            None
        } else {
            Some(nodes[rng.usize(..nodes.len())].id)
        };
        nodes.push(Node {
            id: Uuid::from_u128(rng.u128(1..)),
            parent,
            outcome: OUTCOMES[rng.usize(..OUTCOMES.len())],
            source: ["/out/A.dll", "/out/B.dll", "/out/C.dll"][rng.usize(..3)],
        });
    }
    nodes
}

#[test]
fn only_leaves_are_counted() {
    for seed in 0..50 {
        let rng = fastrand::Rng::with_seed(seed);
        let nodes = forest(&rng, rng.usize(1..40));

        let parents: HashSet<Uuid> = nodes.iter().filter_map(|n| n.parent).collect();
        let leaves: Vec<&Node> = nodes.iter().filter(|n| !parents.contains(&n.id)).collect();
        let count = |outcome: TestOutcome| leaves.iter().filter(|n| n.outcome == outcome).count();

        let (reporter, _buf) = reporter([("verbosity", "quiet")]);
        for node in &nodes {
            let mut r = result("Test", node.source, node.outcome);
            r.execution_id = Some(node.id);
            r.parent_execution_id = node.parent;
            reporter.on_test_result(&r).unwrap();
        }
        let conclusion = reporter.on_run_complete(&RunComplete::default()).unwrap();

        assert_eq!(conclusion.num_total, leaves.len(), "seed {seed}");
        assert_eq!(conclusion.num_passed, count(TestOutcome::Passed), "seed {seed}");
        assert_eq!(conclusion.num_failed, count(TestOutcome::Failed), "seed {seed}");
        assert_eq!(conclusion.num_skipped, count(TestOutcome::Skipped), "seed {seed}");

        let per_source: usize = conclusion.sources.values().map(|s| s.total).sum();
        assert_eq!(per_source, leaves.len(), "seed {seed}");
        for (source, summary) in &conclusion.sources {
            let expected = leaves
                .iter()
                .filter(|n| source.as_path() == Path::new(n.source))
                .count();
            assert_eq!(summary.total, expected, "seed {seed}, {}", source.display());
        }
    }
}

#[test]
fn unknown_parent_is_ignored() {
    let (reporter, _buf) = reporter([("verbosity", "quiet")]);

    let mut child = result("Child", "/out/A.dll", TestOutcome::Passed);
    child.execution_id = Some(Uuid::new_v4());
    child.parent_execution_id = Some(Uuid::new_v4());
    reporter.on_test_result(&child).unwrap();

    let conclusion = reporter.on_run_complete(&RunComplete::default()).unwrap();
    assert_eq!(conclusion.num_total, 1);
    assert_eq!(conclusion.num_passed, 1);
}

#[test]
fn sibling_children_evict_parent_once() {
    let (reporter, _buf) = reporter([("verbosity", "quiet")]);
    let parent_id = Uuid::new_v4();

    let mut parent = result("Retry", "/out/A.dll", TestOutcome::Failed);
    parent.execution_id = Some(parent_id);
    reporter.on_test_result(&parent).unwrap();

    for outcome in [TestOutcome::Failed, TestOutcome::Passed] {
        let mut attempt = result("Retry", "/out/A.dll", outcome);
        attempt.parent_execution_id = Some(parent_id);
        reporter.on_test_result(&attempt).unwrap();
    }

    let conclusion = reporter.on_run_complete(&RunComplete::default()).unwrap();
    assert_eq!(conclusion.num_total, 2);
    assert_eq!(conclusion.num_failed, 1);
    assert_eq!(conclusion.num_passed, 1);
}

#[test]
fn duplicate_execution_id_is_an_error() {
    let (reporter, buf) = reporter([("verbosity", "normal")]);
    let id = Uuid::new_v4();

    let mut first = result("Tests.Add", "/out/A.dll", TestOutcome::Passed);
    first.execution_id = Some(id);
    reporter.on_test_result(&first).unwrap();

    let mut again = result("Tests.Add", "/out/A.dll", TestOutcome::Failed);
    again.execution_id = Some(id);
    match reporter.on_test_result(&again) {
        Err(ReportError::DuplicateExecution { execution_id }) => assert_eq!(execution_id, id),
        other => panic!("expected a duplicate execution error, got {other:?}"),
    }

    // The rejected result is neither printed nor counted.
    let conclusion = reporter.on_run_complete(&RunComplete::default()).unwrap();
    assert_eq!(conclusion.num_total, 1);
    assert_eq!(conclusion.num_failed, 0);
    assert!(!buf.contents().contains('✗'));
}

#[test]
fn missing_and_nil_ids_get_fresh_identities() {
    let (reporter, _buf) = reporter([("verbosity", "quiet")]);

    let results: Vec<TestResult> = (0..4)
        .map(|i| {
            let mut r = result("Test", "/out/A.dll", TestOutcome::Passed);
            if i % 2 == 0 {
                r.execution_id = Some(Uuid::nil());
                r.parent_execution_id = Some(Uuid::nil());
            }
            r
        })
        .collect();
    for r in &results {
        reporter.on_test_result(r).unwrap();
    }

    let conclusion = reporter.on_run_complete(&RunComplete::default()).unwrap();
    assert_eq!(conclusion.num_total, 4);
    assert_eq!(conclusion.sources.len(), 1);
}
