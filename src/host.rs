//! Adapters from the host's loosely typed representation to [`TestEvent`]s.
//!
//! Hosts attach execution identities to results through a string-keyed property bag. This is
//! the only place those keys are read: the reporter itself only sees the typed
//! [`TestResult::execution_id`] and [`TestResult::parent_execution_id`] fields.

use std::collections::BTreeMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::events::{MessageEvent, RunComplete, TestEvent, TestResult};

/// Property key holding the id of this execution.
pub const EXECUTION_ID_PROPERTY: &str = "ExecutionId";

/// Property key holding the id of the parent execution.
pub const PARENT_EXECUTION_ID_PROPERTY: &str = "ParentExecId";

/// String properties attached to a result by the host.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, String>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Reads a UUID property. Missing or malformed values are treated as absent.
    pub fn uuid(&self, key: &str) -> Option<Uuid> {
        let value = self.get(key)?;
        match Uuid::parse_str(value.trim()) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::debug!(key, value, %error, "ignoring malformed id property");
                None
            }
        }
    }

    /// Fills in the identity fields of `result` that are not already set.
    pub fn apply_to(&self, result: &mut TestResult) {
        if result.execution_id.is_none() {
            result.execution_id = self.uuid(EXECUTION_ID_PROPERTY);
        }
        if result.parent_execution_id.is_none() {
            result.parent_execution_id = self.uuid(PARENT_EXECUTION_ID_PROPERTY);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A result as delivered by the host, identities still in the property bag.
#[derive(Clone, Debug, Deserialize)]
pub struct HostTestResult {
    #[serde(flatten)]
    pub result: TestResult,

    #[serde(default)]
    pub properties: PropertyBag,
}

impl From<HostTestResult> for TestResult {
    fn from(host: HostTestResult) -> Self {
        let mut result = host.result;
        host.properties.apply_to(&mut result);
        result
    }
}

/// An event as serialized by the host, one JSON object per line.
///
/// ```json
/// {"event": "message", "level": "warning", "text": "no tests in Foo.dll"}
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    Message(MessageEvent),
    TestResult(HostTestResult),
    RunComplete(RunComplete),
}

impl From<HostEvent> for TestEvent {
    fn from(event: HostEvent) -> Self {
        match event {
            HostEvent::Message(message) => TestEvent::Message(message),
            HostEvent::TestResult(result) => TestEvent::TestResult(result.into()),
            HostEvent::RunComplete(complete) => TestEvent::RunComplete(complete),
        }
    }
}
