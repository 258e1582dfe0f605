//! The event record consumed from the capture subsystem

use crate::ProcessInfo;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use probeql_types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Broad classification of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Process,
    Thread,
    Image,
    File,
    Net,
    Registry,
    Handle,
    Mem,
    Other,
}

impl EventCategory {
    /// Canonical text form used by the `kevt.category` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Thread => "thread",
            Self::Image => "image",
            Self::File => "file",
            Self::Net => "net",
            Self::Registry => "registry",
            Self::Handle => "handle",
            Self::Mem => "mem",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyed collection of typed event parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Params {
    inner: IndexMap<String, Value>,
}

impl Params {
    /// Create an empty parameter collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any previous value under the name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.inner.insert(name.into(), value);
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Check if a parameter is present
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// One observed system-activity record, the unit of evaluation.
///
/// Created by the external capture subsystem, handed to the evaluator
/// by reference and discarded afterwards. The optional process-state
/// reference points into the tracker's tree; the engine reads at most
/// one parent level through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number
    pub seq: u64,
    /// Process identifier that produced the event
    pub pid: u32,
    /// Thread identifier that produced the event
    pub tid: u32,
    /// CPU the event was captured on
    pub cpu: u8,
    /// Event name (e.g. `CreateProcess`)
    pub name: String,
    /// Event category
    pub category: EventCategory,
    /// Free-text description
    pub description: String,
    /// Host the event originated from
    pub host: String,
    /// Wall-clock timestamp with zone offset
    pub timestamp: DateTime<FixedOffset>,
    /// Typed event parameters keyed by name
    pub params: Params,
    /// Process-state context, absent when the tracker has no entry
    #[serde(skip)]
    pub ps: Option<Arc<ProcessInfo>>,
}

impl Event {
    /// Parent process entry, one level up the tracker's tree
    pub fn parent_ps(&self) -> Option<&Arc<ProcessInfo>> {
        self.ps.as_ref().and_then(|ps| ps.parent.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        let tz = FixedOffset::east_opt(3600).unwrap();
        Event {
            seq: 7,
            pid: 1204,
            tid: 3201,
            cpu: 2,
            name: "Send".into(),
            category: EventCategory::Net,
            description: "transmits data over the wire".into(),
            host: "archrabbit".into(),
            timestamp: tz.with_ymd_and_hms(2024, 5, 14, 22, 13, 49).unwrap(),
            params: [
                ("dip".to_string(), Value::Ip("172.17.12.4".parse().unwrap())),
                ("dport".to_string(), Value::Port(443)),
            ]
            .into_iter()
            .collect(),
            ps: None,
        }
    }

    #[test]
    fn test_param_lookup() {
        let evt = sample_event();
        assert_eq!(evt.params.len(), 2);
        assert!(evt.params.contains("dip"));
        assert!(evt.params.get("sport").is_none());
    }

    #[test]
    fn test_parent_absent_is_normal() {
        let evt = sample_event();
        assert!(evt.parent_ps().is_none());
    }
}
