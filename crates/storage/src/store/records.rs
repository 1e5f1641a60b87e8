#![forbid(unsafe_code)]

use growth_core::model::{EventSource, EventType, IssueSource, Severity};
use serde::{Deserialize, Serialize};

/// One line of `corrections/issues.jsonl`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub title: String,
    pub location: String,
    pub observed: String,
    pub expected: String,
    pub severity: Severity,
    pub tags: Vec<String>,
    pub source: IssueSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

/// One line of `events.jsonl`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub actors: Vec<String>,
    pub summary: String,
    pub source: EventSource,
    pub data: EventData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    pub raw: String,
    #[serde(default)]
    pub refs: Vec<String>,
}
