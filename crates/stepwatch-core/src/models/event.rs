//! Build event records and their lifecycle phases.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event of a build's event log, as delivered by the server.
///
/// `event` names the kind (`initialize-task`, `log`, ...); `data` is the
/// kind-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    pub event: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub data: Value,
}

/// Lifecycle milestone of a leaf step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initialize,
    Start,
    Finish,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initialize => "initialize",
            Phase::Start => "start",
            Phase::Finish => "finish",
        }
    }
}

/// A timing event reduced to what correlation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub phase: Phase,
    pub origin_id: String,
    pub time: i64,
}

impl EventRecord {
    /// Creates an event record with the given kind and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            version: String::new(),
            data,
        }
    }
}
