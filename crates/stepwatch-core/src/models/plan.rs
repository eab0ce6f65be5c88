//! Build plan tree as published by the build server.
//!
//! The wire format spreads every node kind over its own optional field. It is
//! decoded through [`RawPlan`] into the closed [`PlanKind`] sum type, so a node
//! holds exactly one kind and traversal is an exhaustive match. A wire node
//! that populates several kind fields becomes a `do` of one node per kind.

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CollectorError, Result};

/// One node of a build's execution plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPlan")]
pub struct PlanNode {
    /// Node identifier, unique within one plan
    pub id: String,

    /// What this node does
    pub kind: PlanKind,
}

/// The kind of a plan node, carrying only the fields relevant to it.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanKind {
    /// Runs a task
    Task(LeafPlan),
    /// Fetches a resource version
    Get(LeafPlan),
    /// Pushes to a resource
    Put(LeafPlan),
    /// Legacy parallel grouping
    Aggregate(Vec<PlanNode>),
    /// Parallel grouping with optional concurrency limit
    InParallel(InParallelPlan),
    /// Sequential grouping
    Do(Vec<PlanNode>),
    /// Runs `next` when `step` succeeds
    OnSuccess(HookPlan),
    /// Runs `next` when `step` fails
    OnFailure(HookPlan),
    /// Runs `next` when `step` is aborted
    OnAbort(HookPlan),
    /// Runs `next` when `step` errors
    OnError(HookPlan),
    /// Always runs `next` after `step`
    Ensure(HookPlan),
    /// Swallows the failure of `step`
    Try(TryPlan),
    /// Bounds the duration of `step`
    Timeout(TimeoutPlan),
    /// Attempts of the same step, in order
    Retry(Vec<PlanNode>),
    /// A node kind this collector does not track
    Unknown,
}

/// Payload of an executable leaf step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LeafPlan {
    /// Human-readable step name
    #[serde(default)]
    pub name: String,
}

/// Payload of an `in_parallel` node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct InParallelPlan {
    #[serde(default)]
    pub steps: Vec<PlanNode>,

    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub fail_fast: bool,
}

/// Payload of a hook combinator (`on_success`, `ensure`, ...).
///
/// The server names the second branch after the hook itself, so `next` accepts
/// every hook key as an alias.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HookPlan {
    pub step: Box<PlanNode>,

    #[serde(
        alias = "on_success",
        alias = "on_failure",
        alias = "on_abort",
        alias = "on_error",
        alias = "ensure"
    )]
    pub next: Box<PlanNode>,
}

/// Payload of a `try` node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TryPlan {
    pub step: Box<PlanNode>,
}

/// Payload of a `timeout` node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeoutPlan {
    pub step: Box<PlanNode>,

    #[serde(default)]
    pub duration: Option<String>,
}

/// Wire shape of a plan node: one optional field per kind.
#[derive(Deserialize)]
struct RawPlan {
    #[serde(default)]
    id: String,
    task: Option<LeafPlan>,
    get: Option<LeafPlan>,
    put: Option<LeafPlan>,
    aggregate: Option<Vec<PlanNode>>,
    #[serde(alias = "in-parallel")]
    in_parallel: Option<InParallelPlan>,
    #[serde(rename = "do")]
    do_steps: Option<Vec<PlanNode>>,
    #[serde(alias = "on-success")]
    on_success: Option<HookPlan>,
    #[serde(alias = "on-failure")]
    on_failure: Option<HookPlan>,
    #[serde(alias = "on-abort")]
    on_abort: Option<HookPlan>,
    #[serde(alias = "on-error")]
    on_error: Option<HookPlan>,
    ensure: Option<HookPlan>,
    #[serde(rename = "try")]
    try_step: Option<TryPlan>,
    timeout: Option<TimeoutPlan>,
    retry: Option<Vec<PlanNode>>,
}

impl From<RawPlan> for PlanNode {
    fn from(raw: RawPlan) -> Self {
        let candidates = [
            ("task", raw.task.map(PlanKind::Task)),
            ("get", raw.get.map(PlanKind::Get)),
            ("put", raw.put.map(PlanKind::Put)),
            ("aggregate", raw.aggregate.map(PlanKind::Aggregate)),
            ("in_parallel", raw.in_parallel.map(PlanKind::InParallel)),
            ("do", raw.do_steps.map(PlanKind::Do)),
            ("on_success", raw.on_success.map(PlanKind::OnSuccess)),
            ("on_failure", raw.on_failure.map(PlanKind::OnFailure)),
            ("on_abort", raw.on_abort.map(PlanKind::OnAbort)),
            ("on_error", raw.on_error.map(PlanKind::OnError)),
            ("ensure", raw.ensure.map(PlanKind::Ensure)),
            ("try", raw.try_step.map(PlanKind::Try)),
            ("timeout", raw.timeout.map(PlanKind::Timeout)),
            ("retry", raw.retry.map(PlanKind::Retry)),
        ];

        let mut present: Vec<(&str, PlanKind)> = candidates
            .into_iter()
            .filter_map(|(key, kind)| kind.map(|kind| (key, kind)))
            .collect();

        let kind = match present.len() {
            0 => PlanKind::Unknown,
            1 => present.remove(0).1,
            _ => {
                // Every declared kind is kept as a sibling sharing this id.
                let keys: Vec<&str> = present.iter().map(|(key, _)| *key).collect();
                warn!(
                    "Plan node '{}' declares several step kinds ({}), visiting each of them",
                    raw.id,
                    keys.join(", ")
                );
                PlanKind::Do(
                    present
                        .into_iter()
                        .map(|(_, kind)| PlanNode::new(raw.id.clone(), kind))
                        .collect(),
                )
            }
        };

        PlanNode { id: raw.id, kind }
    }
}

impl PlanNode {
    /// Creates a node from its parts.
    pub fn new(id: impl Into<String>, kind: PlanKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Creates a `task` leaf whose id and name are both `name`.
    pub fn task(name: &str) -> Self {
        Self::new(name, PlanKind::Task(LeafPlan::named(name)))
    }

    /// Creates a `get` leaf whose id and name are both `name`.
    pub fn get(name: &str) -> Self {
        Self::new(name, PlanKind::Get(LeafPlan::named(name)))
    }

    /// Creates a `put` leaf whose id and name are both `name`.
    pub fn put(name: &str) -> Self {
        Self::new(name, PlanKind::Put(LeafPlan::named(name)))
    }
}

impl LeafPlan {
    /// Creates a leaf payload with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl HookPlan {
    /// Creates a hook payload from both branches.
    pub fn new(step: PlanNode, next: PlanNode) -> Self {
        Self {
            step: Box::new(step),
            next: Box::new(next),
        }
    }
}

/// Decodes a plan blob.
///
/// Accepts either a bare plan node or the API envelope
/// `{"schema": "...", "plan": {...}}`.
pub fn decode_plan(bytes: &[u8], build_id: Option<u64>) -> Result<PlanNode> {
    let decode_error = |source| CollectorError::PlanDecode { build_id, source };

    let value: Value = serde_json::from_slice(bytes).map_err(decode_error)?;
    let node = match value {
        Value::Object(mut envelope) if envelope.contains_key("plan") => envelope
            .remove("plan")
            .unwrap_or(Value::Null),
        other => other,
    };

    PlanNode::deserialize(node).map_err(decode_error)
}
