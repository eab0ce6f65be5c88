//! Step descriptor model: one record per executed leaf step.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of an executable leaf step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Task,
    Get,
    Put,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Task => "task",
            StepKind::Get => "get",
            StepKind::Put => "put",
        }
    }
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(StepKind::Task),
            "get" => Ok(StepKind::Get),
            "put" => Ok(StepKind::Put),
            _ => Err(format!("Invalid step kind: {s}")),
        }
    }
}

/// Build-scoped context copied onto every step of a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepContext {
    #[serde(default)]
    pub build_id: u64,

    #[serde(default)]
    pub build_name: String,

    #[serde(default)]
    pub build_status: String,

    #[serde(default)]
    pub team_name: String,

    #[serde(default)]
    pub pipeline_name: String,

    #[serde(default)]
    pub job_name: String,
}

/// Timing record for one leaf step of one build.
///
/// Timestamps are Unix epoch seconds. `None` means no event of that phase was
/// observed for the step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Identifier of the originating plan node
    pub id: String,

    /// Display name of the step
    pub name: String,

    /// Leaf kind
    #[serde(rename = "type")]
    pub kind: StepKind,

    pub initialize_time: Option<i64>,

    pub start_time: Option<i64>,

    pub finish_time: Option<i64>,

    /// Build context, attached after correlation
    #[serde(flatten)]
    pub context: StepContext,
}

/// Flattened step map of one build, keyed by step id.
pub type StepMap = BTreeMap<String, StepDescriptor>;

impl StepDescriptor {
    /// Creates a descriptor with no timestamps and empty context.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            initialize_time: None,
            start_time: None,
            finish_time: None,
            context: StepContext::default(),
        }
    }

    /// Seconds between start and finish, when both were observed and the
    /// difference fits in an `i64`.
    pub fn duration(&self) -> Option<i64> {
        match (self.start_time, self.finish_time) {
            (Some(start), Some(finish)) => finish.checked_sub(start),
            _ => None,
        }
    }

    /// Metric tags identifying this step and its build.
    pub fn tags(&self) -> Vec<String> {
        let context = &self.context;
        vec![
            format!("job-name:{}", context.job_name),
            format!("build-name:{}", context.build_name),
            format!("build-id:{}", context.build_id),
            format!("build-status:{}", context.build_status),
            format!("pipeline-name:{}", context.pipeline_name),
            format!("team-name:{}", context.team_name),
            format!("task-type:{}", self.kind.as_str()),
            format!("task-name:{}", self.name),
            format!("task-id:{}", self.id),
        ]
    }
}
