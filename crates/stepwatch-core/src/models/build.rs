//! Build records and the per-build metric batch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{StepContext, StepDescriptor};

/// Type-safe enumeration of build statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// Build is queued
    Pending,

    /// Build is running
    Started,

    /// Build completed successfully
    Succeeded,

    /// A step of the build failed
    Failed,

    /// The build hit an infrastructure error
    Errored,

    /// The build was aborted
    Aborted,

    /// Status reported by a newer server
    #[default]
    #[serde(other)]
    Unknown,
}

impl FromStr for BuildStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BuildStatus::Pending),
            "started" => Ok(BuildStatus::Started),
            "succeeded" => Ok(BuildStatus::Succeeded),
            "failed" => Ok(BuildStatus::Failed),
            "errored" => Ok(BuildStatus::Errored),
            "aborted" => Ok(BuildStatus::Aborted),
            "unknown" => Ok(BuildStatus::Unknown),
            _ => Err(format!("Invalid build status: {s}")),
        }
    }
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Started => "started",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed => "failed",
            BuildStatus::Errored => "errored",
            BuildStatus::Aborted => "aborted",
            BuildStatus::Unknown => "unknown",
        }
    }

    /// Whether the build has not reached a final state yet.
    pub fn is_running(&self) -> bool {
        matches!(self, BuildStatus::Pending | BuildStatus::Started)
    }
}

/// A pipeline of a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pipeline {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub team_name: String,

    #[serde(default)]
    pub paused: bool,
}

/// A job within a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub pipeline_name: String,

    #[serde(default)]
    pub team_name: String,
}

/// A build as listed by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Build {
    pub id: u64,

    /// Build number within its job
    pub name: String,

    #[serde(default)]
    pub status: BuildStatus,

    #[serde(default)]
    pub team_name: String,

    /// Empty for one-off builds
    #[serde(default)]
    pub pipeline_name: String,

    /// Empty for one-off builds
    #[serde(default)]
    pub job_name: String,

    /// Unix epoch seconds
    #[serde(default)]
    pub start_time: Option<i64>,

    /// Unix epoch seconds
    #[serde(default)]
    pub end_time: Option<i64>,
}

impl Build {
    /// Whether this build was run outside of any pipeline job.
    pub fn is_one_off(&self) -> bool {
        self.job_name.is_empty()
    }

    /// Whether the build is finished, attached to a job, and ended strictly
    /// after `cutoff` (epoch seconds).
    pub fn qualifies(&self, cutoff: i64) -> bool {
        if self.status.is_running() || self.is_one_off() {
            return false;
        }

        self.end_time.is_some_and(|end| end > cutoff)
    }
}

/// Build-level fields attached to a metric batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildContext {
    pub id: u64,
    pub name: String,
    pub status: BuildStatus,
    pub team_name: String,
    pub pipeline_name: String,
    pub job_name: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl From<&Build> for BuildContext {
    fn from(build: &Build) -> Self {
        Self {
            id: build.id,
            name: build.name.clone(),
            status: build.status,
            team_name: build.team_name.clone(),
            pipeline_name: build.pipeline_name.clone(),
            job_name: build.job_name.clone(),
            start_time: build.start_time,
            end_time: build.end_time,
        }
    }
}

impl BuildContext {
    /// Context fields copied onto each step of this build.
    pub fn step_context(&self) -> StepContext {
        StepContext {
            build_id: self.id,
            build_name: self.name.clone(),
            build_status: self.status.as_str().to_string(),
            team_name: self.team_name.clone(),
            pipeline_name: self.pipeline_name.clone(),
            job_name: self.job_name.clone(),
        }
    }
}

/// Per-build output unit: build context plus one descriptor per leaf step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildMetric {
    pub id: u64,
    pub name: String,
    pub status: BuildStatus,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub team_name: String,
    pub pipeline_name: String,
    pub job_name: String,

    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
}

impl BuildMetric {
    /// Creates a metric with the given context and steps.
    pub fn new(context: &BuildContext, steps: Vec<StepDescriptor>) -> Self {
        Self {
            id: context.id,
            name: context.name.clone(),
            status: context.status,
            start_time: context.start_time,
            end_time: context.end_time,
            team_name: context.team_name.clone(),
            pipeline_name: context.pipeline_name.clone(),
            job_name: context.job_name.clone(),
            steps,
        }
    }

    /// Looks up a step by its id.
    pub fn step(&self, id: &str) -> Option<&StepDescriptor> {
        self.steps.iter().find(|step| step.id == id)
    }
}
