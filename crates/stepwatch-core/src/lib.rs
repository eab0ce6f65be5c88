//! Core library for collecting per-step timing metrics from Concourse builds.
//!
//! A build's plan is a tree of composite and leaf steps; its event log
//! records when each leaf step was initialized, started and finished. This
//! crate flattens the plan into one [`StepDescriptor`] per leaf, classifies
//! the events by phase, and correlates the two into a [`BuildMetric`] that a
//! [`MetricSink`] can publish.
//!
//! # Layers
//!
//! - **Core** ([`flatten`], [`classify`], [`correlate`]): pure functions over
//!   decoded plans and events
//! - **Sources** ([`source`], [`concourse`]): where builds, plans and events
//!   come from
//! - **Sinks** ([`sink`], [`datadog`]): where metrics go
//! - **Orchestration** ([`collector`]): the scan loop and its
//!   processed-build cache ([`db`])
//!
//! # Quick Start
//!
//! ```rust
//! use stepwatch_core::{flatten::flatten, models::PlanNode, StepKind};
//!
//! let steps = flatten(&PlanNode::task("unit"));
//! assert_eq!(steps["unit"].kind, StepKind::Task);
//! ```
//!
//! A full collection run:
//!
//! ```rust,no_run
//! use stepwatch_core::{
//!     BuildMetric, CollectParams, CollectorBuilder, ConcourseClient, Config,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(Config::default_path()?)?;
//! let client = ConcourseClient::connect(&config.concourse).await?;
//! let collector = CollectorBuilder::new(client).build().await?;
//!
//! let mut metrics: Vec<BuildMetric> = Vec::new();
//! let summary = collector.run(&CollectParams::default(), &mut metrics).await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod collector;
pub mod concourse;
pub mod config;
pub mod correlate;
pub mod datadog;
pub mod db;
pub mod display;
pub mod error;
pub mod flatten;
pub mod models;
pub mod params;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use collector::{replay, Collector, CollectorBuilder, RunSummary, ScanCache};
pub use concourse::ConcourseClient;
pub use config::{ConcourseConfig, Config, DatadogConfig};
pub use datadog::DatadogSink;
pub use db::{Database, ProcessedBuild};
pub use display::{Elapsed, EpochTime, LocalDateTime, ProcessedBuilds};
pub use error::{CollectorError, Result};
pub use models::{
    Build, BuildContext, BuildMetric, BuildStatus, EventRecord, Phase, PlanNode, StepDescriptor,
    StepKind, StepMap,
};
pub use params::CollectParams;
pub use sink::MetricSink;
pub use source::BuildSource;
