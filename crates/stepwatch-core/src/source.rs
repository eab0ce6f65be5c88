//! The seam between the collector and the build server.

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{Build, EventRecord, PlanNode},
};

/// Where builds, plans and event logs come from.
///
/// [`crate::concourse::ConcourseClient`] is the production implementation.
#[async_trait]
pub trait BuildSource: Send + Sync {
    /// Finished, pipeline-attached builds that ended after `cutoff` (Unix
    /// epoch seconds).
    async fn completed_builds(&self, cutoff: i64) -> Result<Vec<Build>>;

    /// The build's plan, or `None` when the build has none.
    async fn build_plan(&self, build_id: u64) -> Result<Option<PlanNode>>;

    /// The build's complete event log in delivery order.
    async fn build_events(&self, build_id: u64) -> Result<Vec<EventRecord>>;
}
