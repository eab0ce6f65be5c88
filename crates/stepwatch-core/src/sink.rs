//! Destinations for per-build metrics.

use async_trait::async_trait;

use crate::{error::Result, models::BuildMetric};

/// Receives each build's metric once it has been collected.
///
/// A build is only recorded as processed after `emit` succeeds.
#[async_trait]
pub trait MetricSink: Send {
    async fn emit(&mut self, metric: &BuildMetric) -> Result<()>;
}

/// Accumulates metrics in memory.
#[async_trait]
impl MetricSink for Vec<BuildMetric> {
    async fn emit(&mut self, metric: &BuildMetric) -> Result<()> {
        self.push(metric.clone());
        Ok(())
    }
}
