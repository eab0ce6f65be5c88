//! Orchestration of a collection run.
//!
//! A run lists the builds that finished inside the look-back window, skips
//! the ones the [`ScanCache`] already records, and for every other build
//! flattens its plan, correlates its event log and hands the resulting
//! [`BuildMetric`] to a [`MetricSink`]. A build is marked processed only after
//! the sink accepted it.
//!
//! ```text
//! BuildSource ──▶ flatten ──▶ correlate ──▶ MetricSink
//!      │                                        │
//!      └────────── ScanCache (skip) ◀───────────┘ (mark)
//! ```

use jiff::Timestamp;
use log::{debug, info, warn};

use crate::{
    correlate::{correlate, empty_metric},
    error::{CollectorError, Result},
    flatten::flatten,
    models::{Build, BuildContext, BuildMetric, EventRecord, PlanNode},
    params::CollectParams,
    sink::MetricSink,
    source::BuildSource,
};

pub mod builder;
pub mod cache;

#[cfg(test)]
mod tests;

pub use builder::CollectorBuilder;
pub use cache::ScanCache;

/// Counts of what a run did with each qualifying build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Builds handed to the sink
    pub emitted: usize,

    /// Builds already in the cache
    pub skipped: usize,

    /// Builds whose plan or events could not be processed
    pub failed: usize,
}

/// Computes the metric of one build from its plan and event log.
///
/// A build without a plan yields a metric with no steps.
pub fn replay(
    plan: Option<&PlanNode>,
    events: &[EventRecord],
    context: &BuildContext,
) -> Result<BuildMetric> {
    match plan {
        Some(plan) => correlate(flatten(plan), events, context),
        None => Ok(empty_metric(context)),
    }
}

/// Collects step metrics from a build source.
pub struct Collector<S> {
    source: S,
    cache: ScanCache,
}

impl<S: BuildSource> Collector<S> {
    pub(crate) fn new(source: S, cache: ScanCache) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Fetches one build's plan and events and computes its metric.
    ///
    /// Events are not fetched for builds without a plan.
    pub async fn collect_build(&self, build: &Build) -> Result<BuildMetric> {
        let context = BuildContext::from(build);

        let Some(plan) = self.source.build_plan(build.id).await? else {
            debug!("Build {} has no plan", build.id);
            return Ok(empty_metric(&context));
        };

        let events = self.source.build_events(build.id).await?;
        debug!("Build {}: {} events", build.id, events.len());
        replay(Some(&plan), &events, &context)
    }

    /// Runs one collection pass over the builds that ended within
    /// `params.since`.
    ///
    /// # Errors
    ///
    /// Listing, cache and sink failures abort the run. A build that cannot be
    /// collected is logged and counted as failed, unless `params.fail_fast` is
    /// set, in which case its error is returned.
    pub async fn run<K: MetricSink>(
        &self,
        params: &CollectParams,
        sink: &mut K,
    ) -> Result<RunSummary> {
        let cutoff = cutoff(Timestamp::now(), params)?;
        let builds = self.source.completed_builds(cutoff.as_second()).await?;
        info!("{} builds finished since {cutoff}", builds.len());

        let mut summary = RunSummary::default();
        for build in &builds {
            if !params.ignore_cache && self.cache.is_processed(build.id).await? {
                debug!("Build {} already processed", build.id);
                summary.skipped += 1;
                continue;
            }

            let metric = match self.collect_build(build).await {
                Ok(metric) => metric,
                Err(e) if !params.fail_fast => {
                    warn!("Skipping build {}: {e}", build.id);
                    summary.failed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            sink.emit(&metric).await?;
            self.cache.mark_processed(build.id).await?;
            summary.emitted += 1;
        }

        info!(
            "Run finished: {} emitted, {} skipped, {} failed",
            summary.emitted, summary.skipped, summary.failed
        );
        Ok(summary)
    }
}

fn cutoff(now: Timestamp, params: &CollectParams) -> Result<Timestamp> {
    if params.since.is_negative() {
        return Err(CollectorError::invalid_input("since").with_reason("must not be negative"));
    }
    now.checked_sub(params.since)
        .map_err(|e| CollectorError::invalid_input("since").with_reason(e.to_string()))
}
