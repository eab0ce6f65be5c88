use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::models::{BuildStatus, HookPlan, PlanKind};

#[derive(Default)]
struct FakeSource {
    builds: Vec<Build>,
    plans: HashMap<u64, PlanNode>,
    events: HashMap<u64, Vec<EventRecord>>,
    event_requests: AtomicUsize,
}

#[async_trait]
impl BuildSource for FakeSource {
    async fn completed_builds(&self, cutoff: i64) -> Result<Vec<Build>> {
        Ok(self
            .builds
            .iter()
            .filter(|build| build.qualifies(cutoff))
            .cloned()
            .collect())
    }

    async fn build_plan(&self, build_id: u64) -> Result<Option<PlanNode>> {
        Ok(self.plans.get(&build_id).cloned())
    }

    async fn build_events(&self, build_id: u64) -> Result<Vec<EventRecord>> {
        self.event_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.events.get(&build_id).cloned().unwrap_or_default())
    }
}

struct RejectingSink;

#[async_trait]
impl MetricSink for RejectingSink {
    async fn emit(&mut self, _metric: &BuildMetric) -> Result<()> {
        Err(CollectorError::Publish {
            message: "rejected".to_string(),
        })
    }
}

fn create_test_build(id: u64, minutes_ago: i64) -> Build {
    Build {
        id,
        name: id.to_string(),
        status: BuildStatus::Succeeded,
        team_name: "main".to_string(),
        pipeline_name: "ci".to_string(),
        job_name: "unit".to_string(),
        start_time: Some(Timestamp::now().as_second() - minutes_ago * 60 - 30),
        end_time: Some(Timestamp::now().as_second() - minutes_ago * 60),
    }
}

fn timed(kind: &str, origin: &str, time: i64) -> EventRecord {
    EventRecord::new(kind, json!({"origin": {"id": origin}, "time": time}))
}

fn create_test_plan() -> PlanNode {
    PlanNode::new(
        "hook",
        PlanKind::Ensure(HookPlan::new(PlanNode::task("test"), PlanNode::put("notify"))),
    )
}

fn create_test_events() -> Vec<EventRecord> {
    vec![
        timed("initialize-task", "test", 100),
        timed("start-task", "test", 101),
        EventRecord::new("log", json!({"origin": {"id": "test"}, "payload": "ok"})),
        timed("finish-task", "test", 130),
        timed("start-put", "notify", 131),
        timed("finish-put", "notify", 135),
    ]
}

fn create_test_source() -> FakeSource {
    let mut source = FakeSource::default();
    for id in [1, 2] {
        source.builds.push(create_test_build(id, 5));
        source.plans.insert(id, create_test_plan());
        source.events.insert(id, create_test_events());
    }
    source
}

async fn create_test_collector(dir: &TempDir, source: FakeSource) -> Collector<FakeSource> {
    CollectorBuilder::new(source)
        .with_cache_path(Some(dir.path().join("cache.db")))
        .build()
        .await
        .expect("Failed to build collector")
}

#[test]
fn test_replay_without_plan_is_empty() {
    let context = BuildContext {
        id: 4,
        ..BuildContext::default()
    };
    let metric = replay(None, &create_test_events(), &context).unwrap();
    assert_eq!(metric.id, 4);
    assert!(metric.steps.is_empty());
}

#[test]
fn test_cutoff_rejects_negative_window() {
    let params = CollectParams {
        since: SignedDuration::from_secs(-1),
        ..CollectParams::default()
    };
    let err = cutoff(Timestamp::UNIX_EPOCH, &params).unwrap_err();
    assert!(matches!(err, CollectorError::InvalidInput { .. }));
}

#[test]
fn test_cutoff_subtracts_window() {
    let now = Timestamp::from_second(10_000).unwrap();
    let cut = cutoff(now, &CollectParams::default()).unwrap();
    assert_eq!(cut.as_second(), 10_000 - 3600);
}

#[tokio::test]
async fn test_collect_build_correlates_steps() {
    let dir = TempDir::new().unwrap();
    let collector = create_test_collector(&dir, create_test_source()).await;

    let build = create_test_build(1, 5);
    let metric = collector.collect_build(&build).await.unwrap();

    assert_eq!(metric.steps.len(), 2);
    let test = metric.step("test").unwrap();
    assert_eq!(test.initialize_time, Some(100));
    assert_eq!(test.duration(), Some(29));
    assert_eq!(test.context.job_name, "unit");

    let notify = metric.step("notify").unwrap();
    assert_eq!(notify.initialize_time, None);
    assert_eq!(notify.duration(), Some(4));
}

#[tokio::test]
async fn test_collect_build_without_plan_skips_events() {
    let dir = TempDir::new().unwrap();
    let mut source = create_test_source();
    source.plans.remove(&2);
    let collector = create_test_collector(&dir, source).await;

    let metric = collector
        .collect_build(&create_test_build(2, 5))
        .await
        .unwrap();

    assert!(metric.steps.is_empty());
    assert_eq!(collector.source().event_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_run_emits_then_skips_cached_builds() {
    let dir = TempDir::new().unwrap();
    let collector = create_test_collector(&dir, create_test_source()).await;
    let params = CollectParams::default();

    let mut emitted: Vec<BuildMetric> = Vec::new();
    let summary = collector.run(&params, &mut emitted).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            emitted: 2,
            skipped: 0,
            failed: 0
        }
    );
    assert_eq!(emitted.len(), 2);
    assert!(collector.cache().is_processed(1).await.unwrap());

    let mut second: Vec<BuildMetric> = Vec::new();
    let summary = collector.run(&params, &mut second).await.unwrap();
    assert_eq!(summary.emitted, 0);
    assert_eq!(summary.skipped, 2);
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_run_ignore_cache_collects_again() {
    let dir = TempDir::new().unwrap();
    let collector = create_test_collector(&dir, create_test_source()).await;
    collector.cache().mark_processed(1).await.unwrap();

    let params = CollectParams {
        ignore_cache: true,
        ..CollectParams::default()
    };
    let mut emitted: Vec<BuildMetric> = Vec::new();
    let summary = collector.run(&params, &mut emitted).await.unwrap();

    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn test_run_only_lists_builds_inside_window() {
    let dir = TempDir::new().unwrap();
    let mut source = create_test_source();
    source.builds.push(create_test_build(3, 120));
    let mut running = create_test_build(4, 1);
    running.status = BuildStatus::Started;
    source.builds.push(running);
    let mut one_off = create_test_build(5, 1);
    one_off.job_name.clear();
    source.builds.push(one_off);
    let collector = create_test_collector(&dir, source).await;

    let mut emitted: Vec<BuildMetric> = Vec::new();
    collector
        .run(&CollectParams::default(), &mut emitted)
        .await
        .unwrap();

    let ids: Vec<u64> = emitted.iter().map(|metric| metric.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_run_counts_failed_builds_and_continues() {
    let dir = TempDir::new().unwrap();
    let mut source = create_test_source();
    source.events.insert(
        1,
        vec![EventRecord::new("start-task", json!({"time": 5}))],
    );
    let collector = create_test_collector(&dir, source).await;

    let mut emitted: Vec<BuildMetric> = Vec::new();
    let summary = collector
        .run(&CollectParams::default(), &mut emitted)
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.emitted, 1);
    assert_eq!(emitted[0].id, 2);
    assert!(!collector.cache().is_processed(1).await.unwrap());
}

#[tokio::test]
async fn test_run_fail_fast_returns_error() {
    let dir = TempDir::new().unwrap();
    let mut source = create_test_source();
    source.events.insert(
        1,
        vec![EventRecord::new("finish-get", json!({"origin": {}}))],
    );
    let collector = create_test_collector(&dir, source).await;

    let params = CollectParams {
        fail_fast: true,
        ..CollectParams::default()
    };
    let mut emitted: Vec<BuildMetric> = Vec::new();
    let err = collector.run(&params, &mut emitted).await.unwrap_err();

    assert!(matches!(err, CollectorError::EventPayload { .. }));
    assert!(emitted.is_empty());
}

#[tokio::test]
async fn test_run_sink_failure_aborts_without_caching() {
    let dir = TempDir::new().unwrap();
    let collector = create_test_collector(&dir, create_test_source()).await;

    let err = collector
        .run(&CollectParams::default(), &mut RejectingSink)
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::Publish { .. }));
    assert!(collector.cache().list().await.unwrap().is_empty());
}
