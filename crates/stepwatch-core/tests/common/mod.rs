#![allow(dead_code)]

use stepwatch_core::{BuildContext, BuildStatus};

/// A plan as returned by `GET /api/v1/builds/:id/plan`.
pub const PLAN_JSON: &str = r#"{
  "schema": "exec.v2",
  "plan": {
    "id": "6a1",
    "do": [
      {
        "id": "6a2",
        "in_parallel": {
          "steps": [
            {"id": "6a3", "get": {"name": "repo", "type": "git", "resource": "repo"}},
            {"id": "6a4", "get": {"name": "image", "type": "registry-image"}}
          ],
          "limit": 2,
          "fail_fast": false
        }
      },
      {
        "id": "6a5",
        "on_failure": {
          "step": {"id": "6a6", "task": {"name": "unit", "privileged": false}},
          "on_failure": {"id": "6a7", "put": {"name": "slack"}}
        }
      },
      {
        "id": "6a8",
        "try": {
          "step": {
            "id": "6a9",
            "timeout": {"step": {"id": "6aa", "task": {"name": "lint"}}, "duration": "5m"}
          }
        }
      },
      {"id": "6ab", "set_pipeline": {"name": "self"}}
    ]
  }
}"#;

/// The event stream of the build that ran [`PLAN_JSON`].
pub const EVENTS_SSE: &str = "id: 0\n\
event: event\n\
data: {\"data\":{\"time\":1700000000,\"origin\":{\"id\":\"6a3\"}},\"event\":\"initialize-get\",\"version\":\"2.0\"}\n\
\n\
id: 1\n\
event: event\n\
data: {\"data\":{\"time\":1700000002,\"origin\":{\"id\":\"6a3\"}},\"event\":\"start-get\",\"version\":\"1.0\"}\n\
\n\
id: 2\n\
event: event\n\
data: {\"data\":{\"time\":1700000005,\"origin\":{\"id\":\"6a3\"},\"exit_status\":0},\"event\":\"finish-get\",\"version\":\"5.1\"}\n\
\n\
id: 3\n\
event: event\n\
data: {\"data\":{\"time\":1700000003,\"origin\":{\"id\":\"6a4\"}},\"event\":\"start-get\",\"version\":\"1.0\"}\n\
\n\
id: 4\n\
event: event\n\
data: {\"data\":{\"time\":1700000009,\"origin\":{\"id\":\"6a4\"},\"exit_status\":0},\"event\":\"finish-get\",\"version\":\"5.1\"}\n\
\n\
id: 5\n\
event: event\n\
data: {\"data\":{\"time\":1700000010,\"origin\":{\"id\":\"6a6\"}},\"event\":\"initialize-task\",\"version\":\"4.0\"}\n\
\n\
id: 6\n\
event: event\n\
data: {\"data\":{\"time\":1700000011,\"origin\":{\"id\":\"6a6\"}},\"event\":\"start-task\",\"version\":\"5.0\"}\n\
\n\
id: 7\n\
event: event\n\
data: {\"data\":{\"time\":1700000012,\"origin\":{\"id\":\"6a6\",\"source\":\"stdout\"},\"payload\":\"ok\\n\"},\"event\":\"log\",\"version\":\"5.1\"}\n\
\n\
id: 8\n\
event: event\n\
data: {\"data\":{\"time\":1700000071,\"origin\":{\"id\":\"6a6\"},\"exit_status\":0},\"event\":\"finish-task\",\"version\":\"4.0\"}\n\
\n\
id: 9\n\
event: event\n\
data: {\"data\":{\"time\":1700000072,\"origin\":{\"id\":\"6aa\"}},\"event\":\"start-task\",\"version\":\"5.0\"}\n\
\n\
id: 10\n\
event: event\n\
data: {\"data\":{\"status\":\"succeeded\",\"time\":1700000090},\"event\":\"status\",\"version\":\"1.0\"}\n\
\n\
event: end\n\
data:\n\
\n";

/// Context of the build that ran [`PLAN_JSON`].
pub fn create_test_context() -> BuildContext {
    BuildContext {
        id: 4411,
        name: "87".to_string(),
        status: BuildStatus::Succeeded,
        team_name: "main".to_string(),
        pipeline_name: "backend".to_string(),
        job_name: "test".to_string(),
        start_time: Some(1_700_000_000),
        end_time: Some(1_700_000_090),
    }
}
