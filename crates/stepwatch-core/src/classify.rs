//! Event classification by lifecycle phase.

use serde::Deserialize;

use crate::{
    error::{CollectorError, Result},
    models::{ClassifiedEvent, EventRecord, Phase},
};

/// Event kind prefixes that carry step timing, and the phase each maps to.
///
/// Every other kind (`log`, `error`, `status`, ...) is not used for timing.
pub const PHASE_PREFIXES: &[(&str, Phase)] = &[
    ("initialize-", Phase::Initialize),
    ("start-", Phase::Start),
    ("finish-", Phase::Finish),
];

/// Shape shared by every timing event payload.
#[derive(Deserialize)]
struct TimedPayload {
    origin: Origin,
    time: i64,
}

#[derive(Deserialize)]
struct Origin {
    id: String,
}

/// Maps an event kind name to its lifecycle phase.
pub fn phase_of(kind: &str) -> Option<Phase> {
    PHASE_PREFIXES
        .iter()
        .find(|(prefix, _)| kind.starts_with(prefix))
        .map(|(_, phase)| *phase)
}

/// Classifies one event.
///
/// Returns `Ok(None)` for kinds that carry no timing. A timing kind whose
/// payload lacks `origin.id` or `time` is an error: the upstream event format
/// no longer matches.
pub fn classify(event: &EventRecord) -> Result<Option<ClassifiedEvent>> {
    let Some(phase) = phase_of(&event.event) else {
        return Ok(None);
    };

    let payload =
        TimedPayload::deserialize(&event.data).map_err(|source| CollectorError::EventPayload {
            kind: event.event.clone(),
            source,
        })?;

    Ok(Some(ClassifiedEvent {
        phase,
        origin_id: payload.origin.id,
        time: payload.time,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn timed(kind: &str, origin: &str, time: i64) -> EventRecord {
        EventRecord::new(kind, json!({"origin": {"id": origin}, "time": time}))
    }

    #[test]
    fn test_phase_of_prefixes() {
        assert_eq!(phase_of("initialize-task"), Some(Phase::Initialize));
        assert_eq!(phase_of("initialize-get"), Some(Phase::Initialize));
        assert_eq!(phase_of("start-get"), Some(Phase::Start));
        assert_eq!(phase_of("finish-put"), Some(Phase::Finish));
        assert_eq!(phase_of("log"), None);
        assert_eq!(phase_of("error"), None);
        assert_eq!(phase_of("status"), None);
        assert_eq!(phase_of("finish"), None);
    }

    #[test]
    fn test_classify_timing_event() {
        let classified = classify(&timed("start-get", "abc", 12)).unwrap();
        assert_eq!(
            classified,
            Some(ClassifiedEvent {
                phase: Phase::Start,
                origin_id: "abc".to_string(),
                time: 12,
            })
        );
    }

    #[test]
    fn test_classify_ignores_extra_payload_fields() {
        let event = EventRecord::new(
            "finish-task",
            json!({"origin": {"id": "t", "source": "stdout"}, "time": 99, "exit_status": 1}),
        );
        let classified = classify(&event).unwrap().unwrap();
        assert_eq!(classified.phase, Phase::Finish);
        assert_eq!(classified.time, 99);
    }

    #[test]
    fn test_classify_non_timing_events() {
        let log = EventRecord::new("log", json!({"origin": {"id": "t"}, "payload": "hi"}));
        assert_eq!(classify(&log).unwrap(), None);

        let error = EventRecord::new("error", json!({"message": "boom"}));
        assert_eq!(classify(&error).unwrap(), None);
    }

    #[test]
    fn test_classify_malformed_timing_payload_is_error() {
        let missing_origin = EventRecord::new("initialize-task", json!({"time": 5}));
        let err = classify(&missing_origin).unwrap_err();
        match err {
            CollectorError::EventPayload { kind, .. } => assert_eq!(kind, "initialize-task"),
            other => panic!("expected payload error, got {other:?}"),
        }

        let bad_time = EventRecord::new(
            "finish-get",
            json!({"origin": {"id": "g"}, "time": "yesterday"}),
        );
        assert!(classify(&bad_time).is_err());
    }
}
