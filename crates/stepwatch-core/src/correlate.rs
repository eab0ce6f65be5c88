//! Correlation of classified events with the flattened step map.

use std::collections::HashMap;

use crate::{
    classify::classify,
    error::Result,
    models::{BuildContext, BuildMetric, EventRecord, Phase, StepMap},
};

/// Latest observed time per step id, one map per phase.
#[derive(Debug, Default)]
struct PhaseIndex {
    initialize: HashMap<String, i64>,
    start: HashMap<String, i64>,
    finish: HashMap<String, i64>,
}

impl PhaseIndex {
    fn build(events: &[EventRecord]) -> Result<Self> {
        let mut index = Self::default();
        for event in events {
            if let Some(classified) = classify(event)? {
                index
                    .phase_mut(classified.phase)
                    .insert(classified.origin_id, classified.time);
            }
        }
        Ok(index)
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut HashMap<String, i64> {
        match phase {
            Phase::Initialize => &mut self.initialize,
            Phase::Start => &mut self.start,
            Phase::Finish => &mut self.finish,
        }
    }
}

/// Merges event timestamps onto `steps` and attaches the build context.
///
/// Each timestamp comes from the last event of the matching phase whose origin
/// is the step's id; steps without such an event keep `None`. Events for ids
/// not in `steps` are ignored. The first malformed timing event aborts the
/// whole build.
pub fn correlate(
    steps: StepMap,
    events: &[EventRecord],
    context: &BuildContext,
) -> Result<BuildMetric> {
    let index = PhaseIndex::build(events)?;
    let step_context = context.step_context();

    let steps = steps
        .into_values()
        .map(|mut step| {
            step.initialize_time = index.initialize.get(&step.id).copied();
            step.start_time = index.start.get(&step.id).copied();
            step.finish_time = index.finish.get(&step.id).copied();
            step.context = step_context.clone();
            step
        })
        .collect();

    Ok(BuildMetric::new(context, steps))
}

/// Metric for a build that has no plan.
pub fn empty_metric(context: &BuildContext) -> BuildMetric {
    BuildMetric::new(context, Vec::new())
}
