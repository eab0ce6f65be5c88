//! Plan flattening: plan tree to a flat map of leaf steps.

use crate::models::{PlanKind, PlanNode, StepDescriptor, StepKind, StepMap};

/// Collects every leaf step (`task`, `get`, `put`) reachable from `root`.
///
/// Composite nodes are transparent: their ids are dropped and all of their
/// children are visited, including both branches of every hook. The walk is
/// depth-first and left-to-right on an explicit stack, so plan depth does not
/// grow the call stack. A leaf id seen twice keeps the later visit.
pub fn flatten(root: &PlanNode) -> StepMap {
    let mut steps = StepMap::new();
    let mut pending: Vec<&PlanNode> = vec![root];

    while let Some(node) = pending.pop() {
        let (leaf, kind) = match &node.kind {
            PlanKind::Task(leaf) => (leaf, StepKind::Task),
            PlanKind::Get(leaf) => (leaf, StepKind::Get),
            PlanKind::Put(leaf) => (leaf, StepKind::Put),
            PlanKind::Aggregate(children) | PlanKind::Do(children) | PlanKind::Retry(children) => {
                push_in_order(&mut pending, children);
                continue;
            }
            PlanKind::InParallel(parallel) => {
                push_in_order(&mut pending, &parallel.steps);
                continue;
            }
            PlanKind::OnSuccess(hook)
            | PlanKind::OnFailure(hook)
            | PlanKind::OnAbort(hook)
            | PlanKind::OnError(hook)
            | PlanKind::Ensure(hook) => {
                pending.push(&hook.next);
                pending.push(&hook.step);
                continue;
            }
            PlanKind::Try(wrapped) => {
                pending.push(&wrapped.step);
                continue;
            }
            PlanKind::Timeout(wrapped) => {
                pending.push(&wrapped.step);
                continue;
            }
            PlanKind::Unknown => continue,
        };

        steps.insert(
            node.id.clone(),
            StepDescriptor::new(node.id.as_str(), leaf.name.as_str(), kind),
        );
    }

    steps
}

// Reversed so that the first child is popped first.
fn push_in_order<'a>(pending: &mut Vec<&'a PlanNode>, children: &'a [PlanNode]) {
    pending.extend(children.iter().rev());
}
