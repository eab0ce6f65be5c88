//! Data models for plans, events, steps and builds.
//!
//! Inputs ([`PlanNode`], [`EventRecord`], [`Build`]) mirror what the build
//! server publishes and are read-only. Outputs ([`StepDescriptor`],
//! [`BuildMetric`]) are what the collector emits. Display implementations live
//! in [`crate::display`].

pub mod build;
pub mod event;
pub mod plan;
pub mod step;


pub use build::{Build, BuildContext, BuildMetric, BuildStatus, Job, Pipeline};
pub use event::{ClassifiedEvent, EventRecord, Phase};
pub use plan::{
    decode_plan, HookPlan, InParallelPlan, LeafPlan, PlanKind, PlanNode, TimeoutPlan, TryPlan,
};
pub use step::{StepContext, StepDescriptor, StepKind, StepMap};
