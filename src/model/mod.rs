//! Typed CircleCI resources and the mapping from raw API JSON.

mod fields;
mod pipeline;
mod project;
mod workflow;

pub use fields::{PIPELINE_TIMESTAMP_FORMAT, WORKFLOW_TIMESTAMP_FORMAT};
pub(crate) use fields::items_of;
pub use pipeline::{GitRef, Pipeline, PipelineError, Vcs};
pub use project::Project;
pub use workflow::{Workflow, WorkflowList, WorkflowStatus};
