//! CircleCI pipeline keywords for test automation.
//!
//! Trigger a pipeline, poll its workflows and assert on their outcome:
//!
//! ```no_run
//! # async fn run() -> circleci_keywords::Result<()> {
//! use circleci_keywords::{CircleCiConfig, CircleCiLibrary, TriggerOptions, WorkflowStatus};
//!
//! let circleci = CircleCiLibrary::new(&CircleCiConfig::with_token("token"))?;
//! let project = circleci.define_project("github", "my-org", "my-repo");
//! let pipeline = circleci
//!     .trigger_pipeline(&project, &TriggerOptions::tag("1.0.2"))
//!     .await?;
//! let pipeline = circleci.get_pipeline(&pipeline.id).await?;
//!
//! while !circleci.all_workflows_stopped(&pipeline).await? {
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//! }
//! circleci
//!     .all_workflows_should_have_the_status(&pipeline, WorkflowStatus::Success)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod keywords;
pub mod model;

pub use client::CircleCiClient;
pub use config::{CircleCiConfig, Config};
pub use error::{CircleCiError, Result};
pub use keywords::{catalogue, CircleCiLibrary, KeywordDoc, TriggerOptions};
pub use model::{GitRef, Pipeline, PipelineError, Project, Vcs, Workflow, WorkflowList, WorkflowStatus};
