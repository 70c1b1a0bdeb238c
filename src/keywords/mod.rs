//! Test-automation keywords over the CircleCI pipeline API.
//!
//! Each keyword performs at most one request, maps the response into
//! [`crate::model`] types and turns unmet expectations into errors a test
//! runner can report as failures.

mod catalogue;
mod options;


pub use catalogue::{catalogue, KeywordDoc};
pub use options::TriggerOptions;

use log::{debug, info};

use crate::client::CircleCiClient;
use crate::config::CircleCiConfig;
use crate::error::{CircleCiError, Result};
use crate::model::{items_of, Pipeline, Project, WorkflowList, WorkflowStatus};

/// The keyword library.
///
/// Holds one API client for its whole lifetime; nothing is cached between
/// calls, so polling keywords always see the current provider state.
pub struct CircleCiLibrary {
    client: CircleCiClient,
}

impl CircleCiLibrary {
    /// Creates the library from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no token is configured and `introspection_only`
    /// is not set, or if the base URL is invalid.
    pub fn new(config: &CircleCiConfig) -> Result<Self> {
        let token = config.token.clone().filter(|t| !t.trim().is_empty());

        if token.is_none() {
            if !config.introspection_only {
                return Err(CircleCiError::Config(
                    "a CircleCI API token is required".to_string(),
                ));
            }
            info!("Creating CircleCI library without credentials (introspection only)");
        }

        let client = CircleCiClient::new(&config.base_url, token)?;
        debug!("CircleCI API at {}", client.api_url());

        Ok(Self { client })
    }

    pub fn keywords(&self) -> &'static [KeywordDoc] {
        catalogue()
    }

    pub fn define_project(&self, vcs_type: &str, username: &str, reponame: &str) -> Project {
        Project::new(vcs_type, username, reponame)
    }

    /// Triggers a pipeline for `project`.
    ///
    /// The returned pipeline is partial: re-fetch it with [`Self::get_pipeline`]
    /// before relying on `vcs` or `errors`.
    pub async fn trigger_pipeline(
        &self,
        project: &Project,
        options: &TriggerOptions,
    ) -> Result<Pipeline> {
        let slug = project.slug();
        info!("Triggering pipeline for project: {slug}");

        let response = self
            .client
            .trigger_pipeline(&slug, options.revision().as_ref(), &options.parameters)
            .await?;

        let pipeline = Pipeline::from_json(&response)?;
        info!("Triggered pipeline {pipeline} for {slug}");
        Ok(pipeline)
    }

    pub async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        ensure_pipeline_id(pipeline_id)?;
        let response = self.client.get_pipeline(pipeline_id).await?;
        Pipeline::from_json(&response)
    }

    pub async fn get_workflows(&self, pipeline: &Pipeline) -> Result<WorkflowList> {
        ensure_pipeline_id(&pipeline.id)?;
        let response = self.client.get_pipeline_workflows(&pipeline.id).await?;
        let workflows = WorkflowList::from_json(&response)?;
        debug!("Pipeline {pipeline} has {} workflows", workflows.len());
        Ok(workflows)
    }

    pub async fn all_workflows_stopped(&self, pipeline: &Pipeline) -> Result<bool> {
        Ok(self.get_workflows(pipeline).await?.all_stopped())
    }

    /// # Errors
    ///
    /// Returns `WorkflowRunning` if a workflow is still running or the
    /// pipeline has no workflows yet.
    pub async fn all_workflows_should_be_stopped(&self, pipeline: &Pipeline) -> Result<()> {
        if self.all_workflows_stopped(pipeline).await? {
            Ok(())
        } else {
            Err(CircleCiError::WorkflowRunning {
                pipeline: pipeline.to_string(),
            })
        }
    }

    pub async fn all_workflows_have_status(
        &self,
        pipeline: &Pipeline,
        status: WorkflowStatus,
    ) -> Result<bool> {
        Ok(self.get_workflows(pipeline).await?.all_have_status(status))
    }

    /// # Errors
    ///
    /// Returns `WorkflowStatus` if any workflow has a different status.
    pub async fn all_workflows_should_have_the_status(
        &self,
        pipeline: &Pipeline,
        status: WorkflowStatus,
    ) -> Result<()> {
        if self.all_workflows_have_status(pipeline, status).await? {
            Ok(())
        } else {
            Err(CircleCiError::WorkflowStatus {
                pipeline: pipeline.to_string(),
                status,
            })
        }
    }

    /// Checks stop state and status against a single workflow listing.
    pub async fn all_workflows_stopped_with_status(
        &self,
        pipeline: &Pipeline,
        status: WorkflowStatus,
    ) -> Result<bool> {
        let workflows = self.get_workflows(pipeline).await?;
        Ok(workflows.all_stopped() && workflows.all_have_status(status))
    }

    /// # Errors
    ///
    /// Returns `WorkflowStatus` unless all workflows stopped with `status`.
    pub async fn all_workflows_should_be_stopped_with_status(
        &self,
        pipeline: &Pipeline,
        status: WorkflowStatus,
    ) -> Result<()> {
        if self.all_workflows_stopped_with_status(pipeline, status).await? {
            Ok(())
        } else {
            Err(CircleCiError::WorkflowStatus {
                pipeline: pipeline.to_string(),
                status,
            })
        }
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let response = self.client.get_projects().await?;
        let projects = items_of(&response, "projects")?
            .iter()
            .map(Project::from_json)
            .collect::<Result<Vec<_>>>()?;
        debug!("Listed {} projects", projects.len());
        Ok(projects)
    }

    /// Returns the first listed project whose `reponame` equals `name`.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if no project matches.
    pub async fn get_project(&self, name: &str) -> Result<Project> {
        self.get_projects()
            .await?
            .into_iter()
            .find(|project| project.reponame == name)
            .ok_or_else(|| CircleCiError::ProjectNotFound(name.to_string()))
    }
}

fn ensure_pipeline_id(pipeline_id: &str) -> Result<()> {
    if pipeline_id.trim().is_empty() {
        return Err(CircleCiError::InvalidArgument(
            "pipeline_id must not be empty".to_string(),
        ));
    }
    Ok(())
}
