use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use circleci_keywords::{
    CircleCiLibrary, Config, Pipeline, TriggerOptions, WorkflowStatus,
};

use crate::output;

#[derive(Parser)]
#[command(name = "circleci-keywords")]
#[command(author, version, about = "CircleCI pipeline keywords for test automation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./circleci-keywords.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, env = "CIRCLECI_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(short, long, global = true, env = "CIRCLECI_BASE_URL")]
    url: Option<String>,

    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// List the keywords of the library (no token needed)
    Keywords,

    /// Trigger a pipeline
    Trigger {
        #[arg(long, default_value = "github")]
        vcs: String,

        #[arg(short, long)]
        org: String,

        #[arg(short, long)]
        repo: String,

        #[arg(short, long, conflicts_with = "tag")]
        branch: Option<String>,

        #[arg(long)]
        tag: Option<String>,

        /// Pipeline parameter as key=value; the value is read as JSON if possible
        #[arg(long = "param", value_parser = parse_parameter)]
        params: Vec<(String, Value)>,
    },

    /// Fetch a pipeline
    Pipeline { pipeline_id: String },

    /// List the workflows of a pipeline
    Workflows { pipeline_id: String },

    /// Print whether all workflows of a pipeline stopped
    Stopped { pipeline_id: String },

    /// Fail unless all workflows of a pipeline stopped
    ShouldBeStopped { pipeline_id: String },

    /// Print whether all workflows of a pipeline have a status
    HasStatus {
        pipeline_id: String,
        status: WorkflowStatus,
    },

    /// Fail unless all workflows of a pipeline have a status
    ShouldHaveStatus {
        pipeline_id: String,
        status: WorkflowStatus,
    },

    /// Fail unless all workflows of a pipeline stopped with a status
    StoppedWithStatus {
        pipeline_id: String,
        status: WorkflowStatus,
    },

    /// List followed projects
    Projects,

    /// Find a followed project by repository name
    Project { name: String },
}

fn parse_parameter(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("parameter name missing in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl Cli {
    fn library(&self) -> Result<CircleCiLibrary> {
        let mut config = Config::load(self.config.as_deref())?
            .with_overrides(self.token.clone(), self.url.clone())
            .circleci;

        if matches!(self.command, Commands::Keywords) {
            config.introspection_only = true;
        }

        CircleCiLibrary::new(&config).context("Failed to set up the CircleCI library")
    }

    fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce(&T) -> String) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Table => table(value),
            OutputFormat::Json if self.pretty => serde_json::to_string_pretty(value)?,
            OutputFormat::Json => serde_json::to_string(value)?,
        };
        println!("{rendered}");
        Ok(())
    }

    async fn pipeline(circleci: &CircleCiLibrary, pipeline_id: &str) -> Result<Pipeline> {
        circleci
            .get_pipeline(pipeline_id)
            .await
            .with_context(|| format!("Failed to fetch pipeline {pipeline_id}"))
    }

    pub async fn execute(&self) -> Result<()> {
        let circleci = self.library()?;

        match &self.command {
            Commands::Keywords => self.emit(&circleci.keywords(), |k| output::keywords_table(k)),
            Commands::Trigger {
                vcs,
                org,
                repo,
                branch,
                tag,
                params,
            } => {
                let project = circleci.define_project(vcs, org, repo);
                let options = TriggerOptions {
                    branch: branch.clone(),
                    tag: tag.clone(),
                    parameters: params.iter().cloned().collect(),
                };
                let pipeline = circleci.trigger_pipeline(&project, &options).await?;
                self.emit(&pipeline, output::pipeline_table)
            }
            Commands::Pipeline { pipeline_id } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                self.emit(&pipeline, output::pipeline_table)
            }
            Commands::Workflows { pipeline_id } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                let workflows = circleci.get_workflows(&pipeline).await?;
                self.emit(&workflows, output::workflows_table)
            }
            Commands::Stopped { pipeline_id } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                let stopped = circleci.all_workflows_stopped(&pipeline).await?;
                self.emit(&stopped, |v| output::verdict(*v))
            }
            Commands::ShouldBeStopped { pipeline_id } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                circleci.all_workflows_should_be_stopped(&pipeline).await?;
                info!("All workflows of pipeline {pipeline} stopped");
                Ok(())
            }
            Commands::HasStatus {
                pipeline_id,
                status,
            } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                let matches = circleci.all_workflows_have_status(&pipeline, *status).await?;
                self.emit(&matches, |v| output::verdict(*v))
            }
            Commands::ShouldHaveStatus {
                pipeline_id,
                status,
            } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                circleci
                    .all_workflows_should_have_the_status(&pipeline, *status)
                    .await?;
                info!("All workflows of pipeline {pipeline} have status {status}");
                Ok(())
            }
            Commands::StoppedWithStatus {
                pipeline_id,
                status,
            } => {
                let pipeline = Self::pipeline(&circleci, pipeline_id).await?;
                circleci
                    .all_workflows_should_be_stopped_with_status(&pipeline, *status)
                    .await?;
                info!("All workflows of pipeline {pipeline} stopped with status {status}");
                Ok(())
            }
            Commands::Projects => {
                let projects = circleci.get_projects().await?;
                self.emit(&projects, |p| output::projects_table(p))
            }
            Commands::Project { name } => {
                let project = circleci.get_project(name).await?;
                self.emit(&project, |p| output::projects_table(std::slice::from_ref(p)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameter_reads_json_values() {
        assert_eq!(
            parse_parameter("run_e2e=true").unwrap(),
            ("run_e2e".to_string(), Value::Bool(true))
        );
        assert_eq!(
            parse_parameter("nodes=3").unwrap(),
            ("nodes".to_string(), Value::from(3))
        );
    }

    #[test]
    fn test_parse_parameter_falls_back_to_string() {
        assert_eq!(
            parse_parameter("env=staging=eu").unwrap(),
            ("env".to_string(), Value::String("staging=eu".to_string()))
        );
    }

    #[test]
    fn test_parse_parameter_rejects_missing_separator() {
        assert!(parse_parameter("flag").is_err());
        assert!(parse_parameter("=1").is_err());
    }

    #[test]
    fn test_branch_and_tag_conflict() {
        let result = Cli::try_parse_from([
            "circleci-keywords",
            "trigger",
            "--org",
            "o",
            "--repo",
            "r",
            "--branch",
            "main",
            "--tag",
            "1.0.2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_argument_is_parsed() {
        let cli = Cli::try_parse_from(["circleci-keywords", "has-status", "abc", "on_hold"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::HasStatus { status: WorkflowStatus::OnHold, .. }
        ));

        assert!(Cli::try_parse_from(["circleci-keywords", "has-status", "abc", "done"]).is_err());
    }
}
