use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::fields::{
    as_object, list_or_empty, optional_object, optional_str, optional_timestamp, required_str,
    required_timestamp, required_u64, JsonObject, PIPELINE_TIMESTAMP_FORMAT,
};
use crate::error::{CircleCiError, Result};

/// A triggered build of a project.
///
/// Built fresh from every response. A pipeline returned by a trigger call
/// only carries `id`, `number`, `state` and `created_at`; fetch it again to
/// get `vcs` and `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    pub id: String,
    pub number: u64,
    /// Raw provider state (e.g. "created", "pending", "errored")
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub errors: Vec<PipelineError>,
    pub vcs: Option<Vcs>,
}

/// A configuration or setup error CircleCI attached to a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Revision metadata of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vcs {
    pub provider_name: String,
    pub target_repository_url: String,
    pub revision: Option<GitRef>,
}

/// The branch or tag a pipeline was built from. CircleCI never sets both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitRef {
    Branch(String),
    Tag(String),
}

impl Pipeline {
    /// Maps a pipeline response (trigger or full fetch).
    ///
    /// # Errors
    ///
    /// - `MissingField` if `id`, `number`, `state` or `created_at` is absent
    /// - `TimestampParse` if a timestamp does not match the pipeline format
    /// - `MalformedResponse` if the response or a nested value has the wrong shape,
    ///   including a `vcs` object that names both a `branch` and a `tag`. Such a
    ///   pipeline is refused rather than reduced to one of the two, so a provider
    ///   that starts sending both breaks every fetch of it.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "pipeline")?;

        let errors = list_or_empty(obj, "errors")?
            .iter()
            .map(PipelineError::from_json)
            .collect::<Result<Vec<_>>>()?;

        let vcs = optional_object(obj, "vcs")?.map(Vcs::from_object).transpose()?;

        Ok(Self {
            id: required_str(obj, "id")?,
            number: required_u64(obj, "number")?,
            state: required_str(obj, "state")?,
            created_at: required_timestamp(obj, "created_at", PIPELINE_TIMESTAMP_FORMAT)?,
            updated_at: optional_timestamp(obj, "updated_at", PIPELINE_TIMESTAMP_FORMAT)?,
            errors,
            vcs,
        })
    }

    pub fn branch(&self) -> Option<&str> {
        self.vcs.as_ref().and_then(Vcs::branch)
    }

    pub fn tag(&self) -> Option<&str> {
        self.vcs.as_ref().and_then(Vcs::tag)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.number, self.id)
    }
}

impl PipelineError {
    fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "pipeline error")?;
        Ok(Self {
            error_type: required_str(obj, "type")?,
            message: required_str(obj, "message")?,
        })
    }
}

impl Vcs {
    fn from_object(obj: &JsonObject) -> Result<Self> {
        let revision = match (optional_str(obj, "branch")?, optional_str(obj, "tag")?) {
            (Some(_), Some(_)) => {
                return Err(CircleCiError::MalformedResponse(
                    "vcs carries both `branch` and `tag`".to_string(),
                ))
            }
            (Some(branch), None) => Some(GitRef::Branch(branch)),
            (None, Some(tag)) => Some(GitRef::Tag(tag)),
            (None, None) => None,
        };

        Ok(Self {
            provider_name: required_str(obj, "provider_name")?,
            target_repository_url: required_str(obj, "target_repository_url")?,
            revision,
        })
    }

    pub fn branch(&self) -> Option<&str> {
        match &self.revision {
            Some(GitRef::Branch(branch)) => Some(branch),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.revision {
            Some(GitRef::Tag(tag)) => Some(tag),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PIPELINE_ID: &str = "E57868E8-9533-4625-AD83-F2AB2ABB70BD";

    fn full_pipeline(vcs: Value) -> Value {
        json!({
            "id": PIPELINE_ID,
            "errors": [],
            "project_slug": "gh/trustedshops/dummy",
            "updated_at": "2021-05-21T13:44:31.668+0000",
            "number": 129,
            "state": "created",
            "created_at": "2021-05-21T13:44:31.668+0000",
            "vcs": vcs
        })
    }

    #[test]
    fn test_trigger_response_is_partial() {
        let pipeline = Pipeline::from_json(&json!({
            "number": 129,
            "state": "pending",
            "id": PIPELINE_ID,
            "created_at": "2021-05-21T13:44:31.668Z"
        }))
        .unwrap();

        assert_eq!(pipeline.id, PIPELINE_ID);
        assert_eq!(pipeline.number, 129);
        assert_eq!(pipeline.state, "pending");
        assert!(pipeline.updated_at.is_none());
        assert!(pipeline.errors.is_empty());
        assert!(pipeline.vcs.is_none());
    }

    #[test]
    fn test_full_pipeline_with_branch() {
        let pipeline = Pipeline::from_json(&full_pipeline(json!({
            "origin_repository_url": "https://github.com/trustedshops/dummy",
            "target_repository_url": "https://github.com/trustedshops/dummy",
            "revision": "87457315102ea6aab36c3c2ee7b04dd75af195e1",
            "provider_name": "GitHub",
            "branch": "main"
        })))
        .unwrap();

        assert!(pipeline.updated_at.is_some());
        assert_eq!(pipeline.branch(), Some("main"));
        assert_eq!(pipeline.tag(), None);
        assert_eq!(pipeline.vcs.unwrap().provider_name, "GitHub");
    }

    #[test]
    fn test_full_pipeline_with_tag() {
        let pipeline = Pipeline::from_json(&full_pipeline(json!({
            "target_repository_url": "https://github.com/trustedshops/dummy",
            "provider_name": "GitHub",
            "tag": "1.0.2"
        })))
        .unwrap();

        assert_eq!(pipeline.tag(), Some("1.0.2"));
        assert_eq!(pipeline.branch(), None);
    }

    #[test]
    fn test_vcs_with_both_branch_and_tag_is_rejected() {
        let result = Pipeline::from_json(&full_pipeline(json!({
            "target_repository_url": "https://github.com/trustedshops/dummy",
            "provider_name": "GitHub",
            "branch": "main",
            "tag": "1.0.2"
        })));
        assert!(matches!(result, Err(CircleCiError::MalformedResponse(_))));
    }

    #[test]
    fn test_pipeline_errors_are_mapped_in_order() {
        let mut value = full_pipeline(json!({
            "target_repository_url": "https://github.com/trustedshops/dummy",
            "provider_name": "GitHub"
        }));
        value["errors"] = json!([
            {"type": "config", "message": "config is invalid"},
            {"type": "plan", "message": "out of credits"}
        ]);

        let pipeline = Pipeline::from_json(&value).unwrap();
        assert_eq!(pipeline.errors.len(), 2);
        assert_eq!(pipeline.errors[0].error_type, "config");
        assert_eq!(pipeline.errors[1].message, "out of credits");
        assert!(pipeline.vcs.unwrap().revision.is_none());
    }

    #[test]
    fn test_missing_created_at() {
        let err = Pipeline::from_json(&json!({"id": PIPELINE_ID, "number": 1, "state": "created"}))
            .unwrap_err();
        assert!(matches!(err, CircleCiError::MissingField(key) if key == "created_at"));
    }

    #[test]
    fn test_malformed_updated_at() {
        let mut value = full_pipeline(json!({
            "target_repository_url": "https://github.com/trustedshops/dummy",
            "provider_name": "GitHub"
        }));
        value["updated_at"] = json!("21.05.2021");
        assert!(matches!(
            Pipeline::from_json(&value),
            Err(CircleCiError::TimestampParse { .. })
        ));
    }

    #[test]
    fn test_display_names_number_and_id() {
        let pipeline = Pipeline::from_json(&json!({
            "number": 7,
            "state": "pending",
            "id": "abc",
            "created_at": "2021-05-21T13:44:31.668+0000"
        }))
        .unwrap();
        assert_eq!(pipeline.to_string(), "#7 (abc)");
    }
}
