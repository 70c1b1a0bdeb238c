use indexmap::IndexMap;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{CircleCiError, Result};
use crate::model::GitRef;

pub const DEFAULT_BASE_URL: &str = "https://circleci.com/api";

const TOKEN_HEADER: &str = "Circle-Token";

/// Authenticated access to the CircleCI REST API.
///
/// Returns raw JSON; typing is left to [`crate::model`]. Requests are never
/// retried and each call performs exactly one round trip.
pub struct CircleCiClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
}

#[derive(Serialize)]
struct TriggerBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    parameters: &'a IndexMap<String, Value>,
}

impl CircleCiClient {
    /// Creates a client for `base_url` (e.g. <https://circleci.com/api>).
    ///
    /// Without a token the client can be built, but every request fails with
    /// `MissingCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("circleci-keywords/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CircleCiError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let api_url = Url::parse(&base)
            .map_err(|e| CircleCiError::Config(format!("Invalid base URL: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(CircleCiError::Config(format!(
                "Invalid base URL: {base_url}"
            )));
        }

        Ok(Self {
            client,
            api_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Appends `segments` to the base URL, each as exactly one path segment.
    ///
    /// Reserved characters inside a segment are percent-encoded, so an id can
    /// never step out of its endpoint.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        for segment in segments {
            if segment.trim().is_empty() || matches!(*segment, "." | "..") {
                return Err(CircleCiError::InvalidArgument(format!(
                    "'{segment}' is not a valid URL path segment"
                )));
            }
        }

        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| CircleCiError::Config(format!("Invalid base URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_request(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_ref().ok_or(CircleCiError::MissingCredentials)?;
        Ok(request
            .header(TOKEN_HEADER, token)
            .header(ACCEPT, "application/json"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = self.auth_request(request)?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CircleCiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!("GET {url}");
        self.send(self.client.get(url)).await
    }

    /// `POST v2/project/{slug}/pipeline`
    pub async fn trigger_pipeline(
        &self,
        project_slug: &str,
        revision: Option<&GitRef>,
        parameters: &IndexMap<String, Value>,
    ) -> Result<Value> {
        let mut segments = vec!["v2", "project"];
        segments.extend(project_slug.split('/'));
        segments.push("pipeline");
        let url = self.endpoint(&segments)?;
        let body = TriggerBody {
            branch: match revision {
                Some(GitRef::Branch(branch)) => Some(branch.as_str()),
                _ => None,
            },
            tag: match revision {
                Some(GitRef::Tag(tag)) => Some(tag.as_str()),
                _ => None,
            },
            parameters,
        };

        debug!("POST {url}");
        self.send(self.client.post(url).json(&body)).await
    }

    /// `GET v2/pipeline/{id}`
    pub async fn get_pipeline(&self, pipeline_id: &str) -> Result<Value> {
        self.get(&["v2", "pipeline", pipeline_id]).await
    }

    /// `GET v2/pipeline/{id}/workflow`
    pub async fn get_pipeline_workflows(&self, pipeline_id: &str) -> Result<Value> {
        self.get(&["v2", "pipeline", pipeline_id, "workflow"]).await
    }

    /// `GET v1.1/projects`
    pub async fn get_projects(&self) -> Result<Value> {
        self.get(&["v1.1", "projects"]).await
    }
}
