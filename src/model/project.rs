use serde::Serialize;
use serde_json::Value;

use super::fields::{as_object, required_str};
use crate::error::Result;

/// A source repository registered with CircleCI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// VCS discriminator as CircleCI reports it (e.g. "github", "bitbucket")
    pub vcs_type: String,
    /// Organization or owner of the repository
    pub username: String,
    /// Repository name
    pub reponame: String,
}

impl Project {
    pub fn new(
        vcs_type: impl Into<String>,
        username: impl Into<String>,
        reponame: impl Into<String>,
    ) -> Self {
        Self {
            vcs_type: vcs_type.into(),
            username: username.into(),
            reponame: reponame.into(),
        }
    }

    /// Maps one entry of the project listing.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if `vcs_type`, `username` or `reponame` is absent,
    /// and `MalformedResponse` if the entry is not an object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "project")?;
        Ok(Self {
            vcs_type: required_str(obj, "vcs_type")?,
            username: required_str(obj, "username")?,
            reponame: required_str(obj, "reponame")?,
        })
    }

    /// Project slug used by the v2 API, e.g. `gh/org/repo`.
    pub fn slug(&self) -> String {
        let vcs = match self.vcs_type.to_ascii_lowercase().as_str() {
            "github" | "gh" => "gh".to_string(),
            "bitbucket" | "bb" => "bb".to_string(),
            _ => self.vcs_type.clone(),
        };
        format!("{vcs}/{}/{}", self.username, self.reponame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircleCiError;
    use serde_json::json;

    #[test]
    fn test_project_from_json() {
        let project = Project::from_json(&json!({
            "vcs_type": "github",
            "username": "trustedshops",
            "reponame": "dummy",
            "vcs_url": "https://github.com/trustedshops/dummy"
        }))
        .unwrap();

        assert_eq!(project, Project::new("github", "trustedshops", "dummy"));
    }

    #[test]
    fn test_project_from_json_missing_reponame() {
        let err = Project::from_json(&json!({"vcs_type": "github", "username": "org"})).unwrap_err();
        assert!(matches!(err, CircleCiError::MissingField(key) if key == "reponame"));
    }

    #[test]
    fn test_project_slug() {
        assert_eq!(Project::new("github", "org", "repo").slug(), "gh/org/repo");
        assert_eq!(Project::new("bitbucket", "org", "repo").slug(), "bb/org/repo");
        assert_eq!(Project::new("circleci", "org-id", "proj-id").slug(), "circleci/org-id/proj-id");
    }
}
