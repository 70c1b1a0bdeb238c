use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_BASE_URL;
use crate::error::{CircleCiError, Result};

const CANDIDATES: [&str; 4] = [
    "circleci-keywords.toml",
    "circleci-keywords.json",
    "circleci-keywords.yaml",
    "circleci-keywords.yml",
];

/// Configuration file structure.
///
/// Holds the CircleCI credentials and endpoint the keyword library is
/// constructed with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub circleci: CircleCiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CircleCiConfig {
    /// CircleCI personal API token
    pub token: Option<String>,

    /// CircleCI API base URL, without the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Allow building the library without a token, e.g. to list keywords.
    /// No API keyword can be called in this mode.
    #[serde(default)]
    pub introspection_only: bool,
}

impl Default for CircleCiConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            introspection_only: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl CircleCiConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }
}

impl Config {
    /// Reads the first configuration file found among: the given path,
    /// `./circleci-keywords.{toml,json,yaml,yml}`, then
    /// `{config_dir}/circleci-keywords/config.toml`. Falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let found = CANDIDATES
            .iter()
            .map(PathBuf::from)
            .chain(Self::user_config_path())
            .find(|candidate| candidate.is_file());

        match found {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("circleci-keywords").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CircleCiError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;

        match Format::of(path) {
            Some(format) => format.parse(&contents).map_err(|e| {
                CircleCiError::Config(format!("Invalid {format:?} in {}: {e}", path.display()))
            }),
            // Unknown extension: first format that accepts the contents wins
            None => Format::ALL
                .iter()
                .find_map(|format| format.parse(&contents).ok())
                .ok_or_else(|| {
                    CircleCiError::Config(format!(
                        "{} is not TOML, JSON or YAML",
                        path.display()
                    ))
                }),
        }
    }

    /// Applies values given on the command line or through the environment.
    pub fn with_overrides(mut self, token: Option<String>, base_url: Option<String>) -> Self {
        if token.is_some() {
            self.circleci.token = token;
        }
        if let Some(base_url) = base_url {
            self.circleci.base_url = base_url;
        }
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    const ALL: [Format; 3] = [Format::Toml, Format::Json, Format::Yaml];

    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn parse(self, contents: &str) -> std::result::Result<Config, String> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        }
    }
}
