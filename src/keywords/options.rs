use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

use crate::model::GitRef;

/// Optional inputs of a pipeline trigger.
///
/// CircleCI builds either a branch or a tag. If both are given the branch
/// is used and the tag is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerOptions {
    pub branch: Option<String>,
    pub tag: Option<String>,
    /// Pipeline parameters, forwarded verbatim and in insertion order
    pub parameters: IndexMap<String, Value>,
}

impl TriggerOptions {
    pub fn branch(branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            ..Self::default()
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn revision(&self) -> Option<GitRef> {
        match (&self.branch, &self.tag) {
            (Some(branch), Some(tag)) => {
                warn!("Both branch '{branch}' and tag '{tag}' given, triggering branch");
                Some(GitRef::Branch(branch.clone()))
            }
            (Some(branch), None) => Some(GitRef::Branch(branch.clone())),
            (None, Some(tag)) => Some(GitRef::Tag(tag.clone())),
            (None, None) => None,
        }
    }
}
