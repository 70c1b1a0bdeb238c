use serde::Serialize;

/// Name, arguments and summary of one keyword.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeywordDoc {
    pub name: &'static str,
    pub arguments: &'static [&'static str],
    pub doc: &'static str,
}

const KEYWORDS: &[KeywordDoc] = &[
    KeywordDoc {
        name: "Define Project",
        arguments: &["vcs_type", "username", "reponame"],
        doc: "Create a project value without calling CircleCI.",
    },
    KeywordDoc {
        name: "Trigger Pipeline",
        arguments: &["project", "branch=None", "tag=None", "parameters={}"],
        doc: "Trigger a pipeline. Only id, number, state and created_at are set on the result.",
    },
    KeywordDoc {
        name: "Get Pipeline",
        arguments: &["pipeline_id"],
        doc: "Fetch the full pipeline including vcs info and errors.",
    },
    KeywordDoc {
        name: "Get Workflows",
        arguments: &["pipeline"],
        doc: "Fetch the workflows of a pipeline.",
    },
    KeywordDoc {
        name: "All Workflows Stopped",
        arguments: &["pipeline"],
        doc: "Return true if the pipeline has workflows and all of them stopped.",
    },
    KeywordDoc {
        name: "All Workflows Should Be Stopped",
        arguments: &["pipeline"],
        doc: "Fail if a workflow of the pipeline is still running or none exists yet.",
    },
    KeywordDoc {
        name: "All Workflows Have Status",
        arguments: &["pipeline", "status"],
        doc: "Return true if every workflow of the pipeline has the status.",
    },
    KeywordDoc {
        name: "All Workflows Should Have The Status",
        arguments: &["pipeline", "status"],
        doc: "Fail unless every workflow of the pipeline has the status.",
    },
    KeywordDoc {
        name: "All Workflows Stopped With Status",
        arguments: &["pipeline", "status"],
        doc: "Return true if all workflows stopped and every one has the status.",
    },
    KeywordDoc {
        name: "All Workflows Should Be Stopped With Status",
        arguments: &["pipeline", "status"],
        doc: "Fail unless all workflows stopped with the status.",
    },
    KeywordDoc {
        name: "Get Projects",
        arguments: &[],
        doc: "List the projects followed by the token's user.",
    },
    KeywordDoc {
        name: "Get Project",
        arguments: &["name"],
        doc: "Find the first followed project whose repository name matches exactly.",
    },
];

/// The keywords this library exposes. Needs no credentials.
pub fn catalogue() -> &'static [KeywordDoc] {
    KEYWORDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keyword_names_are_unique() {
        let names: HashSet<_> = catalogue().iter().map(|k| k.name).collect();
        assert_eq!(names.len(), catalogue().len());
    }
}
