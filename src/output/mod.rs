mod tables;

use console::style;

pub use tables::{keywords_table, pipeline_table, projects_table, workflows_table};

/// Prints the banner to stderr so JSON on stdout stays parseable.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        style("CircleCI Keywords").magenta().bold(),
        style(env!("CARGO_PKG_VERSION")).dim(),
        style("Pipeline checks for test automation").dim()
    );
}

/// Renders a boolean check result for table output.
pub fn verdict(value: bool) -> String {
    if value {
        style("true").bright().green().to_string()
    } else {
        style("false").bright().red().to_string()
    }
}
