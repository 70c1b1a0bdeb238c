use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use circleci_keywords::{KeywordDoc, Pipeline, Project, WorkflowList, WorkflowStatus};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn color_coded_status_cell(status: WorkflowStatus) -> Cell {
    let color = match status {
        WorkflowStatus::Success => TableColor::Green,
        WorkflowStatus::Running | WorkflowStatus::OnHold => TableColor::Yellow,
        WorkflowStatus::Failed | WorkflowStatus::Error | WorkflowStatus::Failing => TableColor::Red,
        WorkflowStatus::NotRun | WorkflowStatus::Canceled | WorkflowStatus::Unauthorized => {
            TableColor::DarkGrey
        }
    };
    Cell::new(status).fg(color)
}

pub fn workflows_table(workflows: &WorkflowList) -> String {
    let mut table = create_table();
    table.set_header(header(&["Name", "Status", "Created", "Stopped", "ID"]));

    for workflow in workflows {
        table.add_row(vec![
            Cell::new(&workflow.name),
            color_coded_status_cell(workflow.status),
            Cell::new(workflow.created_at.format(TIME_FORMAT)),
            Cell::new(
                workflow
                    .stopped_at
                    .map_or_else(|| "-".to_string(), |t| t.format(TIME_FORMAT).to_string()),
            ),
            Cell::new(&workflow.id),
        ]);
    }

    table.to_string()
}

pub fn pipeline_table(pipeline: &Pipeline) -> String {
    let mut table = create_table();
    table.set_header(header(&["Field", "Value"]));

    let vcs = pipeline.vcs.as_ref();
    let rows = [
        ("ID", pipeline.id.clone()),
        ("Number", pipeline.number.to_string()),
        ("State", pipeline.state.clone()),
        ("Created", pipeline.created_at.format(TIME_FORMAT).to_string()),
        (
            "Updated",
            pipeline
                .updated_at
                .map_or_else(|| "-".to_string(), |t| t.format(TIME_FORMAT).to_string()),
        ),
        ("Provider", vcs.map_or("-", |v| v.provider_name.as_str()).to_string()),
        (
            "Repository",
            vcs.map_or("-", |v| v.target_repository_url.as_str()).to_string(),
        ),
        ("Branch", pipeline.branch().unwrap_or("-").to_string()),
        ("Tag", pipeline.tag().unwrap_or("-").to_string()),
    ];

    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }

    for error in &pipeline.errors {
        table.add_row(vec![
            Cell::new(format!("Error ({})", error.error_type)).fg(TableColor::Red),
            Cell::new(&error.message),
        ]);
    }

    table.to_string()
}

pub fn projects_table(projects: &[Project]) -> String {
    let mut table = create_table();
    table.set_header(header(&["VCS", "Organization", "Repository", "Slug"]));

    for project in projects {
        table.add_row(vec![
            Cell::new(&project.vcs_type),
            Cell::new(&project.username),
            Cell::new(&project.reponame),
            Cell::new(project.slug()),
        ]);
    }

    table.to_string()
}

pub fn keywords_table(keywords: &[KeywordDoc]) -> String {
    let mut table = create_table();
    table.set_header(header(&["Keyword", "Arguments", "Documentation"]));

    for keyword in keywords {
        table.add_row(vec![
            Cell::new(keyword.name),
            Cell::new(keyword.arguments.join(", ")),
            Cell::new(keyword.doc),
        ]);
    }

    table.to_string()
}
