use tabled::Tabled;

use crate::backlog::{build_backlogs, Backlog};
use crate::calendar::WorkCalendar;
use crate::cli::SprintArgs;
use crate::client::{sprint_jql, JiraClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{self, format_minutes, truncate};
use crate::report::{SprintExtract, SprintMeta};
use crate::types::Issue;

#[derive(Tabled)]
struct BacklogRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "PBI")]
    name: String,
    #[tabled(rename = "Points")]
    point: i64,
    #[tabled(rename = "Subtasks")]
    subtasks: usize,
    #[tabled(rename = "Subtask total")]
    subtask_total: String,
    #[tabled(rename = "Cycle")]
    cycle: String,
}

impl From<&Backlog> for BacklogRow {
    fn from(backlog: &Backlog) -> Self {
        Self {
            key: backlog.key.clone(),
            name: truncate(&backlog.name, 40),
            point: backlog.point,
            subtasks: backlog.subtasks.len(),
            subtask_total: format_minutes(backlog.subtask_total),
            cycle: backlog.cycle.map(format_minutes).unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn extract(client: &JiraClient, config: &Config, args: SprintArgs) -> Result<()> {
    let sprint_name = config.resolve_sprint(args.sprint.as_deref())?;
    let label = config.resolve_label(args.label.as_deref());
    let calendar = WorkCalendar::from_config(&config.calendar)?;

    let meta = if args.no_meta {
        None
    } else {
        let board = config.resolve_board(args.board)?;
        let sprint = client.find_sprint(board, &sprint_name).await?;
        Some(SprintMeta::from(&sprint))
    };

    let jql = sprint_jql(
        config.project.as_deref(),
        &sprint_name,
        label.as_deref(),
        &config.excluded_labels,
    );
    let raw = client.search(&jql).await?;
    if raw.is_empty() {
        return Err(Error::NoIssues(jql));
    }

    if let Some(path) = &args.dump_issues {
        output::write_json(path, &raw)?;
    }

    let issues = Issue::decode_all(&raw);
    let extract = SprintExtract::new(meta, build_backlogs(&issues, &calendar));

    let path = config.resolve_output(args.output.as_deref(), "output.json");
    output::write_json(&path, &extract)?;

    print_backlogs(&extract.backlogs);
    output::print_written(&path, "sprint extract");

    Ok(())
}

pub(crate) fn print_backlogs(backlogs: &[Backlog]) {
    if backlogs.is_empty() {
        output::print_message("No backlog items found");
        return;
    }
    output::print_table(backlogs, |b| BacklogRow::from(b));
}
