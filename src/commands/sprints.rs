use tabled::Tabled;

use crate::client::JiraClient;
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::report::sprint_number;
use crate::types::Sprint;

#[derive(Tabled)]
struct SprintRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "No")]
    number: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Starts")]
    starts_at: String,
    #[tabled(rename = "Ends")]
    ends_at: String,
}

impl From<&Sprint> for SprintRow {
    fn from(sprint: &Sprint) -> Self {
        Self {
            id: sprint.id,
            number: sprint_number(&sprint.name),
            name: sprint.name.clone(),
            state: sprint.state.clone().unwrap_or_default(),
            starts_at: date_only(sprint.start_date.as_deref()),
            ends_at: date_only(sprint.end_date.as_deref()),
        }
    }
}

fn date_only(iso: Option<&str>) -> String {
    iso.map(|iso| iso.split('T').next().unwrap_or(iso).to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn list(
    client: &JiraClient,
    config: &Config,
    board: Option<u64>,
    states: &str,
) -> Result<()> {
    let board = config.resolve_board(board)?;
    let sprints = client.sprints(board, states).await?;

    if sprints.is_empty() {
        output::print_message(&format!("No {states} sprints on board {board}"));
        return Ok(());
    }

    output::print_table(&sprints, |s| SprintRow::from(s));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_shows_dates_only() {
        let sprint = Sprint {
            id: 3,
            name: "Sprint 7".into(),
            state: Some("future".into()),
            start_date: Some("2024-02-01T10:00:00.000+09:00".into()),
            end_date: None,
        };
        let row = SprintRow::from(&sprint);
        assert_eq!(row.number, 7);
        assert_eq!(row.starts_at, "2024-02-01");
        assert_eq!(row.ends_at, "-");
    }
}
