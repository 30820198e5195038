use tabled::Tabled;

use crate::backlog::{list_pbis, PbiSummary};
use crate::cli::PbiArgs;
use crate::client::{sprint_jql, JiraClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{self, truncate};
use crate::report::PbiExtract;
use crate::types::Issue;

#[derive(Tabled)]
struct PbiRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Labels")]
    labels: String,
}

impl From<&PbiSummary> for PbiRow {
    fn from(pbi: &PbiSummary) -> Self {
        Self {
            key: pbi.key.clone(),
            name: truncate(&pbi.name, 50),
            labels: pbi.labels.join(", "),
        }
    }
}

pub async fn list(client: &JiraClient, config: &Config, args: PbiArgs) -> Result<()> {
    let sprint_name = config.resolve_sprint(args.sprint.as_deref())?;
    let label = config.resolve_label(args.label.as_deref());

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

    let extract = PbiExtract {
        pbis: list_pbis(&Issue::decode_all(&raw)),
    };

    let path = config.resolve_output(args.output.as_deref(), "pbis.json");
    output::write_json(&path, &extract)?;

    output::print_table(&extract.pbis, |p| PbiRow::from(p));
    output::print_written(&path, "PBI list");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_render_through_print_table() {
        let pbis = vec![PbiSummary {
            key: "EVASS-1".into(),
            name: "ログイン画面".repeat(10),
            labels: vec!["team-a".into(), "web".into()],
            description: serde_json::Value::Null,
        }];
        let row = PbiRow::from(&pbis[0]);
        assert_eq!(row.name.chars().count(), 50);
        assert_eq!(row.labels, "team-a, web");

        output::print_table(&pbis, |p| PbiRow::from(p));
    }
}
