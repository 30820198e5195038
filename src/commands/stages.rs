use serde::Serialize;
use tabled::Tabled;

use crate::cli::StagesArgs;
use crate::error::Result;
use crate::output::{self, format_minutes, truncate};
use crate::stages::{aggregate, PbiStages, StageInput};

#[derive(Tabled, Serialize, Clone)]
struct StageRow {
    #[tabled(rename = "PBI")]
    pbi: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Doing")]
    doing: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

fn rows(pbi: &PbiStages) -> Vec<StageRow> {
    let name = truncate(&pbi.pbi_name, 30);
    let mut rows = vec![StageRow {
        pbi: name.clone(),
        stage: "(PBI)".to_string(),
        doing: format_minutes(pbi.pbi_minutes),
        start: pbi.pbi_start.clone().unwrap_or_else(|| "-".into()),
        end: pbi.pbi_end.clone().unwrap_or_else(|| "-".into()),
    }];
    rows.extend(pbi.stages.iter().map(|(stage, times)| StageRow {
        pbi: name.clone(),
        stage: stage.to_string(),
        doing: format_minutes(times.total_doing_time),
        start: times.start.to_string(),
        end: times.end.to_string(),
    }));
    rows
}

pub fn run(args: StagesArgs) -> Result<()> {
    let input: StageInput = output::read_json(&args.input_file)?;
    let report = aggregate(&input);
    tracing::info!("aggregated stages for {} PBIs", report.backlogs.len());

    output::write_json(&args.output_file, &report)?;

    if output::is_json_output() {
        println!("{}", output::to_json_string(&report)?);
    } else {
        let table_rows: Vec<StageRow> = report.backlogs.iter().flat_map(rows).collect();
        output::print_table(&table_rows, StageRow::clone);
    }
    output::print_written(&args.output_file, "stage report");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::StageReport;
    use serde_json::json;

    #[test]
    fn writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let out = dir.path().join("stages.json");
        let doc = json!({"backlogs": [{
            "name": "Login",
            "start": "2024-01-15T09:00:00.000+0900",
            "end": "2024-01-15T18:00:00.000+0900",
            "subtasks": [
                {"label": "テスト", "start": "2024-01-15T15:00:00.000+0900", "end": "2024-01-15T16:00:00.000+0900"}
            ]
        }]});
        std::fs::write(&input, doc.to_string()).unwrap();

        run(StagesArgs {
            input_file: input,
            output_file: out.clone(),
        })
        .unwrap();

        let report: StageReport = output::read_json(&out).unwrap();
        assert_eq!(report.backlogs[0].pbi_minutes, 540);
        let written: serde_json::Value = output::read_json(&out).unwrap();
        assert_eq!(written["backlogs"][0]["stages"]["試験"]["total_doing_time"], 60);
    }

    #[test]
    fn summary_rows_lead_with_pbi_total() {
        let report = aggregate(
            &serde_json::from_value(json!({"backlogs": [{"name": "A", "subtasks": [
                {"labels": ["設計"], "start": "2024-01-15T09:00:00.000+0900", "end": "2024-01-15T09:30:00.000+0900"}
            ]}]}))
            .unwrap(),
        );
        let rows = rows(&report.backlogs[0]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stage, "(PBI)");
        assert_eq!(rows[1].stage, "設計");
        assert_eq!(rows[1].doing, "30m");
    }
}
