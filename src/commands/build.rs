use std::path::Path;

use serde_json::Value;

use super::sprint::print_backlogs;
use crate::backlog::build_backlogs;
use crate::calendar::WorkCalendar;
use crate::cli::BuildArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output;
use crate::report::SprintExtract;
use crate::types::Issue;

pub fn run(config: &Config, args: BuildArgs) -> Result<()> {
    let calendar = WorkCalendar::from_config(&config.calendar)?;
    let document: Value = output::read_json(&args.input)?;

    let raw = issue_values(document);
    if raw.is_empty() {
        return Err(Error::NoIssues(args.input.display().to_string()));
    }

    let issues = Issue::decode_all(&raw);
    let extract = SprintExtract::new(None, build_backlogs(&issues, &calendar));
    write(&args.output, &extract)
}

fn write(path: &Path, extract: &SprintExtract) -> Result<()> {
    output::write_json(path, extract)?;
    print_backlogs(&extract.backlogs);
    output::print_written(path, "sprint extract");
    Ok(())
}

/// Accept either a search response (`{"issues": [...]}`) or a bare array of issues.
fn issue_values(document: Value) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("issues") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
