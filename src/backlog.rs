//! Reshapes a flat issue list into backlog items (PBIs) with their subtasks.

use serde::{Deserialize, Serialize};

use crate::calendar::WorkCalendar;
use crate::duration::business_minutes;
use crate::timestamp::Timestamp;
use crate::types::{Issue, IssueFields, StatusChange};

/// Assignee string for a subtask nobody has picked up.
pub const UNASSIGNED: &str = "未割り当て";

/// Statuses a subtask leaves when work on it starts.
const START_STATUSES: [&str; 2] = ["ToDo", "Assigned"];

const TODO: &str = "ToDo";
const IN_PROGRESS: &str = "IN-PROGRESS";
const DONE: &str = "Done";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subtask {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub parent_key: String,
    /// Person in charge
    pub pic: String,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub duration: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Backlog {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub point: i64,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    /// Business minutes between the backlog's own start and end
    pub cycle: Option<i64>,
    pub subtasks: Vec<Subtask>,
    pub subtask_total: i64,
}

/// A backlog item without timing data, as listed by the `pbis` command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PbiSummary {
    pub key: String,
    pub name: String,
    pub labels: Vec<String>,
    pub description: serde_json::Value,
}

/// Whether a target status marks completion: anything containing "done", ignoring case.
pub fn is_completion(status: &str) -> bool {
    status.to_uppercase().contains("DONE")
}

impl Subtask {
    pub fn from_issue(
        issue: &Issue,
        fields: &IssueFields,
        parent_key: &str,
        calendar: &WorkCalendar,
    ) -> Self {
        let mut subtask = Self {
            name: fields.summary.clone().unwrap_or_default(),
            labels: fields.labels.clone().unwrap_or_default(),
            parent_key: parent_key.to_string(),
            pic: assignee_names(fields),
            start: None,
            end: None,
            duration: None,
        };

        for change in issue.status_changes() {
            subtask.apply(&change, calendar);
        }

        subtask
    }

    /// Later events overwrite earlier ones; the duration follows the current pair.
    fn apply(&mut self, change: &StatusChange<'_>, calendar: &WorkCalendar) {
        let from = change.from.unwrap_or_default();
        let completes = change.to.is_some_and(is_completion);

        if START_STATUSES.contains(&from) && !completes {
            self.start = Some(change.at);
        } else if completes {
            self.end = Some(change.at);
        }

        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            self.duration = Some(business_minutes(start, end, calendar));
        }
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

impl Backlog {
    pub fn from_issue(issue: &Issue, fields: &IssueFields, calendar: &WorkCalendar) -> Self {
        let start = issue
            .status_changes()
            .find(|c| c.is(TODO, IN_PROGRESS))
            .map(|c| c.at);
        let end = issue
            .status_changes()
            .find(|c| c.is(IN_PROGRESS, DONE))
            .map(|c| c.at);

        let cycle = match (&start, &end) {
            (Some(start), Some(end)) => Some(business_minutes(start, end, calendar)),
            _ => None,
        };

        Self {
            name: fields.summary.clone().unwrap_or_default(),
            key: issue.key.clone(),
            labels: fields.labels.clone().unwrap_or_default(),
            point: fields.story_points.map(|p| p.trunc() as i64).unwrap_or(0),
            start,
            end,
            cycle,
            subtasks: Vec::new(),
            subtask_total: 0,
        }
    }

    fn recompute_total(&mut self) {
        self.subtask_total = self.subtasks.iter().map(|s| s.duration.unwrap_or(0)).sum();
    }
}

impl PbiSummary {
    fn from_issue(issue: &Issue, fields: &IssueFields) -> Self {
        Self {
            key: issue.key.clone(),
            name: fields.summary.clone().unwrap_or_default(),
            labels: fields.labels.clone().unwrap_or_default(),
            // An explicit `null` is kept; only a missing key becomes ""
            description: fields
                .description
                .clone()
                .unwrap_or_else(|| serde_json::Value::String(String::new())),
        }
    }
}

/// Partition issues into backlogs and subtasks, then attach completed subtasks to their parent.
///
/// Issues with missing or empty `fields` are ignored.
pub fn build_backlogs(issues: &[Issue], calendar: &WorkCalendar) -> Vec<Backlog> {
    let mut backlogs = Vec::new();
    let mut subtasks = Vec::new();

    for issue in issues {
        let Some(fields) = issue.fields.as_ref().filter(|f| !f.is_empty()) else {
            tracing::debug!("skipping {} without fields", issue.key);
            continue;
        };

        match &fields.parent {
            None => backlogs.push(Backlog::from_issue(issue, fields, calendar)),
            Some(parent) => {
                subtasks.push(Subtask::from_issue(issue, fields, &parent.key, calendar))
            }
        }
    }

    associate(&mut backlogs, subtasks);
    tracing::info!("built {} backlog items", backlogs.len());
    backlogs
}

/// Move each subtask that has both a start and an end under the backlog it names.
pub fn associate(backlogs: &mut [Backlog], subtasks: Vec<Subtask>) {
    for subtask in subtasks {
        if !subtask.is_complete() {
            continue;
        }
        match backlogs.iter_mut().find(|b| b.key == subtask.parent_key) {
            Some(backlog) => backlog.subtasks.push(subtask),
            None => tracing::debug!(
                "subtask `{}` references unknown parent {}",
                subtask.name,
                subtask.parent_key
            ),
        }
    }

    for backlog in backlogs.iter_mut() {
        backlog.recompute_total();
    }
}

/// Top-level issues only, without timing data.
pub fn list_pbis(issues: &[Issue]) -> Vec<PbiSummary> {
    issues
        .iter()
        .filter_map(|issue| {
            issue
                .fields
                .as_ref()
                .filter(|f| !f.is_empty())
                .map(|fields| (issue, fields))
        })
        .filter(|(_, fields)| fields.parent.is_none())
        .map(|(issue, fields)| PbiSummary::from_issue(issue, fields))
        .collect()
}

fn assignee_names(fields: &IssueFields) -> String {
    let names: Vec<&str> = fields
        .assignee
        .iter()
        .chain(fields.co_assignees.iter().flatten())
        .filter_map(|user| user.display_name.as_deref())
        .collect();

    let joined = names.join(",").replace('\u{3000}', "");
    if joined.is_empty() {
        UNASSIGNED.to_string()
    } else {
        joined
    }
}
