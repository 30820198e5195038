//! Output documents written by the extractor commands.

use serde::{Deserialize, Serialize};

use crate::backlog::{Backlog, PbiSummary};
use crate::timestamp::Timestamp;
use crate::types::Sprint;

/// Sprint header of a sprint extract. Dates drop their UTC offset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SprintMeta {
    #[serde(rename = "sprintNo")]
    pub sprint_no: u64,
    #[serde(rename = "beginDate")]
    pub begin_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl From<&Sprint> for SprintMeta {
    fn from(sprint: &Sprint) -> Self {
        Self {
            sprint_no: sprint_number(&sprint.name),
            begin_date: sprint.start_date.as_deref().and_then(local_date),
            end_date: sprint.end_date.as_deref().and_then(local_date),
        }
    }
}

/// `{ metaData, backlogs, backlog_num }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SprintExtract {
    #[serde(rename = "metaData", skip_serializing_if = "Option::is_none", default)]
    pub meta_data: Option<SprintMeta>,
    pub backlogs: Vec<Backlog>,
    pub backlog_num: usize,
}

impl SprintExtract {
    pub fn new(meta_data: Option<SprintMeta>, backlogs: Vec<Backlog>) -> Self {
        Self {
            meta_data,
            backlog_num: backlogs.len(),
            backlogs,
        }
    }
}

/// `{ pbis }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PbiExtract {
    pub pbis: Vec<PbiSummary>,
}

/// Digits of the sprint name read as one number, 0 when there are none.
pub fn sprint_number(name: &str) -> u64 {
    name.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn local_date(raw: &str) -> Option<String> {
    Timestamp::parse(raw).map(|ts| {
        ts.as_datetime()
            .format("%Y-%m-%dT%H:%M:%S.000")
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprint_number_from_name() {
        assert_eq!(sprint_number("Sprint 12"), 12);
        assert_eq!(sprint_number("S1-2"), 12);
        assert_eq!(sprint_number("Backlog"), 0);
    }

    #[test]
    fn sprint_meta_strips_offset() {
        let sprint = Sprint {
            id: 7,
            name: "EVASS Sprint 34".into(),
            state: Some("active".into()),
            start_date: Some("2024-01-15T10:00:00.000+09:00".into()),
            end_date: None,
        };
        let meta = SprintMeta::from(&sprint);
        assert_eq!(meta.sprint_no, 34);
        assert_eq!(meta.begin_date.as_deref(), Some("2024-01-15T10:00:00.000"));
        assert_eq!(meta.end_date, None);
    }

    #[test]
    fn extract_counts_backlogs() {
        let extract = SprintExtract::new(None, vec![]);
        let json = serde_json::to_value(&extract).unwrap();
        assert_eq!(json["backlog_num"], 0);
        assert!(json.get("metaData").is_none());
    }
}
