//! Groups each PBI's subtasks into development stages by label and measures
//! how long every stage was in progress.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::timestamp::Timestamp;

const UNNAMED_PBI: &str = "Unnamed PBI";

/// Development stages in tie-break order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    #[serde(rename = "要求定義")]
    Requirements,
    #[serde(rename = "設計")]
    Design,
    #[serde(rename = "実装")]
    Implementation,
    #[serde(rename = "試験")]
    Test,
    #[serde(rename = "リリース")]
    Release,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Requirements,
        Stage::Design,
        Stage::Implementation,
        Stage::Test,
        Stage::Release,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Requirements => "要求定義",
            Stage::Design => "設計",
            Stage::Implementation => "実装",
            Stage::Test => "試験",
            Stage::Release => "リリース",
        }
    }

    /// Labels that place a subtask in this stage (exact match).
    pub fn accepted_labels(self) -> &'static [&'static str] {
        match self {
            Stage::Requirements => &["要求定義"],
            Stage::Design => &["設計"],
            Stage::Implementation => &["実装"],
            Stage::Test => &["試験", "テスト"],
            Stage::Release => &["リリース"],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First stage, in declared order, accepting any of the labels.
pub fn stage_for_labels(labels: &[String]) -> Option<Stage> {
    Stage::ALL.into_iter().find(|stage| {
        labels
            .iter()
            .any(|label| stage.accepted_labels().contains(&label.as_str()))
    })
}

/// Input document: the `backlogs` array of a sprint extract.
#[derive(Deserialize, Debug, Default)]
pub struct StageInput {
    #[serde(default)]
    pub backlogs: Vec<BacklogInput>,
}

#[derive(Deserialize, Debug)]
pub struct BacklogInput {
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskInput>,
}

#[derive(Deserialize, Debug)]
pub struct SubtaskInput {
    /// Older extracts wrote `label`, sometimes as a bare string.
    #[serde(default, alias = "label", deserialize_with = "one_or_many")]
    pub labels: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(label)) => vec![label],
        Some(OneOrMany::Many(labels)) => labels,
        None => Vec::new(),
    })
}

/// Output document of the stage aggregator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageReport {
    pub backlogs: Vec<PbiStages>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PbiStages {
    pub pbi_name: String,
    pub pbi_minutes: i64,
    pub pbi_start: Option<String>,
    pub pbi_end: Option<String>,
    pub stages: BTreeMap<Stage, StageTimes>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageTimes {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Wall-clock minutes from the stage's first start to its last end
    pub total_doing_time: i64,
}

#[derive(Default)]
struct StageSpan {
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

impl StageSpan {
    fn widen(&mut self, start: Option<Timestamp>, end: Option<Timestamp>) {
        if let Some(start) = start {
            self.start = Some(self.start.map_or(start, |current| current.min(start)));
        }
        if let Some(end) = end {
            self.end = Some(self.end.map_or(end, |current| current.max(end)));
        }
    }
}

pub fn aggregate(input: &StageInput) -> StageReport {
    StageReport {
        backlogs: input.backlogs.iter().map(aggregate_backlog).collect(),
    }
}

fn aggregate_backlog(backlog: &BacklogInput) -> PbiStages {
    let pbi_start = Timestamp::parse_or_sentinel(backlog.start.as_deref());
    let pbi_end = Timestamp::parse_or_sentinel(backlog.end.as_deref());

    let mut spans: BTreeMap<Stage, StageSpan> = BTreeMap::new();
    for subtask in &backlog.subtasks {
        let Some(stage) = stage_for_labels(&subtask.labels) else {
            continue;
        };
        spans
            .entry(stage)
            .or_default()
            .widen(parse_field(&subtask.start), parse_field(&subtask.end));
    }

    let stages = spans
        .into_iter()
        .filter_map(|(stage, span)| match (span.start, span.end) {
            (Some(start), Some(end)) => Some((
                stage,
                StageTimes {
                    start,
                    end,
                    total_doing_time: start.minutes_until(&end),
                },
            )),
            _ => None,
        })
        .collect();

    PbiStages {
        pbi_name: backlog
            .name
            .clone()
            .unwrap_or_else(|| UNNAMED_PBI.to_string()),
        pbi_minutes: pbi_start.minutes_until(&pbi_end),
        pbi_start: backlog.start.clone(),
        pbi_end: backlog.end.clone(),
        stages,
    }
}

fn parse_field(value: &Option<String>) -> Option<Timestamp> {
    let raw = value.as_deref()?;
    let parsed = Timestamp::parse(raw);
    if parsed.is_none() {
        tracing::debug!("ignoring unparseable subtask time `{raw}`");
    }
    parsed
}
