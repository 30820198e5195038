use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::User;
use crate::timestamp::Timestamp;

/// An issue as returned by `/rest/api/2/search?expand=changelog`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Issue {
    #[serde(default)]
    pub key: String,
    pub fields: Option<IssueFields>,
    #[serde(default)]
    pub changelog: Changelog,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct IssueFields {
    pub summary: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    pub parent: Option<ParentRef>,
    pub assignee: Option<User>,
    /// Additional assignees (multi-user picker)
    #[serde(rename = "customfield_10205", default)]
    pub co_assignees: Option<Vec<User>>,
    /// Story points
    #[serde(
        rename = "customfield_10008",
        default,
        deserialize_with = "number_or_numeric_string"
    )]
    pub story_points: Option<f64>,
    /// `None` when the key is absent; an explicit `null` is kept as `Value::Null`
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
}

impl IssueFields {
    /// True when none of the fields the builder reads are set.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.labels.is_none()
            && self.parent.is_none()
            && self.assignee.is_none()
            && self.co_assignees.is_none()
            && self.story_points.is_none()
            && self.description.is_none()
    }
}

/// Story points arrive as a number or, from some field configurations, as a string.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let points = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(points)
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParentRef {
    pub key: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Changelog {
    #[serde(default)]
    pub histories: Vec<History>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct History {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct HistoryItem {
    #[serde(default)]
    pub field: String,
    #[serde(rename = "fromString")]
    pub from_string: Option<String>,
    #[serde(rename = "toString")]
    pub to_string: Option<String>,
}

/// One `status` transition from an issue's changelog.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange<'a> {
    pub at: Timestamp,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

impl StatusChange<'_> {
    pub fn is(&self, from: &str, to: &str) -> bool {
        self.from == Some(from) && self.to == Some(to)
    }
}

impl Issue {
    /// Decode raw search results, skipping entries that do not look like issues.
    pub fn decode_all(values: &[Value]) -> Vec<Issue> {
        values
            .iter()
            .filter_map(|value| match serde_json::from_value::<Issue>(value.clone()) {
                Ok(issue) => Some(issue),
                Err(e) => {
                    tracing::warn!("skipping undecodable issue: {e}");
                    None
                }
            })
            .collect()
    }

    /// Status transitions in the order the changelog delivers them.
    ///
    /// Entries whose `created` time cannot be parsed are skipped.
    pub fn status_changes(&self) -> impl Iterator<Item = StatusChange<'_>> {
        self.changelog.histories.iter().flat_map(|history| {
            let at = history.created.as_deref().and_then(Timestamp::parse);
            if at.is_none() {
                tracing::debug!(
                    "skipping history entry with unparseable time {:?}",
                    history.created
                );
            }
            history
                .items
                .iter()
                .filter(|item| item.field == "status")
                .filter_map(move |item| {
                    at.map(|at| StatusChange {
                        at,
                        from: item.from_string.as_deref(),
                        to: item.to_string.as_deref(),
                    })
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_search_result_issue() {
        let json = r#"{
            "key": "EVASS-2",
            "fields": {
                "summary": "Write tests",
                "labels": ["実装"],
                "parent": {"key": "EVASS-1"},
                "assignee": {"displayName": "Sato"},
                "customfield_10205": [{"displayName": "Ito"}],
                "customfield_10008": 3.0
            },
            "changelog": {"histories": [
                {"created": "2024-01-15T09:00:00.000+0900", "items": [
                    {"field": "assignee", "fromString": null, "toString": "Sato"},
                    {"field": "status", "fromString": "ToDo", "toString": "IN-PROGRESS"}
                ]},
                {"created": "garbage", "items": [
                    {"field": "status", "fromString": "IN-PROGRESS", "toString": "Done"}
                ]}
            ]}
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        let fields = issue.fields.as_ref().unwrap();
        assert_eq!(fields.summary.as_deref(), Some("Write tests"));
        assert_eq!(fields.parent.as_ref().unwrap().key, "EVASS-1");
        assert_eq!(fields.story_points, Some(3.0));

        let changes: Vec<_> = issue.status_changes().collect();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is("ToDo", "IN-PROGRESS"));
    }

    #[test]
    fn decode_all_skips_malformed_entries() {
        let values = vec![
            serde_json::json!({"key": "X-1", "fields": {"summary": "ok"}}),
            serde_json::json!({"key": "X-2", "fields": {"labels": "not-a-list"}}),
        ];
        let issues = Issue::decode_all(&values);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "X-1");
    }

    #[test]
    fn story_points_accept_numeric_strings() {
        let values = vec![
            serde_json::json!({"key": "P-1", "fields": {"summary": "a", "customfield_10008": "3"}}),
            serde_json::json!({"key": "P-2", "fields": {"summary": "b", "customfield_10008": 2}}),
            serde_json::json!({"key": "P-3", "fields": {"summary": "c", "customfield_10008": "n/a"}}),
        ];
        let issues = Issue::decode_all(&values);
        let points: Vec<_> = issues
            .iter()
            .map(|i| i.fields.as_ref().unwrap().story_points)
            .collect();
        assert_eq!(points, vec![Some(3.0), Some(2.0), None]);
    }

    #[test]
    fn history_without_created_keeps_the_issue() {
        let values = vec![serde_json::json!({
            "key": "S-1",
            "fields": {"summary": "task", "parent": {"key": "P-1"}},
            "changelog": {"histories": [
                {"items": [{"field": "comment"}]},
                {"created": "2024-01-15T09:00:00.000+0900", "items": [
                    {"field": "status", "fromString": "ToDo", "toString": "IN-PROGRESS"}
                ]}
            ]}
        })];
        let issues = Issue::decode_all(&values);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].status_changes().count(), 1);
    }

    #[test]
    fn description_null_differs_from_absent() {
        let with_null: IssueFields =
            serde_json::from_value(serde_json::json!({"description": null})).unwrap();
        assert_eq!(with_null.description, Some(Value::Null));
        assert!(!with_null.is_empty());

        let absent: IssueFields = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(absent.description.is_none());
        assert!(absent.is_empty());
    }

    #[test]
    fn tolerates_null_labels_and_missing_changelog() {
        let issue: Issue =
            serde_json::from_str(r#"{"key": "X-1", "fields": {"labels": null}}"#).unwrap();
        assert_eq!(issue.status_changes().count(), 0);
        assert!(issue.fields.unwrap().labels.is_none());
    }
}
