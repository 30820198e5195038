use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use url::Url;

use crate::config::{Config, Credentials};
use crate::error::{Error, Result};
use crate::types::Sprint;

const SEARCH_PATH: &str = "/rest/api/2/search";
const BOARD_PATH: &str = "/rest/agile/1.0/board";

/// Sprint states looked at when resolving a sprint by name.
pub const OPEN_SPRINT_STATES: &str = "active,future";

/// Jira REST client using basic auth. Requests are issued one at a time.
pub struct JiraClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    page_size: u32,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(rename = "startAt", default)]
    start_at: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<Value>,
}

#[derive(Deserialize)]
struct SprintPage {
    #[serde(rename = "isLast", default = "default_true")]
    is_last: bool,
    #[serde(default)]
    values: Vec<Sprint>,
}

fn default_true() -> bool {
    true
}

impl JiraClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: config.base_url()?.to_string(),
            credentials: config.credentials()?,
            page_size: config.page_size(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        Ok(response.json().await?)
    }

    /// Sprints of a board in the given comma-separated states.
    pub async fn sprints(&self, board_id: u64, states: &str) -> Result<Vec<Sprint>> {
        let mut sprints = Vec::new();

        loop {
            let mut url = self.endpoint(&format!("{BOARD_PATH}/{board_id}/sprint"))?;
            url.query_pairs_mut()
                .append_pair("state", states)
                .append_pair("startAt", &sprints.len().to_string())
                .append_pair("maxResults", &self.page_size.to_string());

            let page: SprintPage = self.get(url).await?;
            let fetched = page.values.len();
            sprints.extend(page.values);

            if page.is_last || fetched == 0 {
                break;
            }
        }

        tracing::info!("fetched {} sprints for board {board_id}", sprints.len());
        Ok(sprints)
    }

    pub async fn find_sprint(&self, board_id: u64, name: &str) -> Result<Sprint> {
        self.sprints(board_id, OPEN_SPRINT_STATES)
            .await?
            .into_iter()
            .find(|sprint| sprint.name == name)
            .ok_or_else(|| Error::SprintNotFound(name.to_string()))
    }

    /// Every issue matching `jql`, with changelog, as raw JSON.
    pub async fn search(&self, jql: &str) -> Result<Vec<Value>> {
        let mut issues = Vec::new();

        loop {
            let mut url = self.endpoint(SEARCH_PATH)?;
            url.query_pairs_mut()
                .append_pair("jql", jql)
                .append_pair("expand", "changelog")
                .append_pair("startAt", &issues.len().to_string())
                .append_pair("maxResults", &self.page_size.to_string());

            let page: SearchPage = self.get(url).await?;
            let fetched = page.issues.len() as u32;
            issues.extend(page.issues);

            if fetched == 0 || page.start_at + fetched >= page.total {
                break;
            }
        }

        tracing::info!("fetched {} issues", issues.len());
        Ok(issues)
    }
}

/// JQL selecting a sprint's issues, optionally narrowed to one team label.
pub fn sprint_jql(
    project: Option<&str>,
    sprint: &str,
    label: Option<&str>,
    excluded_labels: &[String],
) -> String {
    let mut clauses = Vec::new();

    if let Some(project) = project {
        clauses.push(format!("project = {}", quote(project)));
    }
    if let Some(label) = label {
        clauses.push(format!("labels = {}", quote(label)));
    }
    clauses.push(format!("sprint = {}", quote(sprint)));
    if !excluded_labels.is_empty() {
        let excluded: Vec<String> = excluded_labels.iter().map(|l| quote(l)).collect();
        clauses.push(format!("labels not in ({})", excluded.join(", ")));
    }

    format!("{} ORDER BY Rank", clauses.join(" AND "))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
