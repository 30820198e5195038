use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::holidays::HolidayRegion;

const DEFAULT_PAGE_SIZE: u32 = 300;

#[derive(Deserialize, Default, Debug)]
pub struct Config {
    /// Jira root, e.g. `https://jira.example.com/jira`
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub board_id: Option<u64>,
    pub project: Option<String>,
    pub team_label: Option<String>,
    pub sprint_name: Option<String>,
    #[serde(default = "default_excluded_labels")]
    pub excluded_labels: Vec<String>,
    pub page_size: Option<u32>,
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CalendarConfig {
    #[serde(default = "default_work_hours")]
    pub work_hours: Vec<WorkHourConfig>,
    #[serde(default = "default_weekends")]
    pub weekends: Vec<String>,
    #[serde(default)]
    pub holiday_region: HolidayRegion,
    #[serde(default)]
    pub extra_holidays: Vec<NaiveDate>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WorkHourConfig {
    pub start: String,
    pub end: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            work_hours: default_work_hours(),
            weekends: default_weekends(),
            holiday_region: HolidayRegion::default(),
            extra_holidays: Vec::new(),
        }
    }
}

fn default_excluded_labels() -> Vec<String> {
    vec!["Impediment".to_string()]
}

fn default_work_hours() -> Vec<WorkHourConfig> {
    vec![WorkHourConfig {
        start: "09:00".to_string(),
        end: "18:00".to_string(),
    }]
}

fn default_weekends() -> Vec<String> {
    vec!["Saturday".to_string(), "Sunday".to_string()]
}

/// Basic-auth credentials for the Jira REST API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Load from an explicit path, or from the default location when `None`.
    ///
    /// A missing default file yields an empty config; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    tracing::debug!("no config file at {}, using defaults", path.display());
                    return Ok(Config::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&config_path).map_err(|e| Error::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;

        tracing::debug!("loaded config from {}", config_path.display());
        Self::parse(&contents, config_path)
    }

    pub fn parse(contents: &str, path: PathBuf) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::ConfigParse { path, source: e })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "sprint-metrics")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(Error::NoConfigDir)
    }

    /// Credentials with env vars taking precedence over the config file
    pub fn credentials(&self) -> Result<Credentials> {
        let username = std::env::var("JIRA_USERNAME")
            .ok()
            .or_else(|| self.username.clone());
        let password = std::env::var("JIRA_PASSWORD")
            .ok()
            .or_else(|| self.password.clone());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(Error::MissingCredentials),
        }
    }

    pub fn base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or(Error::MissingConfig("base_url"))
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Resolve a board id, preferring the explicit argument
    pub fn resolve_board(&self, explicit: Option<u64>) -> Result<u64> {
        explicit
            .or(self.board_id)
            .ok_or(Error::MissingConfig("board_id"))
    }

    pub fn resolve_sprint(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(String::from)
            .or_else(|| self.sprint_name.clone())
            .ok_or(Error::MissingConfig("sprint_name"))
    }

    pub fn resolve_label(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(String::from)
            .or_else(|| self.team_label.clone())
    }

    pub fn resolve_output(&self, explicit: Option<&Path>, fallback: &str) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.output_file.clone())
            .unwrap_or_else(|| PathBuf::from(fallback))
    }
}
