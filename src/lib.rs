//! Sprint backlog extraction and cycle-time metrics for Jira.
//!
//! Issues fetched from Jira are reshaped into backlog items (PBIs) with their
//! subtasks, each subtask timed in business minutes, and subtasks grouped
//! into development stages by label.

pub mod backlog;
pub mod calendar;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod duration;
pub mod error;
pub mod holidays;
pub mod output;
pub mod report;
pub mod stages;
pub mod timestamp;
pub mod types;

pub use backlog::{build_backlogs, Backlog, Subtask};
pub use calendar::WorkCalendar;
pub use config::Config;
pub use duration::business_minutes;
pub use error::{Error, Result};
pub use stages::{aggregate, Stage, StageReport};
pub use timestamp::Timestamp;
