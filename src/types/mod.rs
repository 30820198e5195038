mod issue;
mod sprint;
mod user;

pub use issue::{Changelog, History, HistoryItem, Issue, IssueFields, ParentRef, StatusChange};
pub use sprint::Sprint;
pub use user::User;
