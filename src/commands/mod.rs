pub mod build;
pub mod init;
pub mod pbis;
pub mod sprint;
pub mod sprints;
pub mod stages;
