//! CLI commands for rubrica

pub mod course;
pub mod dispatch;
pub mod group;
pub mod init;
pub mod input;
pub mod nota;
pub mod report;
pub mod rubric;
pub mod status;
pub mod teacher;
