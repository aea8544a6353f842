//! Error types for the forest, the fixture loader, and configuration.

use std::path::PathBuf;

/// Rejected operations on the task forest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestError {
    #[error("no task with id '{0}'")]
    UnknownTask(String),
    #[error("task id '{0}' appears more than once")]
    DuplicateTask(String),
    #[error("task '{0}' cannot be its own parent")]
    SelfParent(String),
    #[error("task '{task}' belongs to {task_project} but parent '{parent}' belongs to {parent_project}")]
    ProjectMismatch {
        task: String,
        task_project: String,
        parent: String,
        parent_project: String,
    },
    #[error("making '{parent}' the parent of '{task}' would create a cycle")]
    Cycle { task: String, parent: String },
}

/// Failure to load fixture data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse fixture data: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Failure to load configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("unknown colour '{colour}' for tag '{tag}'")]
    UnknownColour { tag: String, colour: String },
}
