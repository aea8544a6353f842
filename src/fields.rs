//! Enumerations and field types for tasks and projects.
//!
//! This module defines the structured values used to categorise work items:
//! task status and priority, project status, attachment file types, and the
//! sort keys offered by the CLI. Each fixture value accepts the Portuguese
//! dashboard labels as aliases so older data files keep loading.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task workflow status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "A Fazer")]
    Todo,
    #[serde(alias = "Em Andamento")]
    InProgress,
    #[serde(alias = "Em Revisão")]
    InReview,
    #[serde(alias = "Concluído")]
    Done,
}

impl Status {
    /// Status after clicking the row checkbox.
    pub fn toggled(self) -> Status {
        match self {
            Status::Done => Status::Todo,
            _ => Status::Done,
        }
    }
}

/// Task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[serde(alias = "Baixa")]
    Low,
    #[serde(alias = "Média")]
    Medium,
    #[serde(alias = "Alta")]
    High,
}

/// Lifecycle of a whole project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[serde(alias = "Planejamento")]
    Planning,
    #[serde(alias = "Em Andamento")]
    InProgress,
    #[serde(alias = "Concluído")]
    Done,
}

/// Coarse file classification used when listing attachments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Image,
    Pdf,
    Document,
    Archive,
    Other,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    /// Keep fixture order.
    Fixture,
    Due,
    Priority,
    Title,
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Todo => "To-Do",
        Status::InProgress => "In-Progress",
        Status::InReview => "In-Review",
        Status::Done => "Done",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

/// Format a project status for display.
pub fn format_project_status(s: ProjectStatus) -> &'static str {
    match s {
        ProjectStatus::Planning => "Planning",
        ProjectStatus::InProgress => "In-Progress",
        ProjectStatus::Done => "Done",
    }
}

/// Format an attachment file type for display.
pub fn format_file_type(t: Option<FileType>) -> &'static str {
    match t {
        Some(FileType::Image) => "image",
        Some(FileType::Pdf) => "pdf",
        Some(FileType::Document) => "document",
        Some(FileType::Archive) => "archive",
        Some(FileType::Other) | None => "file",
    }
}
