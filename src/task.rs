//! Task data structure and related records.
//!
//! This module defines the `Task` struct that represents a single work item
//! together with the comments and attachments that hang off it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A unit of work belonging to a project, optionally nested under a parent task.
///
/// `tags` is ordered and never holds the same tag twice; new tags are
/// appended at the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, alias = "dueDate")]
    pub due: Option<NaiveDate>,
    #[serde(default, alias = "assigneeId")]
    pub assignee: Option<String>,
    #[serde(alias = "projectId")]
    pub project: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "parentId")]
    pub parent: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Task {
    /// Create a task with only the required fields set.
    pub fn new(id: &str, title: &str, project: &str) -> Self {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            status: Status::Todo,
            priority: Priority::Medium,
            due: None,
            assignee: None,
            project: project.to_string(),
            tags: Vec::new(),
            parent: None,
            comments: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// A remark left on a task by a team member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    #[serde(alias = "userId")]
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A file linked to a task or a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    #[serde(alias = "fileName")]
    pub file_name: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, alias = "uploaderId")]
    pub uploader: Option<String>,
    #[serde(default, alias = "fileType")]
    pub file_type: Option<FileType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_task_accepts_dashboard_field_names() {
        let json = r#"{
            "id": "subtask-1",
            "title": "Configurar JWT",
            "status": "Concluído",
            "priority": "Alta",
            "dueDate": "2024-08-02",
            "assigneeId": "user-2",
            "projectId": "proj-1",
            "tags": ["Backend"],
            "parentId": "task-1"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.parent.as_deref(), Some("task-1"));
        assert_eq!(task.project, "proj-1");
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.priority, Priority::High);
        assert!(task.comments.is_empty());
        assert!(task.has_tag("Backend"));
        assert!(!task.has_tag("Frontend"));
    }
}
