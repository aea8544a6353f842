//! Projects, team members, and project-level progress.
//!
//! A project groups tasks and users. Progress figures are derived on demand
//! from the project's tasks rather than stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::ProjectStatus;
use crate::task::{Attachment, Task};

/// A team member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(alias = "joinDate")]
    pub joined: DateTime<Utc>,
}

impl User {
    /// Initials used where there is no room for the full name ("João Silva" -> "JS").
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

/// A project with its team and optional deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, alias = "fullDescription")]
    pub full_description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default, alias = "dueDate")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Completion figures for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Count done tasks among `tasks`.
    pub fn of<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut completed = 0;
        let mut total = 0;
        for t in tasks {
            total += 1;
            if t.is_done() {
                completed += 1;
            }
        }
        Progress { completed, total }
    }

    /// Rounded completion percentage; zero for a project with no tasks.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Days from `today` until the project deadline; negative once it has passed.
pub fn days_remaining(project: &Project, today: NaiveDate) -> Option<i64> {
    project.due.map(|d| (d - today).num_days())
}
