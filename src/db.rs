//! Fixture database and display helpers.
//!
//! This module provides the `Database` struct holding the users, projects and
//! tasks the dashboard is rendered from, along with the formatting and lookup
//! helpers shared by the CLI and the TUI. Nothing is ever written back: the
//! database is loaded once per run and discarded on exit.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DataError;
use crate::fields::*;
use crate::project::{Project, User};
use crate::task::Task;

const BUILTIN_FIXTURE: &str = include_str!("../fixtures/devminder.json");

/// In-memory snapshot of the dashboard data.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Database {
    /// The fixture compiled into the binary.
    pub fn builtin() -> Result<Self, DataError> {
        Ok(serde_json::from_str(BUILTIN_FIXTURE)?)
    }

    /// Load a fixture from `path`, or the built-in one when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, DataError> {
        let db = match path {
            None => Self::builtin()?,
            Some(p) => {
                let buf = fs::read_to_string(p).map_err(|e| DataError::ReadError {
                    path: p.to_path_buf(),
                    source: e,
                })?;
                serde_json::from_str(&buf)?
            }
        };
        info!(
            users = db.users.len(),
            projects = db.projects.len(),
            tasks = db.tasks.len(),
            source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "builtin".into()),
            "fixture loaded"
        );
        Ok(db)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Tasks of one project in fixture order.
    pub fn tasks_for_project(&self, project_id: &str) -> Vec<Task> {
        let tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.project == project_id)
            .cloned()
            .collect();
        debug!(project = project_id, count = tasks.len(), "selected project tasks");
        tasks
    }

    /// Members of a project's team, skipping ids with no matching user.
    pub fn team(&self, project: &Project) -> Vec<&User> {
        project.team.iter().filter_map(|id| self.user(id)).collect()
    }
}

/// Resolve a project by id or case-insensitive name.
pub fn resolve_project<'a>(identifier: &str, db: &'a Database) -> Result<&'a Project, String> {
    if let Some(p) = db.project(identifier) {
        return Ok(p);
    }
    let wanted = identifier.to_lowercase();
    db.projects
        .iter()
        .find(|p| p.name.to_lowercase() == wanted)
        .ok_or_else(|| format!("No project found with id or name '{}'", identifier))
}

/// Resolve a task identifier (either id or title) to a task id.
/// Returns an error if the title has multiple matches and suggests using the id instead.
pub fn resolve_task_identifier<'a>(
    identifier: &str,
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Result<String, String> {
    let wanted = identifier.to_lowercase();
    let mut matches = Vec::new();
    for task in tasks {
        if task.id == identifier {
            return Ok(task.id.clone());
        }
        if task.title.to_lowercase() == wanted {
            matches.push(task);
        }
    }

    match matches.len() {
        0 => Err(format!("No task found with id or title '{}'", identifier)),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let mut error_msg = format!("Multiple tasks found with title '{}':\n", identifier);
            for task in matches {
                error_msg.push_str(&format!("  {}: {} [project: {}]\n", task.id, task.title, task.project));
            }
            error_msg.push_str("Please use the specific id instead.");
            Err(error_msg)
        }
    }
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {}d", delta)
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Checkbox used for the status column.
pub fn status_box(status: Status) -> &'static str {
    match status {
        Status::Done => "[x]",
        Status::InProgress | Status::InReview => "[~]",
        Status::Todo => "[ ]",
    }
}

/// Print tasks in a formatted table with optional tree indentation.
pub fn print_table(rows: &[(&Task, usize)], db: &Database, today: NaiveDate) {
    println!(
        "{:<14} {:<3} {:<11} {:<6} {:<10} {:<4} {}",
        "ID", "", "Status", "Pri", "Due", "Who", "Title [tags]"
    );
    for (t, depth) in rows {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let who = t
            .assignee
            .as_deref()
            .and_then(|id| db.user(id))
            .map(|u| u.initials())
            .unwrap_or_default();
        println!(
            "{:<14} {:<3} {:<11} {:<6} {:<10} {:<4} {}{}{}",
            truncate(&t.id, 14),
            status_box(t.status),
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due, today),
            who,
            "  ".repeat(*depth),
            t.title,
            tags
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_fixture_loads() {
        let db = Database::load(None).unwrap();
        assert_eq!(db.users.len(), 6);
        assert_eq!(db.projects.len(), 4);
        let p1 = db.tasks_for_project("proj-1");
        assert_eq!(p1.len(), 8);
        let subtasks: Vec<_> = p1.iter().filter(|t| t.parent.as_deref() == Some("task-1")).collect();
        assert_eq!(subtasks.len(), 2);
        assert_eq!(db.user("user-3").map(|u| u.initials()), Some("PC".to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Database::load(Some(Path::new("/nonexistent/fixture.json"))).unwrap_err();
        assert!(matches!(err, DataError::ReadError { .. }));
    }

    #[test]
    fn test_team_skips_unknown_users() {
        let mut db = Database::builtin().unwrap();
        db.projects[0].team.push("user-404".into());
        let team = db.team(&db.projects[0]);
        assert_eq!(team.len(), 4);
    }

    #[test]
    fn test_resolve_project() {
        let db = Database::builtin().unwrap();
        assert_eq!(resolve_project("proj-2", &db).map(|p| p.id.as_str()), Ok("proj-2"));
        assert_eq!(resolve_project("crm system", &db).map(|p| p.id.as_str()), Ok("proj-3"));
        assert!(resolve_project("nope", &db).is_err());
    }

    #[test]
    fn test_resolve_task_identifier() {
        let mut a = Task::new("a", "Write docs", "p");
        let b = Task::new("b", "write DOCS", "p");
        let c = Task::new("c", "Ship", "p");
        assert_eq!(resolve_task_identifier("c", [&a, &b, &c]), Ok("c".to_string()));
        assert_eq!(resolve_task_identifier("ship", [&a, &b, &c]), Ok("c".to_string()));
        assert!(resolve_task_identifier("write docs", [&a, &b, &c]).unwrap_err().contains("Multiple"));
        a.title = "Other".into();
        assert_eq!(resolve_task_identifier("write docs", [&a, &b, &c]), Ok("b".to_string()));
        assert!(resolve_task_identifier("zzz", [&a, &b, &c]).is_err());
    }

    #[test]
    fn test_format_due_relative() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(today.succ_opt(), today), "tomorrow");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2024, 8, 4), today), "in 3d");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2024, 7, 30), today), "2d late");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }
}
