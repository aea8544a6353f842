//! Command implementations for the CLI interface.
//!
//! This module contains the handlers behind each `dm` subcommand: the task
//! table and detail views, the session commands that drive a project board
//! (tagging, toggling, re-parenting), the project and team overviews, the
//! integrity report and the TUI launcher. Session commands apply their change
//! to an in-memory board and print the result; nothing is written back.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::warn;

use crate::board::Board;
use crate::config::Config;
use crate::db::*;
use crate::fields::*;
use crate::forest::TaskForest;
use crate::palette::TagPalette;
use crate::project::{days_remaining, Progress, Project};
use crate::task::Task;
use crate::tui::app::App;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive task tree.
    Ui {
        /// Project id or name (defaults to the configured or first project).
        #[arg(long)]
        project: Option<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Project id or name. Lists every project when omitted and none is configured.
        #[arg(long)]
        project: Option<String>,
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by tag. May be repeated. Accepts comma-separated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Render as a tree across parent-child relationships.
        #[arg(long)]
        tree: bool,
        /// Include completed tasks even when the config hides them.
        #[arg(long)]
        all: bool,
        /// Sort key (ignored with --tree).
        #[arg(long, value_enum, default_value_t = SortKey::Fixture)]
        sort: SortKey,
    },

    /// View a single task by ID or title.
    View {
        /// Task ID or title to view
        task: String,
        /// Show child subtree.
        #[arg(long)]
        children: bool,
        /// Show ancestor chain.
        #[arg(long)]
        parents: bool,
    },

    /// Drop one or more tags on a task (session only).
    Tag {
        /// Task ID or title
        task: String,
        /// Tags to drop. Accepts comma-separated.
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Toggle a task between done and to-do (session only).
    Toggle {
        /// Task ID or title
        task: String,
    },

    /// Move a task under another task, or to the top level (session only).
    Reparent {
        /// Task ID or title
        task: String,
        /// New parent ID or title. Omit to make the task a root.
        #[arg(long)]
        parent: Option<String>,
    },

    /// List projects with their progress.
    Projects,

    /// List the members of a project's team.
    Team {
        /// Project id or name
        project: String,
    },

    /// List the tag palette and tag usage counts.
    Tags,

    /// Report broken parent links in the task data.
    Check,

    /// Generate shell completion scripts.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Filters applied by `dm list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub tags: Vec<String>,
    pub include_done: bool,
}

impl ListFilter {
    fn matches(&self, t: &Task) -> bool {
        if !self.include_done && t.is_done() {
            return false;
        }
        if let Some(s) = self.status {
            if t.status != s {
                return false;
            }
        }
        self.tags.iter().all(|tag| t.has_tag(tag))
    }
}

/// Split repeated, comma-separated tag arguments into single tags.
pub fn split_tags(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for chunk in raw {
        for tag in chunk.split(',') {
            let tag = tag.trim();
            if !tag.is_empty() && !out.iter().any(|t| t == tag) {
                out.push(tag.to_string());
            }
        }
    }
    out
}

/// Rows for the task table with their indentation depth.
///
/// In tree mode every node is expanded and rows that fail the filter are
/// dropped without hiding their children.
pub fn list_rows<'a>(forest: &'a TaskForest, filter: &ListFilter, tree: bool, sort: SortKey) -> Vec<(&'a Task, usize)> {
    if tree {
        return forest
            .visible_rows(|_| true)
            .into_iter()
            .filter(|r| filter.matches(r.task))
            .map(|r| (r.task, r.depth))
            .collect();
    }

    let mut rows: Vec<&Task> = forest.iter().filter(|t| filter.matches(t)).collect();
    match sort {
        SortKey::Fixture => {}
        SortKey::Due => rows.sort_by(|a, b| {
            (a.due.unwrap_or(NaiveDate::MAX), &a.id).cmp(&(b.due.unwrap_or(NaiveDate::MAX), &b.id))
        }),
        SortKey::Priority => rows.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.due.unwrap_or(NaiveDate::MAX).cmp(&b.due.unwrap_or(NaiveDate::MAX)))
        }),
        SortKey::Title => rows.sort_by_key(|t| t.title.to_lowercase()),
    }
    rows.into_iter().map(|t| (t, 0)).collect()
}

fn exit_with(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn project_or_exit<'a>(identifier: &str, db: &'a Database) -> &'a Project {
    resolve_project(identifier, db).unwrap_or_else(|e| exit_with(e))
}

fn forest_or_exit(tasks: Vec<Task>) -> TaskForest {
    TaskForest::new(tasks).unwrap_or_else(|e| exit_with(format!("Invalid task data: {e}")))
}

/// Open the board of the project owning `identifier`. Returns the board and the task id.
fn board_for_task(db: &Database, palette: &TagPalette, identifier: &str) -> (Board, String) {
    let task_id = resolve_task_identifier(identifier, &db.tasks)
        .unwrap_or_else(|e| exit_with(format!("Error resolving task: {e}")));
    let Some(project_id) = db.tasks.iter().find(|t| t.id == task_id).map(|t| t.project.clone()) else {
        exit_with(format!("Task {} not found.", task_id));
    };
    let Some(project) = db.project(&project_id) else {
        exit_with(format!("Task {} belongs to unknown project '{}'.", task_id, project_id));
    };
    let board = Board::for_project(db, project, palette.clone(), false)
        .unwrap_or_else(|e| exit_with(format!("Cannot open project {}: {e}", project.id)));
    (board, task_id)
}

fn print_board(board: &mut Board, db: &Database) {
    board.expand_all();
    let rows: Vec<(&Task, usize)> = board.visible_rows().into_iter().map(|r| (r.task, r.depth)).collect();
    print_table(&rows, db, Local::now().date_naive());
}

/// Launch the terminal user interface.
pub fn cmd_ui(db: Database, config: &Config, palette: TagPalette, project: Option<String>) {
    if db.projects.is_empty() {
        exit_with("No projects in the data file.");
    }
    let index = match project.or_else(|| config.default_project.clone()) {
        Some(ident) => {
            let id = project_or_exit(&ident, &db).id.clone();
            db.projects.iter().position(|p| p.id == id).unwrap_or(0)
        }
        None => 0,
    };
    let mut app = match App::new(db, palette, index, config.ui.expand_all) {
        Ok(app) => app,
        Err(e) => exit_with(format!("Cannot open project: {e}")),
    };
    if let Err(e) = run_tui(&mut app) {
        exit_with(format!("UI error: {e}"));
    }
}

/// List tasks as a table, optionally as an indented tree.
#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    db: &Database,
    config: &Config,
    project: Option<String>,
    status: Option<Status>,
    tags: Vec<String>,
    tree: bool,
    all: bool,
    sort: SortKey,
) {
    let tasks = match project.or_else(|| config.default_project.clone()) {
        Some(ident) => {
            let p = project_or_exit(&ident, db);
            db.tasks_for_project(&p.id)
        }
        None => db.tasks.clone(),
    };
    let forest = forest_or_exit(tasks);
    let filter = ListFilter {
        status,
        tags: split_tags(&tags),
        include_done: all || config.ui.show_completed,
    };
    let rows = list_rows(&forest, &filter, tree, sort);
    if rows.is_empty() {
        println!("No tasks match.");
        return;
    }
    print_table(&rows, db, Local::now().date_naive());
}

/// View detailed information about a specific task.
pub fn cmd_view(db: &Database, task: String, children: bool, parents: bool) {
    let task_id = resolve_task_identifier(&task, &db.tasks)
        .unwrap_or_else(|e| exit_with(format!("Error resolving task: {e}")));
    let Some(task) = db.tasks.iter().find(|t| t.id == task_id) else {
        exit_with(format!("Task {} not found.", task_id));
    };
    let forest = forest_or_exit(db.tasks_for_project(&task.project));
    let today = Local::now().date_naive();
    let name_of = |id: &str| db.user(id).map(|u| u.name.clone());

    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", format_status(task.status));
    println!("Priority:     {}", format_priority(task.priority));
    println!(
        "Project:      {}",
        db.project(&task.project).map(|p| p.name.as_str()).unwrap_or(&task.project)
    );
    println!(
        "Assignee:     {}",
        task.assignee.as_deref().and_then(name_of).unwrap_or_else(|| "-".into())
    );
    println!(
        "Due:          {}",
        match task.due {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Parent:       {}", task.parent.clone().unwrap_or_else(|| "-".into()));
    println!("Tags:         {}", if task.tags.is_empty() { "-".into() } else { task.tags.join(",") });
    println!("Description:\n{}\n", if task.description.is_empty() { "-" } else { task.description.as_str() });

    if !task.comments.is_empty() {
        println!("Comments:");
        for c in &task.comments {
            let author = name_of(&c.author).unwrap_or_else(|| "?".into());
            println!("  {} ({}): {}", author, c.timestamp.format("%Y-%m-%d %H:%M"), c.content);
        }
    }
    if !task.attachments.is_empty() {
        println!("Attachments:");
        for a in &task.attachments {
            println!(
                "  {} [{}{}] {}",
                a.file_name,
                format_file_type(a.file_type),
                a.size.as_deref().map(|s| format!(", {s}")).unwrap_or_default(),
                a.url
            );
        }
    }

    if parents {
        let chain = forest.ancestors(&task.id);
        if chain.is_empty() {
            println!("Ancestors: -");
        } else {
            println!("Ancestors (closest first): {}", chain.join(" -> "));
        }
    }

    if children {
        println!("Children:");
        let base = forest.depth(&task.id);
        let subtree = forest.descendants(&task.id);
        if subtree.is_empty() {
            println!("  -");
        }
        for t in subtree {
            let depth = forest.depth(&t.id) - base;
            println!("{}- {} [{}] (#{})", "  ".repeat(depth), t.title, format_status(t.status), t.id);
        }
    }
}

/// Drop tags on a task and print the task's row.
pub fn cmd_tag(db: &Database, palette: &TagPalette, task: String, tags: Vec<String>) {
    let (mut board, task_id) = board_for_task(db, palette, &task);
    for tag in split_tags(&tags) {
        if palette.colour_of(&tag).is_none() {
            warn!(tag = %tag, "tag is not in the palette");
        }
        if let Err(e) = board.add_tag(&task_id, &tag) {
            exit_with(format!("Cannot tag task: {e}"));
        }
    }
    if let Some(t) = board.forest().get(&task_id) {
        print_table(&[(t, 0)], db, Local::now().date_naive());
    }
}

/// Toggle a task's done state and print the project's new progress.
pub fn cmd_toggle(db: &Database, palette: &TagPalette, task: String) {
    let (mut board, task_id) = board_for_task(db, palette, &task);
    match board.toggle_status(&task_id) {
        Ok(status) => {
            let progress = board.progress();
            println!("Task {} is now {}.", task_id, format_status(status));
            println!(
                "{}: {}/{} done ({}%)",
                board.project().name,
                progress.completed,
                progress.total,
                progress.percent()
            );
        }
        Err(e) => exit_with(format!("Cannot toggle task: {e}")),
    }
}

/// Move a task under a new parent and print the resulting tree.
pub fn cmd_reparent(db: &Database, palette: &TagPalette, task: String, parent: Option<String>) {
    let (mut board, task_id) = board_for_task(db, palette, &task);
    let parent_id = parent.map(|p| {
        resolve_task_identifier(&p, board.forest().iter())
            .unwrap_or_else(|e| exit_with(format!("Error resolving parent: {e}")))
    });
    if let Err(e) = board.reparent(&task_id, parent_id.as_deref()) {
        exit_with(format!("Cannot move task: {e}"));
    }
    print_board(&mut board, db);
}

/// List all projects with progress and deadline.
pub fn cmd_projects(db: &Database) {
    let today = Local::now().date_naive();
    println!(
        "{:<10} {:<20} {:<12} {:<14} {:<11} {}",
        "ID", "Project", "Status", "Progress", "Due", "Left"
    );
    for p in &db.projects {
        let progress = Progress::of(db.tasks.iter().filter(|t| t.project == p.id));
        let left = match days_remaining(p, today) {
            Some(d) if d >= 0 => format!("{}d", d),
            Some(d) => format!("{}d late", -d),
            None => "-".into(),
        };
        println!(
            "{:<10} {:<20} {:<12} {:<14} {:<11} {}",
            truncate(&p.id, 10),
            truncate(&p.name, 20),
            format_project_status(p.status),
            format!("{}/{} ({}%)", progress.completed, progress.total, progress.percent()),
            p.due.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            left
        );
    }
}

/// List the members of a project's team.
pub fn cmd_team(db: &Database, project: String) {
    let p = project_or_exit(&project, db);
    println!("{}", p.name);
    println!("{:<4} {:<20} {:<24} {}", "", "Name", "Role", "Email");
    for u in db.team(p) {
        println!(
            "{:<4} {:<20} {:<24} {}",
            u.initials(),
            truncate(&u.name, 20),
            truncate(&u.role, 24),
            u.email
        );
    }
}

/// List the palette tags with their colours and usage counts, then tags used outside the palette.
pub fn cmd_tags(db: &Database, palette: &TagPalette) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for t in &db.tasks {
        for tag in &t.tags {
            *counts.entry(tag.clone()).or_default() += 1;
        }
    }
    println!("{:<16} {:<10} {}", "Tag", "Colour", "Count");
    for tag in palette.tags() {
        let colour = palette.colour_of(tag).map(|c| format!("{:?}", c)).unwrap_or_default();
        println!("{:<16} {:<10} {}", truncate(tag, 16), colour, counts.remove(tag).unwrap_or(0));
    }
    for (tag, c) in counts {
        println!("{:<16} {:<10} {}", truncate(&tag, 16), "-", c);
    }
}

/// Report broken parent links and tasks of unknown projects. Exits non-zero when anything is found.
pub fn cmd_check(db: &Database) {
    let forest = forest_or_exit(db.tasks.clone());
    let mut problems: Vec<String> = forest.check().iter().map(|i| i.to_string()).collect();
    for t in &db.tasks {
        if db.project(&t.project).is_none() {
            problems.push(format!("{}: project '{}' does not exist", t.id, t.project));
        }
    }
    if problems.is_empty() {
        println!("No problems found in {} tasks.", forest.len());
        return;
    }
    for p in &problems {
        println!("{}", p);
    }
    exit_with(format!("{} problem(s) found.", problems.len()));
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
