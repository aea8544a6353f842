//! # DevMinder - project dashboard
//!
//! A terminal dashboard for small development teams: projects, their team
//! members, and a collapsible task tree where tags are dragged from a palette
//! onto tasks.
//!
//! ## Key Features
//!
//! - **Task Tree**: Tasks are grouped under their parent task, at any depth, with
//!   per-node expand/collapse and a single selected task shown in a detail pane
//! - **Drag-and-Drop Tagging**: Pick a tag from the palette, carry it over the
//!   tree with the cursor and drop it; a tag is only ever added once
//! - **Project Overview**: Completion progress and days left until the deadline
//! - **Scriptable CLI**: Every view is also available as a plain table
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the task tree of the first project
//! dm ui
//!
//! # List the tasks of a project as a tree
//! dm list --project proj-1 --tree
//!
//! # Try tagging a task (nothing is saved)
//! dm tag task-1 Bug
//! ```
//!
//! ## Key Commands
//!
//! - `dm ui` - Interactive task tree
//! - `dm list` - Tasks with filtering, sorting and tree view
//! - `dm view <task>` - Task details with comments and attachments
//! - `dm projects` / `dm team <project>` - Project overview and team members
//! - `dm check` - Report broken parent links in the data
//!
//! Data comes from a JSON fixture: the built-in one, `--data <file>`, or the
//! `data` key of `~/.devminder/config.toml`. Changes made in a session are
//! never written back.

use clap::Parser;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod forest;
pub mod palette;
pub mod project;
pub mod task;
pub mod tree_state;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod run;
    pub mod utils;
}

use cli::{init_tracing, Cli};
use cmd::*;
use config::Config;
use db::Database;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.quiet) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // Commands that need neither config nor data
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let palette = match config.palette() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            std::process::exit(1);
        }
    };

    let data_path = cli.data.clone().or_else(|| config.data.clone());
    let db = match Database::load(data_path.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load data: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Ui { project } => cmd_ui(db, &config, palette, project),

        Commands::List { project, status, tags, tree, all, sort } =>
            cmd_list(&db, &config, project, status, tags, tree, all, sort),

        Commands::View { task, children, parents } => cmd_view(&db, task, children, parents),

        Commands::Tag { task, tags } => cmd_tag(&db, &palette, task, tags),

        Commands::Toggle { task } => cmd_toggle(&db, &palette, task),

        Commands::Reparent { task, parent } => cmd_reparent(&db, &palette, task, parent),

        Commands::Projects => cmd_projects(&db),

        Commands::Team { project } => cmd_team(&db, project),

        Commands::Tags => cmd_tags(&db, &palette),

        Commands::Check => cmd_check(&db),

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
