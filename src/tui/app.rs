//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which drives one project board:
//! it maps keys onto tree operations (cursor moves, expand/collapse,
//! selection, status toggles), emulates drag-and-drop of palette tags with
//! the keyboard, and renders the tree, the detail pane and the popups.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::warn;

use crate::board::Board;
use crate::db::{format_due_relative, status_box, Database};
use crate::error::ForestError;
use crate::fields::*;
use crate::forest::VisibleRow;
use crate::palette::TagPalette;
use crate::project::days_remaining;
use crate::tui::{
    colors::{status_color, tag_color, DEEP_BLUE, DROP_TARGET, MUTED},
    enums::AppState,
    utils::centered_rect,
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    db: Database,
    board: Board,
    project_index: usize,
    expand_all: bool,
    cursor: usize,
    palette_cursor: usize,
    status_message: String,
}

impl App {
    /// Create an app showing the project at `project_index` in the fixture.
    pub fn new(db: Database, palette: TagPalette, project_index: usize, expand_all: bool) -> Result<Self, ForestError> {
        let board = Self::open_board(&db, palette, project_index, expand_all)?;
        Ok(App {
            state: AppState::Tree,
            db,
            board,
            project_index,
            expand_all,
            cursor: 0,
            palette_cursor: 0,
            status_message: String::new(),
        })
    }

    fn open_board(db: &Database, palette: TagPalette, index: usize, expand_all: bool) -> Result<Board, ForestError> {
        Board::for_project(db, &db.projects[index], palette, expand_all)
    }

    /// Switch to the next project. Tree state starts fresh.
    fn next_project(&mut self) {
        if self.db.projects.len() < 2 {
            return;
        }
        let next = (self.project_index + 1) % self.db.projects.len();
        let palette = self.board.palette().clone();
        match Self::open_board(&self.db, palette, next, self.expand_all) {
            Ok(board) => {
                self.board = board;
                self.project_index = next;
                self.cursor = 0;
                self.set_status_message(format!("Project: {}", self.board.project().name));
            }
            Err(e) => {
                warn!(error = %e, "could not open project");
                self.set_status_message(format!("Cannot open project: {e}"));
            }
        }
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn row_ids(&self) -> Vec<String> {
        self.board.visible_rows().iter().map(|r| r.task.id.clone()).collect()
    }

    fn current_id(&self) -> Option<String> {
        self.row_ids().get(self.cursor).cloned()
    }

    fn is_dragging(&self) -> bool {
        self.board.tree().dragged_tag().is_some()
    }

    /// Move the cursor to row `index`, carrying the drag highlight along.
    fn set_cursor(&mut self, index: usize) {
        let rows = self.row_ids();
        if rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let old = self.cursor.min(rows.len() - 1);
        let new = index.min(rows.len() - 1);
        self.cursor = new;
        if self.is_dragging() {
            let tree = self.board.tree_mut();
            tree.drag_leave(&rows[old]);
            tree.drag_enter(&rows[new]);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor.saturating_add_signed(delta);
        self.set_cursor(target);
    }

    /// Keep the cursor on `id`, or on its closest visible ancestor. A drag in
    /// progress moves to the row the cursor lands on.
    fn follow(&mut self, id: &str) {
        let rows = self.row_ids();
        let mut candidates = vec![id.to_string()];
        candidates.extend(self.board.forest().ancestors(id));
        let index = candidates
            .iter()
            .find_map(|c| rows.iter().position(|r| r == c))
            .unwrap_or(0);
        self.cursor = index.min(rows.len().saturating_sub(1));
        if self.is_dragging() {
            if let Some(target) = rows.get(self.cursor) {
                self.board.tree_mut().drag_enter(target);
            }
        }
    }

    fn expand_current(&mut self) {
        if let Some(id) = self.current_id() {
            if self.board.forest().has_children(&id) {
                self.board.tree_mut().expand(&id);
            }
        }
    }

    fn collapse_current(&mut self) {
        let Some(id) = self.current_id() else {
            return;
        };
        if self.board.tree().is_expanded(&id) {
            self.board.tree_mut().collapse(&id);
        } else if let Some(parent) = self.board.forest().get(&id).and_then(|t| t.parent.clone()) {
            if let Some(index) = self.row_ids().iter().position(|r| *r == parent) {
                self.set_cursor(index);
            }
        }
    }

    fn select_current(&mut self) {
        let Some(id) = self.current_id() else {
            return;
        };
        if let Err(e) = self.board.select(&id) {
            self.set_status_message(e.to_string());
        }
    }

    fn drop_on_current(&mut self) {
        let (Some(id), Some(tag)) = (self.current_id(), self.board.tree().dragged_tag().map(str::to_string)) else {
            return;
        };
        if !self.board.tree().drag_over(&id) {
            return;
        }
        let already = self.board.forest().get(&id).is_some_and(|t| t.has_tag(&tag));
        match self.board.drop_tag(&id) {
            Ok(()) => {
                let title = self.board.forest().get(&id).map(|t| t.title.clone()).unwrap_or_default();
                if already {
                    self.set_status_message(format!("'{}' is already tagged {}", title, tag));
                } else {
                    self.set_status_message(format!("Tagged '{}' with {}", title, tag));
                }
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn toggle_current(&mut self) {
        let Some(id) = self.current_id() else {
            return;
        };
        match self.board.toggle_status(&id) {
            Ok(status) => self.set_status_message(format!("{} is now {}", id, format_status(status))),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn start_drag_from_palette(&mut self) {
        let Some(tag) = self.board.palette().get(self.palette_cursor).map(str::to_string) else {
            return;
        };
        self.board.tree_mut().start_drag(&tag);
        if let Some(id) = self.current_id() {
            self.board.tree_mut().drag_enter(&id);
        }
        self.state = AppState::Tree;
        self.set_status_message(format!("Dragging {} - move to a task and press Enter to drop, Esc to cancel", tag));
    }

    fn handle_tree_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.is_dragging() {
                    self.board.tree_mut().cancel_drag();
                    self.set_status_message("Drag cancelled".to_string());
                } else {
                    return true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Home => self.set_cursor(0),
            KeyCode::End => self.set_cursor(usize::MAX),
            KeyCode::Right | KeyCode::Char('l') => self.expand_current(),
            KeyCode::Left => self.collapse_current(),
            KeyCode::Tab => {
                if let Some(id) = self.current_id() {
                    if self.board.forest().has_children(&id) {
                        self.board.tree_mut().toggle_expanded(&id);
                    }
                }
            }
            KeyCode::Enter => {
                if self.is_dragging() {
                    self.drop_on_current();
                } else {
                    self.select_current();
                }
            }
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('t') => {
                self.state = AppState::Palette;
            }
            KeyCode::Char('e') => {
                let current = self.current_id();
                self.board.expand_all();
                if let Some(id) = current {
                    self.follow(&id);
                }
            }
            KeyCode::Char('E') => {
                let current = self.current_id();
                self.board.tree_mut().collapse_all();
                if let Some(id) = current {
                    self.follow(&id);
                }
            }
            KeyCode::Char('p') => self.next_project(),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_palette_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.palette_cursor = self.palette_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.palette_cursor + 1 < self.board.palette().len() {
                    self.palette_cursor += 1;
                }
            }
            KeyCode::Enter => self.start_drag_from_palette(),
            KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('q') => self.state = AppState::Tree,
            _ => {}
        }
    }

    fn handle_help_input(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::F(1)) {
            self.state = AppState::Tree;
        }
    }

    /// Apply one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.clear_status_message();
        match self.state {
            AppState::Tree => self.handle_tree_input(key, modifiers),
            AppState::Palette => {
                self.handle_palette_input(key);
                false
            }
            AppState::Help => {
                self.handle_help_input(key);
                false
            }
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let project = self.board.project();
        let progress = self.board.progress();
        let today = Local::now().date_naive();
        let deadline = match days_remaining(project, today) {
            Some(d) if d >= 0 => format!("  {} days left", d),
            Some(d) => format!("  {} days late", -d),
            None => String::new(),
        };
        let header_text = vec![Line::from(vec![
            Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format_project_status(project.status),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
            Span::raw(format!(
                "  {}/{} done ({}%){}",
                progress.completed,
                progress.total,
                progress.percent(),
                deadline
            )),
        ])];

        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, area);
    }

    fn tree_line(&self, row: &VisibleRow<'_>) -> Line<'static> {
        let task = row.task;
        let node = self.board.tree().node(&task.id);
        let arrow = match (row.has_children, node.expanded) {
            (true, true) => "▾ ",
            (true, false) => "▸ ",
            (false, _) => "  ",
        };
        let mut title_style = Style::default().fg(status_color(task.status));
        if node.selected {
            title_style = title_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }

        let mut spans = vec![
            Span::raw(format!("{}{}{} ", "  ".repeat(row.depth), arrow, status_box(task.status))),
            Span::styled(task.title.clone(), title_style),
        ];
        for tag in &task.tags {
            let style = match self.board.palette().colour_of(tag) {
                Some(c) => Style::default().fg(tag_color(c)),
                None => Style::default(),
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("[{}]", tag), style));
        }
        let mut meta = Vec::new();
        if let Some(user) = task.assignee.as_deref().and_then(|id| self.db.user(id)) {
            meta.push(user.initials());
        }
        if let Some(due) = task.due {
            meta.push(due.format("%Y-%m-%d").to_string());
        }
        if !meta.is_empty() {
            spans.push(Span::styled(format!("  {}", meta.join(" · ")), Style::default().fg(MUTED)));
        }
        Line::from(spans)
    }

    fn render_tree(&self, f: &mut Frame, area: Rect) {
        let rows = self.board.visible_rows();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let item = ListItem::new(self.tree_line(row));
                if self.board.tree().node(&row.task.id).dragged_over {
                    item.style(Style::default().bg(DROP_TARGET))
                } else {
                    item
                }
            })
            .collect();

        let title = format!("Tasks ({}) - Press 'h' for help", self.board.forest().len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if !rows.is_empty() {
            state.select(Some(self.cursor.min(rows.len() - 1)));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_detail(&self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let Some(task) = self.board.selected_task() else {
            let hint = Paragraph::new("Press Enter on a task to see its details")
                .block(block)
                .style(Style::default().fg(MUTED))
                .wrap(Wrap { trim: true });
            f.render_widget(hint, area);
            return;
        };

        let today = Local::now().date_naive();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(task.title.clone(), bold)),
            Line::from(""),
            Line::from(format!("Status:    {}", format_status(task.status))),
            Line::from(format!("Priority:  {}", format_priority(task.priority))),
            Line::from(format!(
                "Due:       {}",
                match task.due {
                    Some(d) => format!("{} ({})", d, format_due_relative(Some(d), today)),
                    None => "-".into(),
                }
            )),
        ];
        if let Some(user) = task.assignee.as_deref().and_then(|id| self.db.user(id)) {
            lines.push(Line::from(format!("Assignee:  {}", user.name)));
        }
        if let Some(parent) = task.parent.as_deref().and_then(|id| self.board.forest().get(id)) {
            lines.push(Line::from(format!("Parent:    {}", parent.title)));
        }
        lines.push(Line::from(format!(
            "Tags:      {}",
            if task.tags.is_empty() { "-".to_string() } else { task.tags.join(", ") }
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(task.description.clone()));

        if !task.comments.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("Comments ({})", task.comments.len()), bold)));
            for c in &task.comments {
                let author = self.db.user(&c.author).map(|u| u.name.as_str()).unwrap_or("?");
                lines.push(Line::from(vec![
                    Span::styled(format!("{} ", author), Style::default().fg(Color::Cyan)),
                    Span::styled(c.timestamp.format("%Y-%m-%d %H:%M").to_string(), Style::default().fg(MUTED)),
                ]));
                lines.push(Line::from(format!("  {}", c.content)));
            }
        }
        if !task.attachments.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("Attachments ({})", task.attachments.len()), bold)));
            for a in &task.attachments {
                lines.push(Line::from(format!(
                    "  {} ({}{})",
                    a.file_name,
                    format_file_type(a.file_type),
                    a.size.as_deref().map(|s| format!(", {s}")).unwrap_or_default()
                )));
            }
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_palette(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(30, 60, area);
        f.render_widget(Clear, area);
        let palette = self.board.palette();
        let items: Vec<ListItem> = palette
            .tags()
            .map(|tag| {
                let style = match self.board.palette().colour_of(tag) {
                    Some(c) => Style::default().fg(tag_color(c)),
                    None => Style::default(),
                };
                ListItem::new(Line::from(Span::styled(tag.to_string(), style)))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Drag a tag onto a task")
                    .border_style(Style::default().fg(DEEP_BLUE)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.palette_cursor));
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let heading = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("DevMinder Help", heading)),
            Line::from(""),
            Line::from(Span::styled("Task Tree:", heading)),
            Line::from("  ↑/↓, k/j     Move between tasks"),
            Line::from("  →/l, ←       Expand / collapse (← on a child jumps to its parent)"),
            Line::from("  Tab          Toggle the current node"),
            Line::from("  e / E        Expand all / collapse all"),
            Line::from("  Enter        Show task details"),
            Line::from("  Space        Toggle task done"),
            Line::from("  p            Next project"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Ctrl+C/Esc Quit"),
            Line::from(""),
            Line::from(Span::styled("Tagging:", heading)),
            Line::from("  t            Open the tag palette"),
            Line::from("  Enter        Pick the highlighted tag and start dragging it"),
            Line::from("  ↑/↓          Drag the tag over other tasks"),
            Line::from("  Enter        Drop the tag on the highlighted task"),
            Line::from("  Esc          Cancel the drag"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press Esc to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(tag) = self.board.tree().dragged_tag() {
            let target = self
                .board
                .tree()
                .drag_target()
                .and_then(|id| self.board.forest().get(id))
                .map(|t| t.title.as_str())
                .unwrap_or("-");
            format!("Dragging [{}] over '{}' | Enter: drop | Esc: cancel", tag, target)
        } else {
            match self.state {
                AppState::Tree => "Enter: details | Space: done | t: tags | p: project | h: help | q: quit".to_string(),
                AppState::Palette => "↑/↓: choose tag | Enter: drag | Esc: close".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(DEEP_BLUE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the current screen.
    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        if self.state == AppState::Help {
            self.render_help(f, chunks[1]);
        } else {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);
            self.render_tree(f, body[0]);
            self.render_detail(f, body[1]);
            if self.state == AppState::Palette {
                self.render_palette(f, chunks[1]);
            }
        }
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let db = Database::builtin().unwrap();
        App::new(db, TagPalette::default(), 0, false).unwrap()
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for &k in keys {
            assert!(!app.handle_key(k, KeyModifiers::NONE));
        }
    }

    /// Render into an in-memory buffer and return plain text (no styles).
    fn render_to_string(app: &App, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_initial_rows_are_roots() {
        let app = app();
        assert_eq!(
            app.row_ids(),
            vec!["task-today-1", "task-today-2", "task-today-3", "task-1", "task-2", "task-5"]
        );
    }

    #[test]
    fn test_expand_and_collapse_with_keys() {
        let mut app = app();
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Right]);
        assert_eq!(app.current_id().as_deref(), Some("task-1"));
        assert_eq!(app.row_ids().len(), 8);

        // Left on a child jumps to the parent, Left again collapses it.
        press(&mut app, &[KeyCode::Down, KeyCode::Left]);
        assert_eq!(app.current_id().as_deref(), Some("task-1"));
        press(&mut app, &[KeyCode::Left]);
        assert_eq!(app.row_ids().len(), 6);
    }

    #[test]
    fn test_drag_tag_from_palette_onto_subtask() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('e')]);
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Down]);
        assert_eq!(app.current_id().as_deref(), Some("task-1"));

        // Palette entry 0 is "Bug".
        press(&mut app, &[KeyCode::Char('t'), KeyCode::Enter]);
        assert_eq!(app.board.tree().dragged_tag(), Some("Bug"));
        assert!(app.board.tree().node("task-1").dragged_over);

        press(&mut app, &[KeyCode::Down]);
        assert!(!app.board.tree().node("task-1").dragged_over);
        assert!(app.board.tree().node("subtask-1").dragged_over);

        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.board.forest().get("subtask-1").unwrap().tags, vec!["Backend", "Bug"]);
        assert_eq!(app.board.tree().dragged_tag(), None);
        assert_eq!(app.board.tree().drag_target(), None);
        assert_eq!(app.status_message, "Tagged 'Configurar JWT' with Bug");
    }

    #[test]
    fn test_collapse_all_during_drag_moves_target_with_cursor() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('e')]);
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Down]);
        assert_eq!(app.current_id().as_deref(), Some("subtask-1"));

        press(&mut app, &[KeyCode::Char('t'), KeyCode::Enter, KeyCode::Char('E')]);
        assert_eq!(app.current_id().as_deref(), Some("task-1"));
        assert_eq!(app.board.tree().drag_target(), Some("task-1"));
        assert!(!app.board.tree().node("subtask-1").dragged_over);

        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.board.forest().get("task-1").unwrap().tags, vec!["Backend", "Urgente", "Bug"]);
        assert_eq!(app.board.forest().get("subtask-1").unwrap().tags, vec!["Backend"]);
    }

    #[test]
    fn test_escape_cancels_drag_before_quitting() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('t'), KeyCode::Enter, KeyCode::Esc]);
        assert_eq!(app.board.tree().dragged_tag(), None);
        assert!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE));
    }

    #[test]
    fn test_select_and_toggle() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.board.tree().selected(), Some("task-today-2"));
        assert!(!app.board.tree().node("task-today-1").selected);

        press(&mut app, &[KeyCode::Char(' ')]);
        assert_eq!(app.board.forest().get("task-today-2").unwrap().status, Status::Done);
    }

    #[test]
    fn test_next_project_resets_tree_state() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('p')]);
        assert_eq!(app.board.project().id, "proj-2");
        assert_eq!(app.board.tree().selected(), None);
        assert_eq!(app.row_ids(), vec!["task-3", "task-6"]);
    }

    #[test]
    fn test_render_tree_and_details() {
        let mut app = app();
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Right, KeyCode::Enter]);
        let screen = render_to_string(&app, 140, 44);
        assert!(screen.contains("E-commerce App"));
        assert!(screen.contains("▾ [~] Implementar autenticação de usuários"));
        assert!(screen.contains("Configurar JWT"));
        assert!(screen.contains("Assignee:  João Silva"));
        assert!(screen.contains("Comments (2)"));
        assert!(screen.contains("auth-requirements.pdf (pdf)"));
    }

    #[test]
    fn test_render_palette_popup() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('t')]);
        let screen = render_to_string(&app, 120, 40);
        assert!(screen.contains("Drag a tag onto a task"));
        assert!(screen.contains("Urgente"));
    }
}
