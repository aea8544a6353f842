//! The project board: owner of a project's task forest and tree state.
//!
//! The board is the only writer. The tree state and the renderers hand it
//! `TreeEvent`s and it applies them to the forest.

use tracing::{debug, info};

use crate::db::Database;
use crate::error::ForestError;
use crate::fields::Status;
use crate::forest::{TaskForest, VisibleRow};
use crate::palette::TagPalette;
use crate::project::{Progress, Project};
use crate::task::Task;
use crate::tree_state::{TreeEvent, TreeState};

#[derive(Debug, Clone)]
pub struct Board {
    project: Project,
    forest: TaskForest,
    tree: TreeState,
    palette: TagPalette,
}

impl Board {
    /// Board over the given tasks.
    pub fn new(project: Project, tasks: Vec<Task>, palette: TagPalette) -> Result<Self, ForestError> {
        let forest = TaskForest::new(tasks)?;
        Ok(Board {
            project,
            forest,
            tree: TreeState::new(),
            palette,
        })
    }

    /// Board over one project's tasks from the fixture. With `expand_all`
    /// every node that has children starts expanded.
    pub fn for_project(
        db: &Database,
        project: &Project,
        palette: TagPalette,
        expand_all: bool,
    ) -> Result<Self, ForestError> {
        let mut board = Self::new(project.clone(), db.tasks_for_project(&project.id), palette)?;
        if expand_all {
            board.expand_all();
        }
        info!(project = %project.id, tasks = board.forest.len(), expand_all, "board opened");
        Ok(board)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn forest(&self) -> &TaskForest {
        &self.forest
    }

    pub fn tree(&self) -> &TreeState {
        &self.tree
    }

    /// Direct access to the interactive state; task data stays read-only.
    pub fn tree_mut(&mut self) -> &mut TreeState {
        &mut self.tree
    }

    pub fn palette(&self) -> &TagPalette {
        &self.palette
    }

    /// Apply a request coming from the tree.
    pub fn dispatch(&mut self, event: TreeEvent) -> Result<(), ForestError> {
        match event {
            TreeEvent::UpdateTaskTags { task_id, tag } => {
                if self.forest.attach_tag(&task_id, &tag)? {
                    info!(task = %task_id, tag = %tag, "tag added to task");
                }
            }
            TreeEvent::SelectTask(task_id) => {
                if self.forest.get(&task_id).is_none() {
                    return Err(ForestError::UnknownTask(task_id));
                }
                self.tree.select(&task_id);
                debug!(task = %task_id, "task selected");
            }
        }
        Ok(())
    }

    /// Drop the dragged tag on `task_id` and apply the resulting request.
    pub fn drop_tag(&mut self, task_id: &str) -> Result<(), ForestError> {
        match self.tree.drop_on(task_id) {
            Some(event) => self.dispatch(event),
            None => Ok(()),
        }
    }

    /// Drag `tag` straight onto `task_id`.
    pub fn add_tag(&mut self, task_id: &str, tag: &str) -> Result<(), ForestError> {
        self.tree.start_drag(tag);
        self.tree.drag_enter(task_id);
        self.drop_tag(task_id)
    }

    pub fn select(&mut self, task_id: &str) -> Result<(), ForestError> {
        let event = TreeEvent::SelectTask(task_id.to_string());
        self.dispatch(event)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tree.selected().and_then(|id| self.forest.get(id))
    }

    pub fn toggle_status(&mut self, task_id: &str) -> Result<Status, ForestError> {
        let status = self.forest.toggle_status(task_id)?;
        info!(task = task_id, status = ?status, "status changed");
        Ok(status)
    }

    pub fn reparent(&mut self, task_id: &str, parent: Option<&str>) -> Result<(), ForestError> {
        self.forest.set_parent(task_id, parent)?;
        info!(task = task_id, parent = ?parent, "task moved");
        Ok(())
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self) {
        let parents: Vec<String> = self
            .forest
            .iter()
            .filter(|t| self.forest.has_children(&t.id))
            .map(|t| t.id.clone())
            .collect();
        self.tree.expand_all(parents.iter().map(String::as_str));
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        self.forest.visible_rows(|id| self.tree.is_expanded(id))
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.forest.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ProjectStatus;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        Project {
            id: "proj-1".into(),
            name: "E-commerce App".into(),
            description: String::new(),
            full_description: None,
            status: ProjectStatus::InProgress,
            team: vec![],
            due: None,
            attachments: vec![],
        }
    }

    fn board() -> Board {
        let mut p = Task::new("p", "Parent", "proj-1");
        p.tags = vec!["Backend".into()];
        let mut c = Task::new("c", "Child", "proj-1");
        c.parent = Some("p".into());
        Board::new(project(), vec![p, c], TagPalette::default()).unwrap()
    }

    fn tags<'a>(board: &'a Board, id: &str) -> &'a [String] {
        &board.forest().get(id).unwrap().tags
    }

    #[test]
    fn test_drop_appends_tag_once() {
        let mut board = board();
        board.tree_mut().start_drag("Urgente");
        board.tree_mut().drag_enter("c");
        board.drop_tag("c").unwrap();
        assert_eq!(tags(&board, "c"), ["Urgente"]);

        board.add_tag("c", "Urgente").unwrap();
        assert_eq!(tags(&board, "c"), ["Urgente"]);
        assert!(!board.tree().node("c").dragged_over);
    }

    #[test]
    fn test_drop_keeps_existing_order() {
        let mut board = board();
        board.add_tag("p", "Bug").unwrap();
        board.add_tag("p", "Backend").unwrap();
        assert_eq!(tags(&board, "p"), ["Backend", "Bug"]);
    }

    #[test]
    fn test_drop_on_unknown_task() {
        let mut board = board();
        assert_eq!(
            board.add_tag("ghost", "Bug"),
            Err(ForestError::UnknownTask("ghost".into()))
        );
    }

    #[test]
    fn test_selection_moves() {
        let mut board = board();
        board.select("p").unwrap();
        board.select("c").unwrap();
        assert!(!board.tree().node("p").selected);
        assert!(board.tree().node("c").selected);
        assert_eq!(board.selected_task().map(|t| t.id.as_str()), Some("c"));
        assert!(board.select("ghost").is_err());
        assert_eq!(board.tree().selected(), Some("c"));
    }

    #[test]
    fn test_expand_all_and_rows() {
        let mut board = board();
        assert_eq!(board.visible_rows().len(), 1);
        board.expand_all();
        let rows: Vec<_> = board.visible_rows().iter().map(|r| (r.task.id.clone(), r.depth)).collect();
        assert_eq!(rows, vec![("p".to_string(), 0), ("c".to_string(), 1)]);
    }

    #[test]
    fn test_toggle_and_progress() {
        let mut board = board();
        assert_eq!(board.progress().percent(), 0);
        assert_eq!(board.toggle_status("c"), Ok(Status::Done));
        assert_eq!(board.progress().percent(), 50);
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut board = board();
        assert!(matches!(board.reparent("p", Some("c")), Err(ForestError::Cycle { .. })));
        board.reparent("c", None).unwrap();
        assert_eq!(board.forest().roots().count(), 2);
    }

    #[test]
    fn test_for_project_uses_fixture() {
        let db = Database::builtin().unwrap();
        let project = db.project("proj-1").unwrap();
        let board = Board::for_project(&db, project, TagPalette::default(), false).unwrap();
        assert_eq!(board.forest().len(), 8);
        let roots: Vec<_> = board.forest().roots().map(|t| t.id.as_str()).collect();
        assert_eq!(roots, vec!["task-today-1", "task-today-2", "task-today-3", "task-1", "task-2", "task-5"]);
        let children: Vec<_> = board.forest().children("task-1").map(|t| t.id.as_str()).collect();
        assert_eq!(children, vec!["subtask-1", "subtask-2"]);
        assert!(board.forest().check().is_empty());
        assert_eq!(board.visible_rows().len(), 6);
    }

    #[test]
    fn test_for_project_expanded_from_config() {
        let db = Database::builtin().unwrap();
        let project = db.project("proj-1").unwrap();
        let board = Board::for_project(&db, project, TagPalette::default(), true).unwrap();
        assert!(board.tree().is_expanded("task-1"));
        assert!(!board.tree().is_expanded("task-5"));
        assert_eq!(board.visible_rows().len(), 8);
    }
}
