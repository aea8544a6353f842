//! The task forest: tasks keyed by id with an explicit parent -> children index.
//!
//! Tasks are kept in input order. The child index and the root list are
//! rebuilt once per structural change (construction or re-parenting), so
//! rendering walks the index instead of rescanning the task list for every
//! node.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::error::ForestError;
use crate::fields::Status;
use crate::task::Task;

/// A task as it appears in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRow<'a> {
    pub task: &'a Task,
    pub depth: usize,
    pub has_children: bool,
}

/// Integrity problems found in data that did not go through `set_parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    DanglingParent { task: String, parent: String },
    ProjectMismatch { task: String, parent: String },
    Cycle { task: String },
    /// Hidden because an ancestor is dangling or in a cycle.
    Unreachable { task: String, via: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::DanglingParent { task, parent } => {
                write!(f, "{task}: parent '{parent}' does not exist, task is hidden from the tree")
            }
            Issue::ProjectMismatch { task, parent } => {
                write!(f, "{task}: parent '{parent}' belongs to another project")
            }
            Issue::Cycle { task } => write!(f, "{task}: is its own ancestor, task is hidden from the tree"),
            Issue::Unreachable { task, via } => {
                write!(f, "{task}: ancestor '{via}' is not in the tree, task is hidden from the tree")
            }
        }
    }
}

/// Tasks of one or more projects arranged as a forest.
#[derive(Debug, Clone, Default)]
pub struct TaskForest {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
}

impl TaskForest {
    /// Build a forest from a flat task list. Fails only on duplicate ids.
    pub fn new(tasks: Vec<Task>) -> Result<Self, ForestError> {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, t) in tasks.iter().enumerate() {
            if index.insert(t.id.clone(), i).is_some() {
                return Err(ForestError::DuplicateTask(t.id.clone()));
            }
        }
        let mut forest = TaskForest {
            tasks,
            index,
            children: HashMap::new(),
            roots: Vec::new(),
        };
        forest.rebuild();
        Ok(forest)
    }

    fn rebuild(&mut self) {
        self.children.clear();
        self.roots.clear();
        for (i, t) in self.tasks.iter().enumerate() {
            match &t.parent {
                Some(p) => self.children.entry(p.clone()).or_default().push(i),
                None => self.roots.push(i),
            }
        }
        debug!(
            tasks = self.tasks.len(),
            roots = self.roots.len(),
            parents = self.children.len(),
            "rebuilt task forest index"
        );
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Task, ForestError> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| ForestError::UnknownTask(id.to_string()))?;
        Ok(&mut self.tasks[i])
    }

    /// Tasks without a parent, in input order.
    pub fn roots(&self) -> impl Iterator<Item = &Task> {
        self.roots.iter().map(|&i| &self.tasks[i])
    }

    /// Direct children of `id`, in input order.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &Task> {
        self.children
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.tasks[i])
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|v| !v.is_empty())
    }

    /// Ancestor ids, closest first. Stops if the chain loops or dangles.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut cur = self.get(id).and_then(|t| t.parent.as_deref());
        while let Some(pid) = cur {
            if !seen.insert(pid) {
                break;
            }
            chain.push(pid.to_string());
            cur = self.get(pid).and_then(|t| t.parent.as_deref());
        }
        chain
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len()
    }

    /// All descendants of `id`, depth-first in input order.
    pub fn descendants(&self, id: &str) -> Vec<&Task> {
        fn collect<'a>(forest: &'a TaskForest, id: &str, seen: &mut HashSet<String>, out: &mut Vec<&'a Task>) {
            for child in forest.children(id) {
                if seen.insert(child.id.clone()) {
                    out.push(child);
                    collect(forest, &child.id, seen, out);
                }
            }
        }
        let mut out = Vec::new();
        let mut seen = HashSet::from([id.to_string()]);
        collect(self, id, &mut seen, &mut out);
        out
    }

    /// Flattened render order. Descends into a node only when `is_expanded` says so.
    ///
    /// Each node has exactly one parent, so everything reachable from a root
    /// is a tree; tasks caught in a parent cycle are never reached.
    pub fn visible_rows<F>(&self, is_expanded: F) -> Vec<VisibleRow<'_>>
    where
        F: Fn(&str) -> bool,
    {
        fn walk<'a, F: Fn(&str) -> bool>(
            forest: &'a TaskForest,
            task: &'a Task,
            depth: usize,
            is_expanded: &F,
            out: &mut Vec<VisibleRow<'a>>,
        ) {
            let has_children = forest.has_children(&task.id);
            out.push(VisibleRow { task, depth, has_children });
            if has_children && is_expanded(&task.id) {
                for child in forest.children(&task.id) {
                    walk(forest, child, depth + 1, is_expanded, out);
                }
            }
        }

        let mut out = Vec::with_capacity(self.tasks.len());
        for root in self.roots() {
            walk(self, root, 0, &is_expanded, &mut out);
        }
        out
    }

    /// Append `tag` to the task's tags unless already present.
    ///
    /// Returns whether the tag was added.
    pub fn attach_tag(&mut self, id: &str, tag: &str) -> Result<bool, ForestError> {
        let task = self.get_mut(id)?;
        if task.has_tag(tag) {
            debug!(task = id, tag, "tag already present");
            return Ok(false);
        }
        task.tags.push(tag.to_string());
        debug!(task = id, tag, "tag attached");
        Ok(true)
    }

    /// Flip the task between done and to-do. Returns the new status.
    pub fn toggle_status(&mut self, id: &str) -> Result<Status, ForestError> {
        let task = self.get_mut(id)?;
        task.status = task.status.toggled();
        debug!(task = id, status = ?task.status, "status toggled");
        Ok(task.status)
    }

    /// Move `id` under `parent`, or to the root level with `None`.
    ///
    /// The parent must exist, share the task's project, and must not be the
    /// task itself or one of its descendants.
    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<(), ForestError> {
        let task = self.get(id).ok_or_else(|| ForestError::UnknownTask(id.to_string()))?;
        if let Some(pid) = parent {
            if pid == id {
                return Err(ForestError::SelfParent(id.to_string()));
            }
            let parent_task = self
                .get(pid)
                .ok_or_else(|| ForestError::UnknownTask(pid.to_string()))?;
            if parent_task.project != task.project {
                return Err(ForestError::ProjectMismatch {
                    task: id.to_string(),
                    task_project: task.project.clone(),
                    parent: pid.to_string(),
                    parent_project: parent_task.project.clone(),
                });
            }
            if self.ancestors(pid).iter().any(|a| a == id) {
                return Err(ForestError::Cycle {
                    task: id.to_string(),
                    parent: pid.to_string(),
                });
            }
        }

        self.get_mut(id)?.parent = parent.map(str::to_string);
        debug!(task = id, parent = ?parent, "task re-parented");
        self.rebuild();
        Ok(())
    }

    /// Report dangling parents, cross-project parents and parent cycles,
    /// then every task hidden below one of them.
    pub fn check(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        for t in &self.tasks {
            let Some(pid) = t.parent.as_deref() else {
                continue;
            };
            match self.get(pid) {
                None => issues.push(Issue::DanglingParent {
                    task: t.id.clone(),
                    parent: pid.to_string(),
                }),
                Some(p) if p.project != t.project => issues.push(Issue::ProjectMismatch {
                    task: t.id.clone(),
                    parent: pid.to_string(),
                }),
                Some(_) => {}
            }
            if self.in_cycle(&t.id) {
                issues.push(Issue::Cycle { task: t.id.clone() });
            }
        }

        let hidden_roots: HashSet<&str> = issues
            .iter()
            .filter_map(|i| match i {
                Issue::DanglingParent { task, .. } | Issue::Cycle { task } => Some(task.as_str()),
                _ => None,
            })
            .collect();
        let shown: HashSet<&str> = self.visible_rows(|_| true).into_iter().map(|r| r.task.id.as_str()).collect();
        let mut unreachable = Vec::new();
        for t in &self.tasks {
            if shown.contains(t.id.as_str()) || hidden_roots.contains(t.id.as_str()) {
                continue;
            }
            let chain = self.ancestors(&t.id);
            let via = chain
                .iter()
                .find(|a| hidden_roots.contains(a.as_str()))
                .or(chain.last())
                .cloned()
                .unwrap_or_default();
            unreachable.push(Issue::Unreachable { task: t.id.clone(), via });
        }
        issues.extend(unreachable);

        for issue in &issues {
            warn!(%issue, "task forest integrity problem");
        }
        issues
    }

    fn in_cycle(&self, id: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut cur = self.get(id).and_then(|t| t.parent.as_deref());
        while let Some(pid) = cur {
            if pid == id {
                return true;
            }
            if !seen.insert(pid) {
                return false;
            }
            cur = self.get(pid).and_then(|t| t.parent.as_deref());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: &str, parent: Option<&str>, tags: &[&str]) -> Task {
        let mut t = Task::new(id, &format!("Task {id}"), "proj-1");
        t.parent = parent.map(str::to_string);
        t.tags = tags.iter().map(|s| s.to_string()).collect();
        t
    }

    fn ids<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<&'a str> {
        tasks.map(|t| t.id.as_str()).collect()
    }

    fn sample() -> TaskForest {
        TaskForest::new(vec![
            task("a", None, &[]),
            task("a1", Some("a"), &[]),
            task("b", None, &[]),
            task("a2", Some("a"), &[]),
            task("a1x", Some("a1"), &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parent_and_child_scenario() {
        let forest = TaskForest::new(vec![task("p", None, &["Backend"]), task("c", Some("p"), &[])]).unwrap();
        assert_eq!(ids(forest.roots()), vec!["p"]);
        assert_eq!(ids(forest.children("p")), vec!["c"]);
        assert_eq!(ids(forest.children("c")), Vec::<&str>::new());
    }

    #[test]
    fn test_empty_forest() {
        let forest = TaskForest::new(vec![]).unwrap();
        assert!(forest.is_empty());
        assert_eq!(forest.roots().count(), 0);
        assert!(forest.visible_rows(|_| true).is_empty());
    }

    #[test]
    fn test_root_count_matches_parentless_tasks() {
        let forest = sample();
        let parentless = forest.iter().filter(|t| t.parent.is_none()).count();
        assert_eq!(forest.roots().count(), parentless);
        assert_eq!(ids(forest.roots()), vec!["a", "b"]);
    }

    #[test]
    fn test_children_keep_input_order_and_are_not_shared() {
        let forest = sample();
        assert_eq!(ids(forest.children("a")), vec!["a1", "a2"]);

        let mut seen = HashSet::new();
        for t in forest.iter() {
            for child in forest.children(&t.id) {
                assert_eq!(child.parent.as_deref(), Some(t.id.as_str()));
                assert!(seen.insert(child.id.clone()), "{} listed under two parents", child.id);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = TaskForest::new(vec![task("a", None, &[]), task("a", None, &[])]).unwrap_err();
        assert_eq!(err, ForestError::DuplicateTask("a".into()));
    }

    #[test]
    fn test_visible_rows_respects_expansion() {
        let forest = sample();
        let collapsed: Vec<_> = forest.visible_rows(|_| false).iter().map(|r| r.task.id.clone()).collect();
        assert_eq!(collapsed, vec!["a", "b"]);

        let rows = forest.visible_rows(|_| true);
        let flat: Vec<_> = rows.iter().map(|r| (r.task.id.as_str(), r.depth, r.has_children)).collect();
        assert_eq!(
            flat,
            vec![
                ("a", 0, true),
                ("a1", 1, true),
                ("a1x", 2, false),
                ("a2", 1, false),
                ("b", 0, false),
            ]
        );

        let only_a: Vec<_> = forest.visible_rows(|id| id == "a").iter().map(|r| r.task.id.clone()).collect();
        assert_eq!(only_a, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_attach_tag_is_idempotent() {
        let mut forest = TaskForest::new(vec![task("p", None, &["Backend"]), task("c", Some("p"), &[])]).unwrap();
        assert_eq!(forest.attach_tag("c", "Urgente"), Ok(true));
        assert_eq!(forest.get("c").unwrap().tags, vec!["Urgente"]);
        assert_eq!(forest.attach_tag("c", "Urgente"), Ok(false));
        assert_eq!(forest.get("c").unwrap().tags, vec!["Urgente"]);
    }

    #[test]
    fn test_attach_tag_appends_at_end() {
        let mut forest = TaskForest::new(vec![task("p", None, &["Backend", "Bug"])]).unwrap();
        forest.attach_tag("p", "Docs").unwrap();
        assert_eq!(forest.get("p").unwrap().tags, vec!["Backend", "Bug", "Docs"]);
        assert_eq!(forest.attach_tag("missing", "Docs"), Err(ForestError::UnknownTask("missing".into())));
    }

    #[test]
    fn test_toggle_status() {
        let mut forest = sample();
        assert_eq!(forest.toggle_status("a1"), Ok(Status::Done));
        assert_eq!(forest.toggle_status("a1"), Ok(Status::Todo));
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let forest = sample();
        assert_eq!(forest.ancestors("a1x"), vec!["a1", "a"]);
        assert_eq!(forest.depth("a1x"), 2);
        assert_eq!(forest.depth("b"), 0);
        assert_eq!(ids(forest.descendants("a").into_iter()), vec!["a1", "a1x", "a2"]);
    }

    #[test]
    fn test_set_parent_moves_subtree() {
        let mut forest = sample();
        forest.set_parent("a1", Some("b")).unwrap();
        assert_eq!(ids(forest.children("a")), vec!["a2"]);
        assert_eq!(ids(forest.children("b")), vec!["a1"]);
        assert_eq!(forest.ancestors("a1x"), vec!["a1", "b"]);

        forest.set_parent("a1", None).unwrap();
        assert_eq!(ids(forest.roots()), vec!["a", "a1", "b"]);
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut forest = sample();
        assert_eq!(forest.set_parent("a", Some("a")), Err(ForestError::SelfParent("a".into())));
        assert_eq!(
            forest.set_parent("a", Some("a1x")),
            Err(ForestError::Cycle { task: "a".into(), parent: "a1x".into() })
        );
        // Unchanged after the rejected move.
        assert_eq!(ids(forest.roots()), vec!["a", "b"]);
        assert_eq!(forest.ancestors("a1x"), vec!["a1", "a"]);
    }

    #[test]
    fn test_set_parent_rejects_other_project() {
        let mut other = task("z", None, &[]);
        other.project = "proj-2".into();
        let mut forest = TaskForest::new(vec![task("a", None, &[]), other]).unwrap();
        let err = forest.set_parent("a", Some("z")).unwrap_err();
        assert!(matches!(err, ForestError::ProjectMismatch { .. }));
        assert_eq!(
            forest.set_parent("a", Some("nope")),
            Err(ForestError::UnknownTask("nope".into()))
        );
    }

    #[test]
    fn test_check_reports_bad_fixture_data() {
        let mut stray = task("s", Some("b"), &[]);
        stray.project = "proj-2".into();
        let forest = TaskForest::new(vec![
            task("a", None, &[]),
            task("b", None, &[]),
            task("x", Some("y"), &[]),
            task("y", Some("x"), &[]),
            task("d", Some("ghost"), &[]),
            stray,
        ])
        .unwrap();

        let issues = forest.check();
        assert_eq!(
            issues,
            vec![
                Issue::Cycle { task: "x".into() },
                Issue::Cycle { task: "y".into() },
                Issue::DanglingParent { task: "d".into(), parent: "ghost".into() },
                Issue::ProjectMismatch { task: "s".into(), parent: "b".into() },
            ]
        );

        // Cycle members and orphans never render, and rendering terminates.
        let shown: Vec<_> = forest.visible_rows(|_| true).iter().map(|r| r.task.id.clone()).collect();
        assert_eq!(shown, vec!["a", "b", "s"]);
        assert_eq!(forest.ancestors("x"), vec!["y"]);
    }

    #[test]
    fn test_check_reports_descendants_of_hidden_tasks() {
        let forest = TaskForest::new(vec![
            task("x", Some("y"), &[]),
            task("y", Some("x"), &[]),
            task("z", Some("x"), &[]),
            task("d", Some("ghost"), &[]),
            task("e", Some("d"), &[]),
        ])
        .unwrap();

        assert!(forest.visible_rows(|_| true).is_empty());
        assert_eq!(
            forest.check(),
            vec![
                Issue::Cycle { task: "x".into() },
                Issue::Cycle { task: "y".into() },
                Issue::DanglingParent { task: "d".into(), parent: "ghost".into() },
                Issue::Unreachable { task: "z".into(), via: "x".into() },
                Issue::Unreachable { task: "e".into(), via: "d".into() },
            ]
        );
    }
}
