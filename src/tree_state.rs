//! Interactive state of the rendered task tree.
//!
//! Expansion is tracked per node. Selection and the drag-over highlight are
//! single-valued, so at most one node can ever report either flag. None of
//! this touches task data: drops and clicks come back out as `TreeEvent`s
//! for the owning board to apply.

use std::collections::HashSet;

use tracing::trace;

/// The UI state of a single node. The three axes are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub expanded: bool,
    pub dragged_over: bool,
    pub selected: bool,
}

/// Requests emitted by the tree for its owner to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// Append `tag` to the task's tags.
    UpdateTaskTags { task_id: String, tag: String },
    /// Make the task the detail target.
    SelectTask(String),
}

#[derive(Debug, Clone, Default)]
pub struct TreeState {
    expanded: HashSet<String>,
    selected: Option<String>,
    drag_target: Option<String>,
    dragged_tag: Option<String>,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full state record for `id`.
    pub fn node(&self, id: &str) -> NodeState {
        NodeState {
            expanded: self.expanded.contains(id),
            dragged_over: self.drag_target.as_deref() == Some(id),
            selected: self.selected.as_deref() == Some(id),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    pub fn expand_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.expanded.extend(ids.into_iter().map(str::to_string));
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select `id`. Selecting the current selection keeps it selected.
    pub fn select(&mut self, id: &str) -> TreeEvent {
        self.selected = Some(id.to_string());
        TreeEvent::SelectTask(id.to_string())
    }

    pub fn dragged_tag(&self) -> Option<&str> {
        self.dragged_tag.as_deref()
    }

    pub fn drag_target(&self) -> Option<&str> {
        self.drag_target.as_deref()
    }

    /// Pick up `tag` from the palette.
    pub fn start_drag(&mut self, tag: &str) {
        trace!(tag, "drag started");
        self.dragged_tag = Some(tag.to_string());
    }

    /// Abandon the drag without dropping.
    pub fn cancel_drag(&mut self) {
        self.dragged_tag = None;
        self.drag_target = None;
    }

    pub fn drag_enter(&mut self, id: &str) {
        self.drag_target = Some(id.to_string());
    }

    /// Clear the highlight only if `id` holds it; a late leave from a
    /// previous node must not clear the node just entered.
    pub fn drag_leave(&mut self, id: &str) {
        if self.drag_target.as_deref() == Some(id) {
            self.drag_target = None;
        }
    }

    /// Whether a drop on `id` would be accepted. Every node accepts any tag
    /// while a drag is in progress, so only the drag itself is checked.
    pub fn drag_over(&self, _id: &str) -> bool {
        self.dragged_tag.is_some()
    }

    /// Drop the dragged tag on `id`. Ends the drag either way.
    pub fn drop_on(&mut self, id: &str) -> Option<TreeEvent> {
        self.drag_target = None;
        let tag = self.dragged_tag.take()?;
        trace!(task = id, tag = %tag, "tag dropped");
        Some(TreeEvent::UpdateTaskTags {
            task_id: id.to_string(),
            tag,
        })
    }
}
