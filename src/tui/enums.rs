//! Enumerations for TUI state management.

/// Screen the terminal user interface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Task tree with the detail pane.
    Tree,
    /// Tag palette popup over the tree.
    Palette,
    Help,
}
