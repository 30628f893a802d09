pub mod persistence;
pub mod undo;

pub use undo::{CoalesceKey, GestureKind, TargetRef, UndoHistory, UndoScope};

use strata_types::{Container, ContainerId, Project, ReduceContext};

use crate::config::Config;
use crate::midi::MappingSnapshot;

/// Everything the control thread owns: the document, its undo history and the
/// configured defaults.
pub struct AppState {
    pub project: Project,
    /// Undo/redo history (owned by state so dispatch can manage it)
    pub undo_history: UndoHistory,
    /// Defaults handed to reducers
    pub context: ReduceContext,
    /// Grid step offered to automation drawing tools, in bars
    pub grid_spacing: f64,
    /// Set by every applied mutation; cleared by whoever saves the document
    pub dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Empty project with built-in defaults.
    pub fn new() -> Self {
        Self::new_with_config(&Config::default())
    }

    pub fn new_with_config(config: &Config) -> Self {
        Self::from_project(Project::new(), config)
    }

    /// Wrap a loaded project. The history starts empty.
    pub fn from_project(project: Project, config: &Config) -> Self {
        Self {
            project,
            undo_history: UndoHistory::new(config.undo_max_depth())
                .with_coalesce_window(config.coalesce_window()),
            context: config.reduce_context(),
            grid_spacing: config.grid_spacing(),
            dirty: false,
        }
    }

    /// Effective state of a container, following its clone chain.
    pub fn resolved_container(&self, id: ContainerId) -> Option<Container> {
        self.project.resolved_container(id)
    }

    /// Mapping table for the live controller path.
    pub fn mapping_snapshot(&self) -> MappingSnapshot {
        MappingSnapshot::from_project(&self.project)
    }
}
