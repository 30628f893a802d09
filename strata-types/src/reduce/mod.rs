//! Pure document reducers.
//!
//! These functions are the single source of truth for action → document
//! mutations. Each one validates its input before touching the project, so an
//! action either applies completely or leaves the project untouched.
//!
//! Reducers do NOT:
//! - Push undo snapshots
//! - Log
//! - Talk to the live MIDI path

mod automation;
mod container;
mod effect;
mod mapping;
mod midi;
mod recording;
mod song;
mod track;

use crate::{
    Action, Container, ContainerField, ContainerId, DispatchResult, MappingRanges, Project,
    TimeSignature,
};

/// Defaults that reducers fall back on when an action leaves them open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduceContext {
    pub mapping_ranges: MappingRanges,
    pub default_tempo: f64,
    pub default_time_signature: TimeSignature,
}

impl Default for ReduceContext {
    fn default() -> Self {
        Self {
            mapping_ranges: MappingRanges::default(),
            default_tempo: 120.0,
            default_time_signature: TimeSignature::default(),
        }
    }
}

/// Apply a document action. Returns `DispatchResult::none()` for no-ops and
/// for the control actions (undo, redo, commit boundary) the dispatcher owns.
pub fn reduce_action(action: &Action, project: &mut Project, ctx: &ReduceContext) -> DispatchResult {
    match action {
        Action::Song(a) => song::reduce(a, project, ctx),
        Action::Track(a) => track::reduce(a, project),
        Action::Container(a) => container::reduce(a, project),
        Action::Effect(a) => effect::reduce(a, project),
        Action::Midi(a) => midi::reduce(a, project),
        Action::Mapping(a) => mapping::reduce(a, project, ctx),
        Action::Automation(a) => automation::reduce(a, project),
        Action::Recording(a) => recording::reduce(a, project),
        Action::CommitBoundary | Action::Undo | Action::Redo | Action::None => {
            DispatchResult::none()
        }
    }
}

/// Run an incremental edit of `field` on a container. Clones first receive the
/// inherited value so the edit starts from the effective content.
fn edit_container<R>(
    project: &mut Project,
    id: ContainerId,
    field: ContainerField,
    edit: impl FnOnce(&mut Container) -> R,
) -> Option<R> {
    project.materialize_field(id, field);
    project.find_container_mut(id).map(edit)
}

fn finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
