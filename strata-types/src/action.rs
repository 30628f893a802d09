//! Action types for the dispatch system.
//!
//! Actions represent user intents that flow through `dispatch_action`. Every
//! mutating action is recorded with the undo history by the dispatcher.

use serde::{Deserialize, Serialize};

use crate::shapes::ShapeRequest;
use crate::{
    AutomationBreakpoint, AutomationTarget, ContainerField, ContainerId, EffectId, EffectPath,
    EffectType, EntityRef, Fade, InstrumentOverride, LaneId, LoopSettings, MappingId,
    MappingTarget, MidiTrigger, NoteId, NoteSpec, RecordingId, SongId, TimeSignature, TrackId,
    TrackKind, TriggerAction,
};

// ============================================================================
// Domain actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SongAction {
    /// Tempo and meter come from the configured defaults
    Add { name: String },
    Remove(SongId),
    Rename(SongId, String),
    SetTempo(SongId, f64),
    SetTimeSignature(SongId, TimeSignature),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackAction {
    Add {
        song_id: SongId,
        name: String,
        kind: TrackKind,
    },
    Remove(TrackId),
    Rename(TrackId, String),
    SetVolume(TrackId, f32),
    SetPan(TrackId, f32),
    ToggleMute(TrackId),
    ToggleSolo(TrackId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContainerAction {
    Add {
        track_id: TrackId,
        name: String,
        start_bar: f64,
        length_bars: f64,
    },
    Remove(ContainerId),
    /// Move along the timeline, optionally onto another track
    Move {
        id: ContainerId,
        start_bar: f64,
        track_id: Option<TrackId>,
    },
    Resize(ContainerId, f64),
    /// Linked copy. Defaults to the source's track, placed right after it.
    Clone {
        source: ContainerId,
        track_id: Option<TrackId>,
        start_bar: Option<f64>,
    },
    Rename(ContainerId, String),
    SetAudioSource {
        id: ContainerId,
        recording: Option<RecordingId>,
        start_offset: f64,
    },
    SetFadeIn(ContainerId, Option<Fade>),
    SetFadeOut(ContainerId, Option<Fade>),
    SetEnterActions(ContainerId, Vec<TriggerAction>),
    SetExitActions(ContainerId, Vec<TriggerAction>),
    SetLoop(ContainerId, Option<LoopSettings>),
    SetInstrumentOverride(ContainerId, Option<InstrumentOverride>),
    /// Let one field follow the parent again
    ResetOverride(ContainerId, ContainerField),
    /// Detach a clone from its parent, keeping its effective content
    Unlink(ContainerId),
}

/// Owner of an effect chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectHost {
    Track(TrackId),
    Container(ContainerId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectAction {
    /// Insert at `index`, or append when `None`
    Add {
        host: EffectHost,
        effect_type: EffectType,
        index: Option<usize>,
    },
    Remove {
        host: EffectHost,
        effect_id: EffectId,
    },
    /// Move the slot at position `from` to position `to`
    Move {
        host: EffectHost,
        from: usize,
        to: usize,
    },
    ToggleBypass {
        host: EffectHost,
        effect_id: EffectId,
    },
    SetParam {
        host: EffectHost,
        effect_id: EffectId,
        address: u64,
        value: f32,
    },
    ToggleChainBypass(EffectHost),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MidiAction {
    /// Replace the whole sequence; every note gets a fresh id
    SetNotes(ContainerId, Vec<NoteSpec>),
    ClearSequence(ContainerId),
    AddNote(ContainerId, NoteSpec),
    RemoveNote(ContainerId, NoteId),
    UpdateNote(ContainerId, NoteId, NoteSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MappingAction {
    /// `target: None` drives the track's volume
    AssignExpressionPedal {
        track_id: TrackId,
        controller: u8,
        target: Option<EffectPath>,
    },
    RemoveExpressionPedal(TrackId),
    /// Generic mapping; `range: None` uses the configured default for the target
    Add {
        trigger: MidiTrigger,
        target: MappingTarget,
        range: Option<(f32, f32)>,
    },
    Remove(MappingId),
    SetRange(MappingId, f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutomationAction {
    AddLane {
        container_id: ContainerId,
        target: AutomationTarget,
    },
    RemoveLane {
        container_id: ContainerId,
        lane_id: LaneId,
    },
    ToggleLane {
        container_id: ContainerId,
        lane_id: LaneId,
    },
    AddBreakpoint {
        container_id: ContainerId,
        lane_id: LaneId,
        point: AutomationBreakpoint,
    },
    RemoveBreakpoint {
        container_id: ContainerId,
        lane_id: LaneId,
        position: f64,
    },
    /// Replace breakpoints inside the request's range with a generated shape
    ApplyShape {
        container_id: ContainerId,
        lane_id: LaneId,
        request: ShapeRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordingAction {
    Add {
        name: String,
        location: String,
        sample_rate: u32,
        channel_count: u16,
        duration_seconds: f64,
    },
    Remove(RecordingId),
}

// ============================================================================
// Top-level action
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Song(SongAction),
    Track(TrackAction),
    Container(ContainerAction),
    Effect(EffectAction),
    Midi(MidiAction),
    Mapping(MappingAction),
    Automation(AutomationAction),
    Recording(RecordingAction),
    /// Ends the current undo gesture without changing the document
    CommitBoundary,
    Undo,
    Redo,
    None,
}

impl Action {
    /// True for actions that go through a reducer and may change the document.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Action::CommitBoundary | Action::Undo | Action::Redo | Action::None
        )
    }
}

// ============================================================================
// Dispatch result
// ============================================================================

/// Outcome of one dispatched action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// False when the action was a no-op (unknown id, invalid input)
    pub applied: bool,
    /// Entity created or touched by the action
    pub affected: Option<EntityRef>,
}

impl DispatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn applied(entity: EntityRef) -> Self {
        Self {
            applied: true,
            affected: Some(entity),
        }
    }

    /// Applied without a single entity to report (undo, redo).
    pub fn applied_anonymous() -> Self {
        Self {
            applied: true,
            affected: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.applied
    }
}
