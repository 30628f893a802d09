use std::collections::VecDeque;
use std::time::{Duration, Instant};

use strata_types::{
    Action, AutomationAction, ContainerAction, ContainerId, EffectAction, EffectHost, EffectId,
    EntityRef, MappingAction, MidiAction, NoteId, Project, SongAction, Track, TrackAction, TrackId,
};

/// What part of the project an undo entry covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoScope {
    /// Only one track (and its containers) changed.
    Track(TrackId),
    /// Anything outside a single track: songs, mappings, recordings, moves
    /// between tracks.
    Project,
}

/// Kind of edit a coalesced gesture is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    SongTempo,
    TrackVolume,
    TrackPan,
    TrackMute,
    TrackSolo,
    ContainerMove,
    ContainerResize,
    EffectParam,
    EffectBypass,
    MappingRange,
    NoteEdit,
}

/// What a gesture edits. Two edits of the same kind only coalesce when their
/// targets match exactly.
///
/// Effects and notes are keyed by their host as well, since a clone carries
/// copies of its parent's nested ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Entity(EntityRef),
    Effect(EffectHost, EffectId),
    /// One parameter of one effect
    EffectParam(EffectHost, EffectId, u64),
    Note(ContainerId, NoteId),
}

/// Identifies a gesture for undo coalescing. Consecutive recorded edits with
/// the same `Gesture` key share a single undo entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoalesceKey {
    Gesture { op: GestureKind, target: TargetRef },
    /// Structural changes always get their own entry.
    None,
}

/// A single undo/redo entry storing only the state that was affected.
#[derive(Debug, Clone)]
enum UndoEntry {
    Track { id: TrackId, track: Box<Track> },
    Project(Box<Project>),
}

/// Pre-mutation state captured by the dispatcher. Becomes an undo entry once
/// the mutation is known to have applied.
#[derive(Debug)]
pub struct Snapshot(UndoEntry);

/// The open coalescing window.
#[derive(Debug, Clone, Copy)]
struct OpenGesture {
    op: GestureKind,
    target: TargetRef,
    last_edit: Instant,
}

pub struct UndoHistory {
    undo_stack: VecDeque<UndoEntry>,
    redo_stack: VecDeque<UndoEntry>,
    max_depth: usize,
    /// Optional wall-clock limit between edits of one gesture
    coalesce_window: Option<Duration>,
    gesture: Option<OpenGesture>,
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
            coalesce_window: None,
            gesture: None,
        }
    }

    pub fn with_coalesce_window(mut self, window: Option<Duration>) -> Self {
        self.coalesce_window = window;
        self
    }

    /// Whether an edit with `key` would join the open gesture instead of
    /// starting a new undo entry.
    pub fn extends_gesture(&self, key: CoalesceKey) -> bool {
        let CoalesceKey::Gesture { op, target } = key else {
            return false;
        };
        let Some(open) = self.gesture else {
            return false;
        };
        let within_window = self
            .coalesce_window
            .map_or(true, |w| open.last_edit.elapsed() < w);
        open.op == op && open.target == target && within_window
    }

    /// Capture the state an edit at `scope` is about to change.
    /// A track scope whose track is gone escalates to the whole project.
    pub fn snapshot(&self, scope: UndoScope, project: &Project) -> Snapshot {
        Snapshot(capture(scope, project))
    }

    /// Record an applied edit. `snapshot` is `None` when the edit extended the
    /// open gesture, in which case the pre-gesture entry stays on top.
    pub fn record(&mut self, snapshot: Option<Snapshot>, key: CoalesceKey) {
        let now = Instant::now();
        if let Some(Snapshot(entry)) = snapshot {
            self.push_entry(entry);
        }
        self.gesture = match key {
            CoalesceKey::Gesture { op, target } => Some(OpenGesture {
                op,
                target,
                last_edit: now,
            }),
            CoalesceKey::None => None,
        };
    }

    /// Push a scoped snapshot unconditionally and close any open gesture.
    pub fn push_scoped(&mut self, scope: UndoScope, project: &Project) {
        self.push_entry(capture(scope, project));
        self.gesture = None;
    }

    /// Close the open gesture so the next edit starts a new undo entry.
    pub fn commit_boundary(&mut self) {
        self.gesture = None;
    }

    fn push_entry(&mut self, entry: UndoEntry) {
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(entry);
        self.redo_stack.clear();
    }

    /// Undo: pop from undo stack, create inverse from current state, apply stored entry.
    /// Returns the scope of the undone entry, or `None` if nothing to undo.
    pub fn undo(&mut self, project: &mut Project) -> Option<UndoScope> {
        self.commit_boundary();
        let entry = self.undo_stack.pop_back()?;
        let scope = entry_scope(&entry);
        let inverse = create_inverse(&entry, project);
        apply_entry(entry, project);
        self.redo_stack.push_back(inverse);
        Some(scope)
    }

    /// Redo: pop from redo stack, create inverse from current state, apply stored entry.
    /// Returns the scope of the redone entry, or `None` if nothing to redo.
    pub fn redo(&mut self, project: &mut Project) -> Option<UndoScope> {
        self.commit_boundary();
        let entry = self.redo_stack.pop_back()?;
        let scope = entry_scope(&entry);
        let inverse = create_inverse(&entry, project);
        apply_entry(entry, project);
        self.undo_stack.push_back(inverse);
        Some(scope)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.commit_boundary();
    }
}

fn capture(scope: UndoScope, project: &Project) -> UndoEntry {
    match scope {
        UndoScope::Track(id) => match project.find_track(id) {
            Some(track) => UndoEntry::Track {
                id,
                track: Box::new(track.clone()),
            },
            None => UndoEntry::Project(Box::new(project.clone())),
        },
        UndoScope::Project => UndoEntry::Project(Box::new(project.clone())),
    }
}

/// Map an undo entry back to its scope.
fn entry_scope(entry: &UndoEntry) -> UndoScope {
    match entry {
        UndoEntry::Track { id, .. } => UndoScope::Track(*id),
        UndoEntry::Project(_) => UndoScope::Project,
    }
}

/// Create an inverse entry by snapshotting the *current* state at the same scope.
/// If the entry is track-scoped but the track no longer exists, escalate to
/// project scope.
fn create_inverse(entry: &UndoEntry, project: &Project) -> UndoEntry {
    capture(entry_scope(entry), project)
}

/// Apply a stored entry onto the live project. The id allocator is never
/// moved backwards, so ids handed out after the snapshot stay retired.
fn apply_entry(entry: UndoEntry, project: &mut Project) {
    match entry {
        UndoEntry::Track { id, track } => match project.find_track_mut(id) {
            Some(live) => *live = *track,
            None => {
                log::warn!(target: "undo", "{} vanished before restore; entry skipped", id);
            }
        },
        UndoEntry::Project(stored) => {
            let issued = project.ids.peek() - 1;
            *project = *stored;
            project.ids.reserve_through(issued);
        }
    }
    project.rebuild_index();
}

/// Determine the undo scope for an action based on what state it will touch.
pub fn undo_scope(action: &Action, project: &Project) -> UndoScope {
    let container_track = |id: ContainerId| match project.track_of_container(id) {
        Some(track) => UndoScope::Track(track),
        None => UndoScope::Project,
    };
    let host_track = |host: EffectHost| match host {
        EffectHost::Track(id) => UndoScope::Track(id),
        EffectHost::Container(id) => container_track(id),
    };

    match action {
        Action::Song(_) => UndoScope::Project,

        Action::Track(TrackAction::Add { .. } | TrackAction::Remove(_)) => UndoScope::Project,
        Action::Track(
            TrackAction::Rename(id, _)
            | TrackAction::SetVolume(id, _)
            | TrackAction::SetPan(id, _)
            | TrackAction::ToggleMute(id)
            | TrackAction::ToggleSolo(id),
        ) => UndoScope::Track(*id),

        Action::Container(a) => match a {
            ContainerAction::Add { track_id, .. } => UndoScope::Track(*track_id),
            ContainerAction::Move { id, track_id, .. } => {
                let current = project.track_of_container(*id);
                match track_id {
                    Some(dest) if current != Some(*dest) => UndoScope::Project,
                    _ => container_track(*id),
                }
            }
            ContainerAction::Clone {
                source, track_id, ..
            } => {
                let current = project.track_of_container(*source);
                match track_id {
                    Some(dest) if current != Some(*dest) => UndoScope::Project,
                    _ => container_track(*source),
                }
            }
            ContainerAction::Remove(id)
            | ContainerAction::Resize(id, _)
            | ContainerAction::Rename(id, _)
            | ContainerAction::SetAudioSource { id, .. }
            | ContainerAction::SetFadeIn(id, _)
            | ContainerAction::SetFadeOut(id, _)
            | ContainerAction::SetEnterActions(id, _)
            | ContainerAction::SetExitActions(id, _)
            | ContainerAction::SetLoop(id, _)
            | ContainerAction::SetInstrumentOverride(id, _)
            | ContainerAction::ResetOverride(id, _)
            | ContainerAction::Unlink(id) => container_track(*id),
        },

        Action::Effect(a) => match a {
            // Reshaping a track chain re-addresses mappings, which live on the project
            EffectAction::Add { host, .. }
            | EffectAction::Remove { host, .. }
            | EffectAction::Move { host, .. } => match host {
                EffectHost::Track(id) if project.has_effect_mappings(*id) => UndoScope::Project,
                _ => host_track(*host),
            },
            EffectAction::ToggleBypass { host, .. }
            | EffectAction::SetParam { host, .. }
            | EffectAction::ToggleChainBypass(host) => host_track(*host),
        },

        Action::Midi(
            MidiAction::SetNotes(id, _)
            | MidiAction::ClearSequence(id)
            | MidiAction::AddNote(id, _)
            | MidiAction::RemoveNote(id, _)
            | MidiAction::UpdateNote(id, _, _),
        ) => container_track(*id),

        Action::Automation(a) => match a {
            AutomationAction::AddLane { container_id, .. }
            | AutomationAction::RemoveLane { container_id, .. }
            | AutomationAction::ToggleLane { container_id, .. }
            | AutomationAction::AddBreakpoint { container_id, .. }
            | AutomationAction::RemoveBreakpoint { container_id, .. }
            | AutomationAction::ApplyShape { container_id, .. } => container_track(*container_id),
        },

        // Mappings span tracks and live on the project
        Action::Mapping(_) | Action::Recording(_) => UndoScope::Project,

        Action::CommitBoundary | Action::Undo | Action::Redo | Action::None => UndoScope::Project,
    }
}

/// Map an action to a coalesce key. Consecutive edits with the same key share
/// a single undo entry.
pub fn coalesce_key(action: &Action) -> CoalesceKey {
    let gesture = |op, entity| CoalesceKey::Gesture {
        op,
        target: TargetRef::Entity(entity),
    };

    match action {
        Action::Song(SongAction::SetTempo(id, _)) => gesture(GestureKind::SongTempo, EntityRef::Song(*id)),

        Action::Track(a) => match a {
            TrackAction::SetVolume(id, _) => gesture(GestureKind::TrackVolume, EntityRef::Track(*id)),
            TrackAction::SetPan(id, _) => gesture(GestureKind::TrackPan, EntityRef::Track(*id)),
            TrackAction::ToggleMute(id) => gesture(GestureKind::TrackMute, EntityRef::Track(*id)),
            TrackAction::ToggleSolo(id) => gesture(GestureKind::TrackSolo, EntityRef::Track(*id)),
            _ => CoalesceKey::None,
        },

        Action::Container(ContainerAction::Move { id, track_id: None, .. }) => {
            gesture(GestureKind::ContainerMove, EntityRef::Container(*id))
        }
        Action::Container(ContainerAction::Resize(id, _)) => {
            gesture(GestureKind::ContainerResize, EntityRef::Container(*id))
        }

        Action::Effect(EffectAction::SetParam {
            host,
            effect_id,
            address,
            ..
        }) => CoalesceKey::Gesture {
            op: GestureKind::EffectParam,
            target: TargetRef::EffectParam(*host, *effect_id, *address),
        },
        Action::Effect(EffectAction::ToggleBypass { host, effect_id }) => CoalesceKey::Gesture {
            op: GestureKind::EffectBypass,
            target: TargetRef::Effect(*host, *effect_id),
        },

        Action::Mapping(MappingAction::SetRange(id, _, _)) => {
            gesture(GestureKind::MappingRange, EntityRef::Mapping(*id))
        }

        Action::Midi(MidiAction::UpdateNote(container, note, _)) => CoalesceKey::Gesture {
            op: GestureKind::NoteEdit,
            target: TargetRef::Note(*container, *note),
        },

        _ => CoalesceKey::None,
    }
}
