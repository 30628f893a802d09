use strata_types::{reduce_action, Action, DispatchResult};

use crate::state::undo::{coalesce_key, undo_scope};
use crate::state::AppState;

/// Dispatch an action. This is the single entry point for document mutation.
///
/// Undoable actions are snapshotted before they run and recorded only if the
/// reducer reports them as applied, so a rejected action leaves neither a
/// document change nor an undo entry behind. Edits that continue the open
/// gesture (same kind, same target) reuse the gesture's first snapshot.
pub fn dispatch_action(action: &Action, state: &mut AppState) -> DispatchResult {
    match action {
        Action::None => DispatchResult::none(),
        Action::CommitBoundary => {
            state.undo_history.commit_boundary();
            DispatchResult::none()
        }
        Action::Undo => match state.undo_history.undo(&mut state.project) {
            Some(scope) => {
                log::debug!(target: "undo", "undo {:?}", scope);
                state.dirty = true;
                DispatchResult::applied_anonymous()
            }
            None => DispatchResult::none(),
        },
        Action::Redo => match state.undo_history.redo(&mut state.project) {
            Some(scope) => {
                log::debug!(target: "undo", "redo {:?}", scope);
                state.dirty = true;
                DispatchResult::applied_anonymous()
            }
            None => DispatchResult::none(),
        },
        _ => dispatch_mutation(action, state),
    }
}

fn dispatch_mutation(action: &Action, state: &mut AppState) -> DispatchResult {
    let key = coalesce_key(action);
    let snapshot = if state.undo_history.extends_gesture(key) {
        None
    } else {
        let scope = undo_scope(action, &state.project);
        Some(state.undo_history.snapshot(scope, &state.project))
    };

    let result = reduce_action(action, &mut state.project, &state.context);

    if result.applied {
        let coalesced = snapshot.is_none();
        state.undo_history.record(snapshot, key);
        state.dirty = true;
        log::debug!(
            target: "dispatch",
            "applied {:?} -> {:?}{}",
            action,
            result.affected,
            if coalesced { " (coalesced)" } else { "" }
        );
    } else {
        log::debug!(target: "dispatch", "ignored {:?}", action);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::{EntityRef, SongAction, TrackAction, TrackId, TrackKind};

    fn state_with_track() -> (AppState, TrackId) {
        let mut state = AppState::new();
        let song = match dispatch_action(&Action::Song(SongAction::Add { name: "s".into() }), &mut state).affected {
            Some(EntityRef::Song(id)) => id,
            other => panic!("unexpected {other:?}"),
        };
        let add = Action::Track(TrackAction::Add {
            song_id: song,
            name: "t".into(),
            kind: TrackKind::Audio,
        });
        let track = match dispatch_action(&add, &mut state).affected {
            Some(EntityRef::Track(id)) => id,
            other => panic!("unexpected {other:?}"),
        };
        state.undo_history.clear();
        (state, track)
    }

    #[test]
    fn rejected_action_records_nothing() {
        let (mut state, _) = state_with_track();
        let ghost = TrackId::from_raw(999);
        let result = dispatch_action(&Action::Track(TrackAction::ToggleMute(ghost)), &mut state);
        assert!(result.is_noop());
        assert!(!state.undo_history.can_undo());
    }

    #[test]
    fn toggles_coalesce_until_boundary() {
        let (mut state, track) = state_with_track();
        let toggle = Action::Track(TrackAction::ToggleMute(track));
        for _ in 0..3 {
            dispatch_action(&toggle, &mut state);
        }
        assert_eq!(state.undo_history.undo_depth(), 1);

        dispatch_action(&Action::CommitBoundary, &mut state);
        dispatch_action(&toggle, &mut state);
        assert_eq!(state.undo_history.undo_depth(), 2);
    }

    #[test]
    fn undo_at_empty_stack_is_a_noop() {
        let (mut state, _) = state_with_track();
        assert!(dispatch_action(&Action::Undo, &mut state).is_noop());
        assert!(dispatch_action(&Action::Redo, &mut state).is_noop());
    }

    #[test]
    fn applied_mutation_marks_dirty() {
        let (mut state, track) = state_with_track();
        state.dirty = false;
        dispatch_action(&Action::Track(TrackAction::SetPan(track, 0.3)), &mut state);
        assert!(state.dirty);
    }
}
