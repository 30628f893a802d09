mod common;

use strata_types::{
    Action, ContainerAction, ContainerField, EffectHost, EffectType, MidiAction, NoteSpec,
};

fn note(pitch: u8) -> NoteSpec {
    NoteSpec {
        pitch,
        velocity: 100,
        start_beat: 0.0,
        duration_beats: 1.0,
    }
}

#[test]
fn test_clone_follows_parent_until_overridden() {
    let (mut state, _, track) = common::state_with_track();
    let parent = common::add_container(&mut state, track, "Verse", 0.0);
    let clone = common::clone_container(&mut state, parent);

    let resolved = state.resolved_container(clone).unwrap();
    assert_eq!(resolved.start_bar, 4.0);
    assert_eq!(resolved.parent_container_id, Some(parent));

    common::dispatch(
        &mut state,
        Action::Container(ContainerAction::Rename(parent, "Verse A".into())),
    );
    assert_eq!(state.resolved_container(clone).unwrap().name, "Verse A");

    common::dispatch(
        &mut state,
        Action::Container(ContainerAction::Rename(clone, "Verse B".into())),
    );
    common::dispatch(
        &mut state,
        Action::Container(ContainerAction::Rename(parent, "Verse C".into())),
    );
    assert_eq!(state.resolved_container(clone).unwrap().name, "Verse B");
}

#[test]
fn test_incremental_edit_on_clone_starts_from_parent_content() {
    let (mut state, _, track) = common::state_with_track();
    let parent = common::add_container(&mut state, track, "Riff", 0.0);
    common::dispatch(&mut state, Action::Midi(MidiAction::AddNote(parent, note(60))));
    let clone = common::clone_container(&mut state, parent);

    common::dispatch(&mut state, Action::Midi(MidiAction::AddNote(clone, note(64))));

    let resolved = state.resolved_container(clone).unwrap();
    assert_eq!(resolved.midi_sequence.unwrap().notes.len(), 2);
    let local = state.project.find_container(clone).unwrap();
    assert!(local.is_overridden(ContainerField::MidiSequence));
    // Parent untouched
    let parent_notes = state.project.find_container(parent).unwrap();
    assert_eq!(parent_notes.midi_sequence.as_ref().unwrap().notes.len(), 1);
}

#[test]
fn test_reset_override_inherits_again() {
    let (mut state, _, track) = common::state_with_track();
    let parent = common::add_container(&mut state, track, "Hook", 0.0);
    let clone = common::clone_container(&mut state, parent);
    common::add_effect(&mut state, EffectHost::Container(clone), EffectType::Chorus);
    assert_eq!(state.resolved_container(clone).unwrap().effects.len(), 1);

    common::dispatch(
        &mut state,
        Action::Container(ContainerAction::ResetOverride(clone, ContainerField::Effects)),
    );
    assert!(state.resolved_container(clone).unwrap().effects.is_empty());
}

#[test]
fn test_deleting_parent_orphans_clone() {
    let (mut state, _, track) = common::state_with_track();
    let parent = common::add_container(&mut state, track, "Intro", 0.0);
    let clone = common::clone_container(&mut state, parent);

    common::dispatch(&mut state, Action::Container(ContainerAction::Remove(parent)));

    let orphan = state.project.find_container(clone).unwrap();
    assert_eq!(orphan.parent_container_id, Some(parent));
    assert!(state.project.find_container(parent).is_none());
    let resolved = state.resolved_container(clone).unwrap();
    assert_eq!(resolved.name, "Intro");

    common::dispatch(&mut state, Action::Undo);
    assert!(state.project.find_container(parent).is_some());
    assert_eq!(state.project.clones_of(parent), vec![clone]);
}

#[test]
fn test_unlink_keeps_effective_content() {
    let (mut state, _, track) = common::state_with_track();
    let parent = common::add_container(&mut state, track, "Bridge", 0.0);
    common::dispatch(&mut state, Action::Midi(MidiAction::AddNote(parent, note(48))));
    let clone = common::clone_container(&mut state, parent);

    common::dispatch(&mut state, Action::Container(ContainerAction::Unlink(clone)));
    common::dispatch(&mut state, Action::Midi(MidiAction::ClearSequence(parent)));

    let detached = state.project.find_container(clone).unwrap();
    assert!(detached.parent_container_id.is_none());
    assert!(detached.overridden_fields.is_empty());
    assert_eq!(detached.midi_sequence.as_ref().unwrap().notes.len(), 1);
}

#[test]
fn test_clone_of_unknown_container_is_noop() {
    let (mut state, _, _) = common::state_with_track();
    let ghost = strata_types::ContainerId::from_raw(777);
    let result = common::dispatch(
        &mut state,
        Action::Container(ContainerAction::Clone {
            source: ghost,
            track_id: None,
            start_bar: None,
        }),
    );
    assert!(result.is_noop());
    assert!(!state.undo_history.can_undo());
}
