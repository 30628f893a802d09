use crate::{
    ContainerField, DispatchResult, EntityRef, MidiAction, MidiNote, MidiSequence, NoteId, Project,
};

use super::edit_container;

pub(super) fn reduce(action: &MidiAction, project: &mut Project) -> DispatchResult {
    match action {
        MidiAction::SetNotes(container_id, specs) => {
            if project.find_container(*container_id).is_none() || !specs.iter().all(|s| s.is_valid()) {
                return DispatchResult::none();
            }
            let mut sequence = MidiSequence::new();
            for spec in specs {
                let id: NoteId = project.ids.next();
                sequence.add_note(MidiNote::new(id, *spec));
            }
            match project.find_container_mut(*container_id) {
                Some(container) => {
                    container.set_midi_sequence(Some(sequence));
                    DispatchResult::applied(EntityRef::Container(*container_id))
                }
                None => DispatchResult::none(),
            }
        }
        MidiAction::ClearSequence(container_id) => match project.find_container_mut(*container_id) {
            Some(container) => {
                container.set_midi_sequence(None);
                DispatchResult::applied(EntityRef::Container(*container_id))
            }
            None => DispatchResult::none(),
        },
        MidiAction::AddNote(container_id, spec) => {
            if project.find_container(*container_id).is_none() || !spec.is_valid() {
                return DispatchResult::none();
            }
            let id: NoteId = project.ids.next();
            edit_container(project, *container_id, ContainerField::MidiSequence, |c| {
                c.edit_midi_sequence().add_note(MidiNote::new(id, *spec))
            });
            DispatchResult::applied(EntityRef::Note(id))
        }
        MidiAction::RemoveNote(container_id, note_id) => {
            if !has_note(project, *container_id, *note_id) {
                return DispatchResult::none();
            }
            edit_container(project, *container_id, ContainerField::MidiSequence, |c| {
                c.edit_midi_sequence().remove_note(*note_id)
            });
            DispatchResult::applied(EntityRef::Note(*note_id))
        }
        MidiAction::UpdateNote(container_id, note_id, spec) => {
            if !spec.is_valid() || !has_note(project, *container_id, *note_id) {
                return DispatchResult::none();
            }
            edit_container(project, *container_id, ContainerField::MidiSequence, |c| {
                c.edit_midi_sequence().update_note(*note_id, *spec)
            });
            DispatchResult::applied(EntityRef::Note(*note_id))
        }
    }
}

/// Whether the container's effective sequence holds the note.
fn has_note(project: &Project, container_id: crate::ContainerId, note_id: NoteId) -> bool {
    project
        .resolved_container(container_id)
        .and_then(|c| c.midi_sequence)
        .is_some_and(|seq| seq.note(note_id).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContainerId, NoteSpec, TimeSignature, TrackKind};

    fn setup() -> (Project, ContainerId) {
        let mut project = Project::new();
        let song = project.add_song("s", 120.0, TimeSignature::default());
        let track = project.add_track(song, "t", TrackKind::Midi).unwrap();
        let container = project.add_container(track, "c", 0.0, 4.0).unwrap();
        (project, container)
    }

    fn note(pitch: u8, start: f64) -> NoteSpec {
        NoteSpec {
            pitch,
            velocity: 90,
            start_beat: start,
            duration_beats: 0.5,
        }
    }

    #[test]
    fn add_update_remove_note() {
        let (mut project, c) = setup();
        let result = reduce(&MidiAction::AddNote(c, note(60, 1.0)), &mut project);
        let Some(EntityRef::Note(id)) = result.affected else {
            panic!("expected note id");
        };
        assert!(reduce(&MidiAction::UpdateNote(c, id, note(67, 0.0)), &mut project).applied);
        let seq = project.find_container(c).unwrap().midi_sequence.clone().unwrap();
        assert_eq!(seq.note(id).unwrap().pitch, 67);

        assert!(reduce(&MidiAction::RemoveNote(c, id), &mut project).applied);
        assert!(reduce(&MidiAction::RemoveNote(c, id), &mut project).is_noop());
    }

    #[test]
    fn invalid_note_is_rejected() {
        let (mut project, c) = setup();
        let mut bad = note(60, 0.0);
        bad.duration_beats = 0.0;
        assert!(reduce(&MidiAction::AddNote(c, bad), &mut project).is_noop());
        assert!(reduce(&MidiAction::SetNotes(c, vec![note(60, 0.0), bad]), &mut project).is_noop());
        assert!(project.find_container(c).unwrap().midi_sequence.is_none());
    }

    #[test]
    fn clone_can_remove_inherited_note() {
        let (mut project, parent) = setup();
        reduce(&MidiAction::SetNotes(parent, vec![note(60, 0.0), note(64, 1.0)]), &mut project);
        let clone = project.clone_container(parent, None, None).unwrap();
        let first = project.find_container(parent).unwrap().midi_sequence.as_ref().unwrap().notes[0].id;

        assert!(reduce(&MidiAction::RemoveNote(clone, first), &mut project).applied);
        let clone_notes = project.resolved_container(clone).unwrap().midi_sequence.unwrap().notes;
        assert_eq!(clone_notes.len(), 1);
        let parent_notes = project.resolved_container(parent).unwrap().midi_sequence.unwrap().notes;
        assert_eq!(parent_notes.len(), 2);
    }
}
