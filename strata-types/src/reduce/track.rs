use crate::{DispatchResult, EntityRef, Project, Track, TrackAction, TrackId, MAX_TRACK_VOLUME};

pub(super) fn reduce(action: &TrackAction, project: &mut Project) -> DispatchResult {
    match action {
        TrackAction::Add {
            song_id,
            name,
            kind,
        } => match project.add_track(*song_id, name.clone(), *kind) {
            Some(id) => DispatchResult::applied(EntityRef::Track(id)),
            None => DispatchResult::none(),
        },
        TrackAction::Remove(id) => match project.remove_track(*id) {
            Some(_) => DispatchResult::applied(EntityRef::Track(*id)),
            None => DispatchResult::none(),
        },
        TrackAction::Rename(id, name) => with_track(project, *id, |t| t.name = name.clone()),
        TrackAction::SetVolume(id, volume) => {
            if !volume.is_finite() {
                return DispatchResult::none();
            }
            with_track(project, *id, |t| t.volume = volume.clamp(0.0, MAX_TRACK_VOLUME))
        }
        TrackAction::SetPan(id, pan) => {
            if !pan.is_finite() {
                return DispatchResult::none();
            }
            with_track(project, *id, |t| t.pan = pan.clamp(-1.0, 1.0))
        }
        TrackAction::ToggleMute(id) => with_track(project, *id, |t| t.muted = !t.muted),
        TrackAction::ToggleSolo(id) => with_track(project, *id, |t| t.soloed = !t.soloed),
    }
}

fn with_track(project: &mut Project, id: TrackId, edit: impl FnOnce(&mut Track)) -> DispatchResult {
    match project.find_track_mut(id) {
        Some(track) => {
            edit(track);
            DispatchResult::applied(EntityRef::Track(id))
        }
        None => DispatchResult::none(),
    }
}
