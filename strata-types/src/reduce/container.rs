use crate::{Container, ContainerAction, ContainerId, DispatchResult, EntityRef, Project};

use super::finite;

pub(super) fn reduce(action: &ContainerAction, project: &mut Project) -> DispatchResult {
    match action {
        ContainerAction::Add {
            track_id,
            name,
            start_bar,
            length_bars,
        } => {
            if !finite(&[*start_bar, *length_bars]) || *length_bars <= 0.0 {
                return DispatchResult::none();
            }
            match project.add_container(*track_id, name.clone(), *start_bar, *length_bars) {
                Some(id) => DispatchResult::applied(EntityRef::Container(id)),
                None => DispatchResult::none(),
            }
        }
        ContainerAction::Remove(id) => match project.remove_container(*id) {
            Some(_) => DispatchResult::applied(EntityRef::Container(*id)),
            None => DispatchResult::none(),
        },
        ContainerAction::Move {
            id,
            start_bar,
            track_id,
        } => {
            if finite(&[*start_bar]) && project.move_container(*id, *start_bar, *track_id) {
                DispatchResult::applied(EntityRef::Container(*id))
            } else {
                DispatchResult::none()
            }
        }
        ContainerAction::Resize(id, length) => {
            if !finite(&[*length]) || *length <= 0.0 {
                return DispatchResult::none();
            }
            with_container(project, *id, |c| c.resize(*length))
        }
        ContainerAction::Clone {
            source,
            track_id,
            start_bar,
        } => {
            if start_bar.is_some_and(|s| !s.is_finite()) {
                return DispatchResult::none();
            }
            match project.clone_container(*source, *track_id, *start_bar) {
                Some(id) => DispatchResult::applied(EntityRef::Container(id)),
                None => DispatchResult::none(),
            }
        }
        ContainerAction::Rename(id, name) => with_container(project, *id, |c| c.set_name(name.clone())),
        ContainerAction::SetAudioSource {
            id,
            recording,
            start_offset,
        } => {
            let recording_known = recording.map_or(true, |r| project.recording(r).is_some());
            if !recording_known || !finite(&[*start_offset]) {
                return DispatchResult::none();
            }
            with_container(project, *id, |c| c.set_audio_source(*recording, *start_offset))
        }
        ContainerAction::SetFadeIn(id, fade) => {
            if fade.is_some_and(|f| !finite(&[f.duration_bars]) || f.duration_bars < 0.0) {
                return DispatchResult::none();
            }
            with_container(project, *id, |c| c.set_fade_in(*fade))
        }
        ContainerAction::SetFadeOut(id, fade) => {
            if fade.is_some_and(|f| !finite(&[f.duration_bars]) || f.duration_bars < 0.0) {
                return DispatchResult::none();
            }
            with_container(project, *id, |c| c.set_fade_out(*fade))
        }
        ContainerAction::SetEnterActions(id, actions) => {
            with_container(project, *id, |c| c.set_enter_actions(actions.clone()))
        }
        ContainerAction::SetExitActions(id, actions) => {
            with_container(project, *id, |c| c.set_exit_actions(actions.clone()))
        }
        ContainerAction::SetLoop(id, settings) => {
            let valid = settings.map_or(true, |s| {
                finite(&[s.loop_start, s.loop_length]) && s.loop_start >= 0.0 && s.loop_length > 0.0
            });
            if !valid {
                return DispatchResult::none();
            }
            with_container(project, *id, |c| c.set_loop_settings(*settings))
        }
        ContainerAction::SetInstrumentOverride(id, instrument) => {
            with_container(project, *id, |c| c.set_instrument_override(instrument.clone()))
        }
        ContainerAction::ResetOverride(id, field) => {
            if project.reset_override(*id, *field) {
                DispatchResult::applied(EntityRef::Container(*id))
            } else {
                DispatchResult::none()
            }
        }
        ContainerAction::Unlink(id) => {
            if project.unlink_container(*id) {
                DispatchResult::applied(EntityRef::Container(*id))
            } else {
                DispatchResult::none()
            }
        }
    }
}

fn with_container(project: &mut Project, id: ContainerId, edit: impl FnOnce(&mut Container)) -> DispatchResult {
    match project.find_container_mut(id) {
        Some(container) => {
            edit(container);
            DispatchResult::applied(EntityRef::Container(id))
        }
        None => DispatchResult::none(),
    }
}
