use crate::{DispatchResult, EntityRef, Project, SongAction};

use super::ReduceContext;

pub(super) fn reduce(action: &SongAction, project: &mut Project, ctx: &ReduceContext) -> DispatchResult {
    match action {
        SongAction::Add { name } => {
            let id = project.add_song(name.clone(), ctx.default_tempo, ctx.default_time_signature);
            DispatchResult::applied(EntityRef::Song(id))
        }
        SongAction::Remove(id) => match project.remove_song(*id) {
            Some(_) => DispatchResult::applied(EntityRef::Song(*id)),
            None => DispatchResult::none(),
        },
        SongAction::Rename(id, name) => match project.song_mut(*id) {
            Some(song) => {
                song.name = name.clone();
                DispatchResult::applied(EntityRef::Song(*id))
            }
            None => DispatchResult::none(),
        },
        SongAction::SetTempo(id, bpm) => {
            if !bpm.is_finite() {
                return DispatchResult::none();
            }
            match project.song_mut(*id) {
                Some(song) => {
                    song.set_tempo(*bpm);
                    DispatchResult::applied(EntityRef::Song(*id))
                }
                None => DispatchResult::none(),
            }
        }
        SongAction::SetTimeSignature(id, signature) => {
            if !signature.is_valid() {
                return DispatchResult::none();
            }
            match project.song_mut(*id) {
                Some(song) => {
                    song.time_signature = *signature;
                    DispatchResult::applied(EntityRef::Song(*id))
                }
                None => DispatchResult::none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SongId, TimeSignature, MAX_TEMPO};

    #[test]
    fn add_uses_context_defaults() {
        let mut project = Project::new();
        let ctx = ReduceContext {
            default_tempo: 96.0,
            ..ReduceContext::default()
        };
        let result = reduce(&SongAction::Add { name: "Intro".into() }, &mut project, &ctx);
        let Some(EntityRef::Song(id)) = result.affected else {
            panic!("expected a song id");
        };
        assert_eq!(project.song(id).unwrap().tempo, 96.0);
    }

    #[test]
    fn invalid_input_is_a_noop() {
        let mut project = Project::new();
        let ctx = ReduceContext::default();
        reduce(&SongAction::Add { name: "A".into() }, &mut project, &ctx);
        let id = project.songs[0].id;
        let before = project.clone();

        let bad_meter = TimeSignature {
            beats_per_bar: 4,
            beat_unit: 5,
        };
        assert!(reduce(&SongAction::SetTimeSignature(id, bad_meter), &mut project, &ctx).is_noop());
        assert!(reduce(&SongAction::SetTempo(id, f64::NAN), &mut project, &ctx).is_noop());
        assert!(reduce(&SongAction::Rename(SongId::from_raw(99), "x".into()), &mut project, &ctx).is_noop());
        assert_eq!(project, before);

        reduce(&SongAction::SetTempo(id, 5000.0), &mut project, &ctx);
        assert_eq!(project.song(id).unwrap().tempo, MAX_TEMPO);
    }
}
