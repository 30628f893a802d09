#![allow(dead_code)]
//! Shared builders for strata-core integration tests.

use strata_core::dispatch::dispatch_action;
use strata_core::state::AppState;
use strata_types::{
    Action, ContainerAction, ContainerId, DispatchResult, EffectAction, EffectHost, EffectId,
    EffectType, EntityRef, MappingId, SongAction, SongId, TrackAction, TrackId, TrackKind,
};

pub fn dispatch(state: &mut AppState, action: Action) -> DispatchResult {
    dispatch_action(&action, state)
}

pub fn add_song(state: &mut AppState, name: &str) -> SongId {
    match dispatch(state, Action::Song(SongAction::Add { name: name.into() })).affected {
        Some(EntityRef::Song(id)) => id,
        other => panic!("Expected song, got {:?}", other),
    }
}

pub fn add_track(state: &mut AppState, song_id: SongId, name: &str) -> TrackId {
    let action = Action::Track(TrackAction::Add {
        song_id,
        name: name.into(),
        kind: TrackKind::Midi,
    });
    match dispatch(state, action).affected {
        Some(EntityRef::Track(id)) => id,
        other => panic!("Expected track, got {:?}", other),
    }
}

pub fn add_container(state: &mut AppState, track_id: TrackId, name: &str, start_bar: f64) -> ContainerId {
    let action = Action::Container(ContainerAction::Add {
        track_id,
        name: name.into(),
        start_bar,
        length_bars: 4.0,
    });
    match dispatch(state, action).affected {
        Some(EntityRef::Container(id)) => id,
        other => panic!("Expected container, got {:?}", other),
    }
}

pub fn clone_container(state: &mut AppState, source: ContainerId) -> ContainerId {
    let action = Action::Container(ContainerAction::Clone {
        source,
        track_id: None,
        start_bar: None,
    });
    match dispatch(state, action).affected {
        Some(EntityRef::Container(id)) => id,
        other => panic!("Expected container, got {:?}", other),
    }
}

pub fn add_effect(state: &mut AppState, host: EffectHost, effect_type: EffectType) -> EffectId {
    let action = Action::Effect(EffectAction::Add {
        host,
        effect_type,
        index: None,
    });
    match dispatch(state, action).affected {
        Some(EntityRef::Effect(id)) => id,
        other => panic!("Expected effect, got {:?}", other),
    }
}

pub fn expect_mapping(result: DispatchResult) -> MappingId {
    match result.affected {
        Some(EntityRef::Mapping(id)) => id,
        other => panic!("Expected mapping, got {:?}", other),
    }
}

/// Fresh state with one song and one track, and an empty undo history.
pub fn state_with_track() -> (AppState, SongId, TrackId) {
    let mut state = AppState::new();
    let song = add_song(&mut state, "Song");
    let track = add_track(&mut state, song, "Keys");
    state.undo_history.clear();
    (state, song, track)
}
