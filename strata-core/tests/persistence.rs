mod common;

use strata_core::config::Config;
use strata_core::state::persistence::{from_json, to_json, PersistError};
use strata_core::state::AppState;
use strata_types::{
    Action, AutomationAction, AutomationTarget, ContainerAction, ContainerField, EffectHost,
    EffectType, EntityRef, Fade, FadeCurve, InstrumentOverride, LoopSettings, MappingAction,
    MidiAction, NoteSpec, RecordingAction, ShapeRequest, ShapeTool, TriggerAction,
};

fn apply(state: &mut AppState, action: Action) {
    let result = common::dispatch(state, action.clone());
    assert!(!result.is_noop(), "fixture action rejected: {:?}", action);
}

fn populated_state() -> AppState {
    let (mut state, _, track) = common::state_with_track();
    let parent = common::add_container(&mut state, track, "Verse", 0.0);
    let clone = common::clone_container(&mut state, parent);
    common::add_effect(&mut state, EffectHost::Track(track), EffectType::Delay);
    common::add_effect(&mut state, EffectHost::Container(clone), EffectType::Reverb);
    common::dispatch(
        &mut state,
        Action::Mapping(MappingAction::AssignExpressionPedal {
            track_id: track,
            controller: 11,
            target: None,
        }),
    );
    let lane = match common::dispatch(
        &mut state,
        Action::Automation(AutomationAction::AddLane {
            container_id: parent,
            target: AutomationTarget::Volume,
        }),
    )
    .affected
    {
        Some(strata_types::EntityRef::Lane(id)) => id,
        other => panic!("Expected lane, got {:?}", other),
    };
    common::dispatch(
        &mut state,
        Action::Automation(AutomationAction::ApplyShape {
            container_id: parent,
            lane_id: lane,
            request: ShapeRequest {
                tool: ShapeTool::Sine,
                start: 0.0,
                end: 2.0,
                start_value: 0.2,
                end_value: 0.8,
                grid: 0.25,
            },
        }),
    );

    let recording = match common::dispatch(
        &mut state,
        Action::Recording(RecordingAction::Add {
            name: "Take 3".into(),
            location: "audio/take3.wav".into(),
            sample_rate: 48_000,
            channel_count: 2,
            duration_seconds: 12.5,
        }),
    )
    .affected
    {
        Some(EntityRef::Recording(id)) => id,
        other => panic!("Expected recording, got {:?}", other),
    };
    apply(
        &mut state,
        Action::Container(ContainerAction::SetAudioSource {
            id: parent,
            recording: Some(recording),
            start_offset: 0.5,
        }),
    );
    apply(
        &mut state,
        Action::Midi(MidiAction::AddNote(
            parent,
            NoteSpec {
                pitch: 64,
                velocity: 90,
                start_beat: 1.5,
                duration_beats: 0.5,
            },
        )),
    );
    apply(
        &mut state,
        Action::Container(ContainerAction::SetFadeIn(
            parent,
            Some(Fade {
                duration_bars: 0.5,
                curve: FadeCurve::SCurve,
            }),
        )),
    );
    apply(
        &mut state,
        Action::Container(ContainerAction::SetFadeOut(
            clone,
            Some(Fade {
                duration_bars: 1.0,
                curve: FadeCurve::Exponential,
            }),
        )),
    );
    apply(
        &mut state,
        Action::Container(ContainerAction::SetLoop(
            clone,
            Some(LoopSettings {
                loop_start: 1.0,
                loop_length: 2.0,
                repeat_count: Some(3),
            }),
        )),
    );
    apply(
        &mut state,
        Action::Container(ContainerAction::SetEnterActions(
            parent,
            vec![
                TriggerAction::ProgramChange { channel: 0, program: 12 },
                TriggerAction::SetTrackMute { track_id: track, muted: false },
            ],
        )),
    );
    apply(
        &mut state,
        Action::Container(ContainerAction::SetExitActions(
            parent,
            vec![TriggerAction::ControlChange {
                channel: 0,
                controller: 64,
                value: 0,
            }],
        )),
    );
    apply(
        &mut state,
        Action::Container(ContainerAction::SetInstrumentOverride(
            clone,
            Some(InstrumentOverride {
                instrument_name: "Rhodes".into(),
                preset: Some("Warm".into()),
            }),
        )),
    );
    state
}

#[test]
fn test_round_trip_preserves_project() {
    let state = populated_state();
    let json = to_json(&state.project).unwrap();
    let loaded = from_json(&json).unwrap();
    assert_eq!(loaded, state.project);

    let containers = &loaded.songs[0].tracks[0].containers;
    let clone = containers.iter().find(|c| c.is_clone()).unwrap();
    assert!(clone.overridden_fields.contains(&ContainerField::LoopSettings));
    assert!(clone.overridden_fields.contains(&ContainerField::InstrumentOverride));
    assert_eq!(loaded.recordings.len(), 1);
}

#[test]
fn test_loaded_project_keeps_issuing_fresh_ids() {
    let state = populated_state();
    let json = to_json(&state.project).unwrap();
    let mut restored = AppState::from_project(from_json(&json).unwrap(), &Config::default());

    let track = restored.project.songs[0].tracks[0].id;
    let before: Vec<_> = restored.project.songs[0].tracks[0]
        .containers
        .iter()
        .map(|c| c.id)
        .collect();
    let added = common::add_container(&mut restored, track, "Outro", 32.0);
    assert!(!before.contains(&added));
    assert_eq!(restored.undo_history.undo_depth(), 1);
}

#[test]
fn test_loaded_clone_resolves_against_parent() {
    let state = populated_state();
    let json = to_json(&state.project).unwrap();
    let loaded = from_json(&json).unwrap();
    let clone = loaded.songs[0].tracks[0]
        .containers
        .iter()
        .find(|c| c.is_clone())
        .unwrap()
        .id;
    assert_eq!(
        loaded.resolved_container(clone),
        state.project.resolved_container(clone)
    );
}

#[test]
fn test_newer_format_version_is_rejected() {
    let json = r#"{ "format_version": 99, "project": {} }"#;
    match from_json(json) {
        Err(PersistError::UnsupportedVersion { found, supported }) => {
            assert_eq!(found, 99);
            assert_eq!(supported, 1);
        }
        other => panic!("Expected version error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_malformed_document_is_an_error() {
    assert!(matches!(from_json("{ not json"), Err(PersistError::Json(_))));
}

#[test]
fn test_rename_round_trips_through_undo_and_save() {
    let mut state = populated_state();
    let container = state.project.songs[0].tracks[0].containers[0].id;
    common::dispatch(
        &mut state,
        Action::Container(ContainerAction::Rename(container, "Renamed".into())),
    );
    common::dispatch(&mut state, Action::Undo);
    let loaded = from_json(&to_json(&state.project).unwrap()).unwrap();
    assert_eq!(loaded.find_container(container).unwrap().name, "Verse");
}
