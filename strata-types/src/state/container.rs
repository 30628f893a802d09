//! Containers (clips) and the per-field clone override model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::automation::AutomationLane;
use super::effect::EffectChain;
use super::midi_sequence::MidiSequence;
use crate::{ContainerId, RecordingId, TrackId};

/// Container fields a clone may inherit from its parent.
///
/// Identity, timeline placement and the parent link are not listed: they are
/// always local to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContainerField {
    Name,
    /// Source recording reference and audio start offset
    AudioSource,
    MidiSequence,
    /// Fade-in and fade-out
    Fades,
    /// Effect chain, including its bypass flag
    Effects,
    Automation,
    EnterActions,
    ExitActions,
    LoopSettings,
    InstrumentOverride,
}

impl ContainerField {
    pub const ALL: [ContainerField; 10] = [
        ContainerField::Name,
        ContainerField::AudioSource,
        ContainerField::MidiSequence,
        ContainerField::Fades,
        ContainerField::Effects,
        ContainerField::Automation,
        ContainerField::EnterActions,
        ContainerField::ExitActions,
        ContainerField::LoopSettings,
        ContainerField::InstrumentOverride,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FadeCurve {
    #[default]
    Linear,
    Exponential,
    SCurve,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub duration_bars: f64,
    #[serde(default)]
    pub curve: FadeCurve,
}

/// Something fired when playback enters or leaves a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriggerAction {
    ProgramChange { channel: u8, program: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    Note { channel: u8, pitch: u8, velocity: u8 },
    SetTrackMute { track_id: TrackId, muted: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Loop start relative to the container start, in bars
    pub loop_start: f64,
    pub loop_length: f64,
    /// `None` loops until the container ends
    #[serde(default)]
    pub repeat_count: Option<u32>,
}

/// Instrument used for this container instead of the track's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentOverride {
    pub instrument_name: String,
    #[serde(default)]
    pub preset: Option<String>,
}

/// A time-bounded clip on a track.
///
/// Overridable fields are public for reading. Mutate them through the setters
/// so that a clone records which fields no longer follow its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    pub start_bar: f64,
    pub length_bars: f64,
    #[serde(default)]
    pub source_recording_id: Option<RecordingId>,
    #[serde(default)]
    pub audio_start_offset: f64,
    #[serde(default)]
    pub midi_sequence: Option<MidiSequence>,
    #[serde(default)]
    pub fade_in: Option<Fade>,
    #[serde(default)]
    pub fade_out: Option<Fade>,
    #[serde(default)]
    pub effects: EffectChain,
    #[serde(default)]
    pub automation_lanes: Vec<AutomationLane>,
    #[serde(default)]
    pub enter_actions: Vec<TriggerAction>,
    #[serde(default)]
    pub exit_actions: Vec<TriggerAction>,
    #[serde(default)]
    pub loop_settings: Option<LoopSettings>,
    #[serde(default)]
    pub instrument_override: Option<InstrumentOverride>,
    /// Container this one was cloned from. A lookup key, not ownership.
    #[serde(default)]
    pub parent_container_id: Option<ContainerId>,
    /// Fields that keep the local value instead of the parent's.
    #[serde(default)]
    pub overridden_fields: BTreeSet<ContainerField>,
}

impl Container {
    pub fn new(id: ContainerId, name: impl Into<String>, start_bar: f64, length_bars: f64) -> Self {
        Self {
            id,
            name: name.into(),
            start_bar,
            length_bars,
            source_recording_id: None,
            audio_start_offset: 0.0,
            midi_sequence: None,
            fade_in: None,
            fade_out: None,
            effects: EffectChain::new(),
            automation_lanes: Vec::new(),
            enter_actions: Vec::new(),
            exit_actions: Vec::new(),
            loop_settings: None,
            instrument_override: None,
            parent_container_id: None,
            overridden_fields: BTreeSet::new(),
        }
    }

    pub fn is_clone(&self) -> bool {
        self.parent_container_id.is_some()
    }

    pub fn end_bar(&self) -> f64 {
        self.start_bar + self.length_bars
    }

    /// Record a local edit of `field`. Only clones track overrides.
    pub fn mark_overridden(&mut self, field: ContainerField) {
        if self.is_clone() {
            self.overridden_fields.insert(field);
        }
    }

    /// Whether `field` uses the local value. Always true for non-clones.
    pub fn is_overridden(&self, field: ContainerField) -> bool {
        !self.is_clone() || self.overridden_fields.contains(&field)
    }

    /// Copy one field's value from `source`, leaving everything else untouched.
    pub fn copy_field_from(&mut self, source: &Container, field: ContainerField) {
        match field {
            ContainerField::Name => self.name = source.name.clone(),
            ContainerField::AudioSource => {
                self.source_recording_id = source.source_recording_id;
                self.audio_start_offset = source.audio_start_offset;
            }
            ContainerField::MidiSequence => self.midi_sequence = source.midi_sequence.clone(),
            ContainerField::Fades => {
                self.fade_in = source.fade_in;
                self.fade_out = source.fade_out;
            }
            ContainerField::Effects => self.effects = source.effects.clone(),
            ContainerField::Automation => {
                self.automation_lanes = source.automation_lanes.clone()
            }
            ContainerField::EnterActions => self.enter_actions = source.enter_actions.clone(),
            ContainerField::ExitActions => self.exit_actions = source.exit_actions.clone(),
            ContainerField::LoopSettings => self.loop_settings = source.loop_settings,
            ContainerField::InstrumentOverride => {
                self.instrument_override = source.instrument_override.clone()
            }
        }
    }

    // Placement is never inherited, so these don't touch overrides.

    pub fn move_to(&mut self, start_bar: f64) {
        self.start_bar = start_bar.max(0.0);
    }

    pub fn resize(&mut self, length_bars: f64) {
        self.length_bars = length_bars;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.mark_overridden(ContainerField::Name);
    }

    pub fn set_audio_source(&mut self, recording: Option<RecordingId>, start_offset: f64) {
        self.source_recording_id = recording;
        self.audio_start_offset = start_offset.max(0.0);
        self.mark_overridden(ContainerField::AudioSource);
    }

    pub fn set_midi_sequence(&mut self, sequence: Option<MidiSequence>) {
        self.midi_sequence = sequence;
        self.mark_overridden(ContainerField::MidiSequence);
    }

    /// Mutable access to the note sequence, creating an empty one if needed.
    pub fn edit_midi_sequence(&mut self) -> &mut MidiSequence {
        self.mark_overridden(ContainerField::MidiSequence);
        self.midi_sequence.get_or_insert_with(MidiSequence::new)
    }

    pub fn set_fade_in(&mut self, fade: Option<Fade>) {
        self.fade_in = fade;
        self.mark_overridden(ContainerField::Fades);
    }

    pub fn set_fade_out(&mut self, fade: Option<Fade>) {
        self.fade_out = fade;
        self.mark_overridden(ContainerField::Fades);
    }

    pub fn edit_effects(&mut self) -> &mut EffectChain {
        self.mark_overridden(ContainerField::Effects);
        &mut self.effects
    }

    pub fn edit_automation(&mut self) -> &mut Vec<AutomationLane> {
        self.mark_overridden(ContainerField::Automation);
        &mut self.automation_lanes
    }

    pub fn set_enter_actions(&mut self, actions: Vec<TriggerAction>) {
        self.enter_actions = actions;
        self.mark_overridden(ContainerField::EnterActions);
    }

    pub fn set_exit_actions(&mut self, actions: Vec<TriggerAction>) {
        self.exit_actions = actions;
        self.mark_overridden(ContainerField::ExitActions);
    }

    pub fn set_loop_settings(&mut self, settings: Option<LoopSettings>) {
        self.loop_settings = settings;
        self.mark_overridden(ContainerField::LoopSettings);
    }

    pub fn set_instrument_override(&mut self, instrument: Option<InstrumentOverride>) {
        self.instrument_override = instrument;
        self.mark_overridden(ContainerField::InstrumentOverride);
    }

    /// Largest raw id used by anything nested in this container.
    pub fn max_nested_id(&self) -> u64 {
        let notes = self
            .midi_sequence
            .as_ref()
            .and_then(|s| s.max_id())
            .unwrap_or(0);
        let effects = self.effects.max_id().unwrap_or(0);
        let lanes = self
            .automation_lanes
            .iter()
            .map(|l| l.id.get())
            .max()
            .unwrap_or(0);
        self.id.get().max(notes).max(effects).max(lanes)
    }
}
