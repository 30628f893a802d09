//! MIDI controller → project parameter mappings.

use serde::{Deserialize, Serialize};

use crate::{MappingId, TrackId};

/// Highest 7-bit controller value.
pub const CC_MAX: u8 = 127;

/// Structural address of one parameter of one insert effect on one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectPath {
    pub track_id: TrackId,
    pub effect_index: usize,
    pub parameter_address: u64,
}

impl EffectPath {
    pub fn new(track_id: TrackId, effect_index: usize, parameter_address: u64) -> Self {
        Self {
            track_id,
            effect_index,
            parameter_address,
        }
    }
}

/// Inbound event shape that drives a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MidiTrigger {
    /// Control change; `channel: None` listens on every channel
    ControlChange { channel: Option<u8>, controller: u8 },
    /// Channel aftertouch
    ChannelPressure { channel: Option<u8> },
}

impl MidiTrigger {
    pub fn control_change(controller: u8) -> Self {
        MidiTrigger::ControlChange {
            channel: None,
            controller,
        }
    }

    /// Whether a controller event (channel, controller number) fires this trigger.
    /// Pass `controller: None` for channel pressure.
    pub fn matches(&self, event_channel: u8, event_controller: Option<u8>) -> bool {
        match (*self, event_controller) {
            (MidiTrigger::ControlChange { channel, controller }, Some(cc)) => {
                controller == cc && channel.map_or(true, |c| c == event_channel)
            }
            (MidiTrigger::ChannelPressure { channel }, None) => {
                channel.map_or(true, |c| c == event_channel)
            }
            _ => false,
        }
    }

    /// Two triggers overlap when some event would fire both.
    pub fn overlaps(&self, other: &MidiTrigger) -> bool {
        fn channels_overlap(a: Option<u8>, b: Option<u8>) -> bool {
            match (a, b) {
                (Some(x), Some(y)) => x == y,
                _ => true,
            }
        }
        match (*self, *other) {
            (
                MidiTrigger::ControlChange { channel: a, controller: x },
                MidiTrigger::ControlChange { channel: b, controller: y },
            ) => x == y && channels_overlap(a, b),
            (
                MidiTrigger::ChannelPressure { channel: a },
                MidiTrigger::ChannelPressure { channel: b },
            ) => channels_overlap(a, b),
            _ => false,
        }
    }
}

/// Project parameter a mapping writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingTarget {
    TrackVolume(TrackId),
    Effect(EffectPath),
}

impl MappingTarget {
    /// Track the target lives on.
    pub fn track_id(&self) -> TrackId {
        match self {
            MappingTarget::TrackVolume(id) => *id,
            MappingTarget::Effect(path) => path.track_id,
        }
    }
}

/// Expression-pedal destination stored on a track next to its pedal CC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedalTarget {
    TrackVolume,
    Effect(EffectPath),
}

impl PedalTarget {
    pub fn from_effect(target: Option<EffectPath>) -> Self {
        match target {
            Some(path) => PedalTarget::Effect(path),
            None => PedalTarget::TrackVolume,
        }
    }

    pub fn mapping_target(&self, track_id: TrackId) -> MappingTarget {
        match self {
            PedalTarget::TrackVolume => MappingTarget::TrackVolume(track_id),
            PedalTarget::Effect(path) => MappingTarget::Effect(*path),
        }
    }
}

/// Output ranges used when a mapping is created without explicit bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappingRanges {
    /// Gain multiplier range; headroom above unity
    pub volume: (f32, f32),
    /// Effect parameters are pre-normalized
    pub effect: (f32, f32),
}

impl Default for MappingRanges {
    fn default() -> Self {
        Self {
            volume: (0.0, 2.0),
            effect: (0.0, 1.0),
        }
    }
}

impl MappingRanges {
    pub fn for_target(&self, target: &MappingTarget) -> (f32, f32) {
        match target {
            MappingTarget::TrackVolume(_) => self.volume,
            MappingTarget::Effect(_) => self.effect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiParameterMapping {
    pub id: MappingId,
    pub trigger: MidiTrigger,
    pub target: MappingTarget,
    pub min_value: f32,
    pub max_value: f32,
}

impl MidiParameterMapping {
    pub fn new(
        id: MappingId,
        trigger: MidiTrigger,
        target: MappingTarget,
        (min_value, max_value): (f32, f32),
    ) -> Self {
        Self {
            id,
            trigger,
            target,
            min_value,
            max_value,
        }
    }

    /// Linear scale of a 7-bit controller value into `[min_value, max_value]`.
    pub fn scaled_value(&self, cc_value: u8) -> f32 {
        let t = f32::from(cc_value.min(CC_MAX)) / f32::from(CC_MAX);
        self.min_value + (self.max_value - self.min_value) * t
    }
}
