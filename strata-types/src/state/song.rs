//! Songs: tempo, meter and an ordered list of tracks.

use serde::{Deserialize, Serialize};

use super::track::Track;
use crate::{SongId, TrackId};

pub const MIN_TEMPO: f64 = 20.0;
pub const MAX_TEMPO: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_bar: u8,
    pub beat_unit: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats_per_bar: 4,
            beat_unit: 4,
        }
    }
}

impl TimeSignature {
    /// Beat unit must be a power of two; neither part may be zero.
    pub fn is_valid(&self) -> bool {
        self.beats_per_bar > 0 && self.beat_unit > 0 && self.beat_unit.is_power_of_two()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    /// Beats per minute
    pub tempo: f64,
    #[serde(default)]
    pub time_signature: TimeSignature,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Song {
    pub fn new(id: SongId, name: impl Into<String>, tempo: f64, time_signature: TimeSignature) -> Self {
        Self {
            id,
            name: name.into(),
            tempo: tempo.clamp(MIN_TEMPO, MAX_TEMPO),
            time_signature,
            tracks: Vec::new(),
        }
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm.clamp(MIN_TEMPO, MAX_TEMPO);
    }

    /// Length of one bar in seconds at the current tempo.
    pub fn bar_seconds(&self) -> f64 {
        let quarter_beats_per_bar =
            f64::from(self.time_signature.beats_per_bar) * 4.0 / f64::from(self.time_signature.beat_unit);
        quarter_beats_per_bar * 60.0 / self.tempo
    }

    pub fn max_nested_id(&self) -> u64 {
        self.tracks
            .iter()
            .map(Track::max_nested_id)
            .max()
            .unwrap_or(0)
            .max(self.id.get())
    }
}
