//! MIDI note content of a container.

use serde::{Deserialize, Serialize};

use crate::NoteId;

/// Note fields supplied by callers; the id is assigned on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub pitch: u8,
    pub velocity: u8,
    /// Start in beats, relative to the container start
    pub start_beat: f64,
    pub duration_beats: f64,
}

impl NoteSpec {
    /// Pitch and velocity within 0..=127, non-negative start, positive duration.
    pub fn is_valid(&self) -> bool {
        self.pitch <= 127
            && self.velocity <= 127
            && self.start_beat.is_finite()
            && self.start_beat >= 0.0
            && self.duration_beats.is_finite()
            && self.duration_beats > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    pub id: NoteId,
    pub pitch: u8,
    pub velocity: u8,
    pub start_beat: f64,
    pub duration_beats: f64,
}

impl MidiNote {
    pub fn new(id: NoteId, spec: NoteSpec) -> Self {
        Self {
            id,
            pitch: spec.pitch,
            velocity: spec.velocity,
            start_beat: spec.start_beat,
            duration_beats: spec.duration_beats,
        }
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration_beats
    }
}

/// Notes sorted by start position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MidiSequence {
    pub notes: Vec<MidiNote>,
}

impl MidiSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&self, id: NoteId) -> Option<&MidiNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn add_note(&mut self, note: MidiNote) {
        let pos = self
            .notes
            .iter()
            .position(|n| n.start_beat > note.start_beat)
            .unwrap_or(self.notes.len());
        self.notes.insert(pos, note);
    }

    pub fn remove_note(&mut self, id: NoteId) -> Option<MidiNote> {
        let pos = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(pos))
    }

    /// Replace a note's fields, keeping its id. Re-sorts when the start moved.
    pub fn update_note(&mut self, id: NoteId, spec: NoteSpec) -> bool {
        match self.remove_note(id) {
            Some(_) => {
                self.add_note(MidiNote::new(id, spec));
                true
            }
            None => false,
        }
    }

    pub fn max_id(&self) -> Option<u64> {
        self.notes.iter().map(|n| n.id.get()).max()
    }
}
