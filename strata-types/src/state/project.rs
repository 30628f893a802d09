//! Project aggregate: songs, source recordings and MIDI parameter mappings.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::container::{Container, ContainerField};
use super::midi_mapping::{
    EffectPath, MappingRanges, MappingTarget, MidiParameterMapping, MidiTrigger, PedalTarget,
    CC_MAX,
};
use super::recording::SourceRecording;
use super::song::{Song, TimeSignature};
use super::track::{Track, TrackKind};
use crate::{ContainerId, IdAllocator, MappingId, RecordingId, SongId, TrackId};

/// Where a container lives inside the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLocation {
    pub song_id: SongId,
    pub track_id: TrackId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub recordings: BTreeMap<RecordingId, SourceRecording>,
    /// Unordered; at most one mapping per trigger.
    #[serde(default)]
    pub midi_mappings: Vec<MidiParameterMapping>,
    #[serde(default)]
    pub ids: IdAllocator,
    /// Container → owning song/track. Derived; rebuilt after structural changes.
    #[serde(skip)]
    container_index: HashMap<ContainerId, ContainerLocation>,
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.songs == other.songs
            && self.recordings == other.recordings
            && self.midi_mappings == other.midi_mappings
    }
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the container lookup table from the song/track tree.
    pub fn rebuild_index(&mut self) {
        self.container_index.clear();
        for song in &self.songs {
            for track in &song.tracks {
                for container in &track.containers {
                    self.container_index.insert(
                        container.id,
                        ContainerLocation {
                            song_id: song.id,
                            track_id: track.id,
                        },
                    );
                }
            }
        }
    }

    /// Restore derived state after the project was decoded: effect order
    /// indices, the container index and the id allocator floor.
    pub fn finalize_after_load(&mut self) {
        for song in &mut self.songs {
            for track in &mut song.tracks {
                track.insert_effects.reindex();
                for container in &mut track.containers {
                    container.effects.reindex();
                }
            }
        }
        let max_id = self
            .songs
            .iter()
            .map(Song::max_nested_id)
            .chain(self.recordings.keys().map(|id| id.get()))
            .chain(self.midi_mappings.iter().map(|m| m.id.get()))
            .max()
            .unwrap_or(0);
        self.ids.reserve_through(max_id);
        self.rebuild_index();
    }

    // --- Songs ---

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == id)
    }

    pub fn song_mut(&mut self, id: SongId) -> Option<&mut Song> {
        self.songs.iter_mut().find(|s| s.id == id)
    }

    pub fn add_song(&mut self, name: impl Into<String>, tempo: f64, time_signature: TimeSignature) -> SongId {
        let id = self.ids.next();
        self.songs.push(Song::new(id, name, tempo, time_signature));
        id
    }

    pub fn remove_song(&mut self, id: SongId) -> Option<Song> {
        let pos = self.songs.iter().position(|s| s.id == id)?;
        let song = self.songs.remove(pos);
        for track in &song.tracks {
            self.midi_mappings.retain(|m| m.target.track_id() != track.id);
        }
        self.rebuild_index();
        Some(song)
    }

    // --- Tracks ---

    pub fn find_track(&self, id: TrackId) -> Option<&Track> {
        self.songs.iter().find_map(|s| s.track(id))
    }

    pub fn find_track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.songs.iter_mut().find_map(|s| s.track_mut(id))
    }

    /// Song that owns the track.
    pub fn song_of_track(&self, id: TrackId) -> Option<SongId> {
        self.songs
            .iter()
            .find(|s| s.track(id).is_some())
            .map(|s| s.id)
    }

    pub fn add_track(&mut self, song_id: SongId, name: impl Into<String>, kind: TrackKind) -> Option<TrackId> {
        self.song(song_id)?;
        let id = self.ids.next();
        let song = self.song_mut(song_id)?;
        song.tracks.push(Track::new(id, name, kind));
        Some(id)
    }

    /// Remove a track with its containers and every mapping that targets it.
    pub fn remove_track(&mut self, id: TrackId) -> Option<Track> {
        let song = self.songs.iter_mut().find(|s| s.track(id).is_some())?;
        let pos = song.tracks.iter().position(|t| t.id == id)?;
        let track = song.tracks.remove(pos);
        self.midi_mappings.retain(|m| m.target.track_id() != id);
        self.rebuild_index();
        Some(track)
    }

    // --- Containers ---

    pub fn container_location(&self, id: ContainerId) -> Option<ContainerLocation> {
        if let Some(loc) = self.container_index.get(&id) {
            let indexed = self
                .song(loc.song_id)
                .and_then(|s| s.track(loc.track_id))
                .and_then(|t| t.container(id));
            if indexed.is_some() {
                return Some(*loc);
            }
        }
        // Index miss or stale entry: fall back to a full scan
        self.songs.iter().find_map(|s| {
            s.tracks.iter().find_map(|t| {
                t.container(id).map(|_| ContainerLocation {
                    song_id: s.id,
                    track_id: t.id,
                })
            })
        })
    }

    pub fn find_container(&self, id: ContainerId) -> Option<&Container> {
        let loc = self.container_location(id)?;
        self.song(loc.song_id)?.track(loc.track_id)?.container(id)
    }

    pub fn find_container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        let loc = self.container_location(id)?;
        self.song_mut(loc.song_id)?
            .track_mut(loc.track_id)?
            .container_mut(id)
    }

    pub fn track_of_container(&self, id: ContainerId) -> Option<TrackId> {
        self.container_location(id).map(|loc| loc.track_id)
    }

    pub fn add_container(
        &mut self,
        track_id: TrackId,
        name: impl Into<String>,
        start_bar: f64,
        length_bars: f64,
    ) -> Option<ContainerId> {
        let song_id = self.song_of_track(track_id)?;
        let id = self.ids.next();
        let container = Container::new(id, name, start_bar.max(0.0), length_bars);
        self.find_track_mut(track_id)?.insert_container(container);
        self.container_index
            .insert(id, ContainerLocation { song_id, track_id });
        Some(id)
    }

    /// Remove a container. Its clones are left in place as orphans.
    pub fn remove_container(&mut self, id: ContainerId) -> Option<Container> {
        let loc = self.container_location(id)?;
        let removed = self
            .song_mut(loc.song_id)?
            .track_mut(loc.track_id)?
            .remove_container(id)?;
        self.container_index.remove(&id);
        Some(removed)
    }

    /// Move a container along the timeline and optionally onto another track.
    pub fn move_container(&mut self, id: ContainerId, start_bar: f64, to_track: Option<TrackId>) -> bool {
        let Some(loc) = self.container_location(id) else {
            return false;
        };
        let dest = to_track.unwrap_or(loc.track_id);
        let Some(dest_song) = self.song_of_track(dest) else {
            return false;
        };
        if dest == loc.track_id {
            if let Some(track) = self.find_track_mut(dest) {
                if let Some(c) = track.container_mut(id) {
                    c.move_to(start_bar);
                }
                track.sort_containers();
            }
            return true;
        }
        let Some(mut container) = self.remove_container(id) else {
            return false;
        };
        container.move_to(start_bar);
        if let Some(track) = self.find_track_mut(dest) {
            track.insert_container(container);
        }
        self.container_index.insert(
            id,
            ContainerLocation {
                song_id: dest_song,
                track_id: dest,
            },
        );
        true
    }

    /// Effective state of a container, following the clone chain.
    pub fn resolved_container(&self, id: ContainerId) -> Option<Container> {
        crate::resolve::resolve_in_project(self, id)
    }

    /// Create a linked copy of `source`. The clone gets a fresh id, points back
    /// at `source`, starts with no overrides and carries the source's current
    /// effective content as its local fallback.
    pub fn clone_container(
        &mut self,
        source: ContainerId,
        to_track: Option<TrackId>,
        start_bar: Option<f64>,
    ) -> Option<ContainerId> {
        let resolved = self.resolved_container(source)?;
        let track_id = match to_track {
            Some(t) => t,
            None => self.track_of_container(source)?,
        };
        let song_id = self.song_of_track(track_id)?;
        let id = self.ids.next();

        let mut clone = resolved;
        clone.id = id;
        clone.parent_container_id = Some(source);
        clone.overridden_fields.clear();
        let start = start_bar.unwrap_or(clone.end_bar());
        clone.move_to(start);

        self.find_track_mut(track_id)?.insert_container(clone);
        self.container_index
            .insert(id, ContainerLocation { song_id, track_id });
        Some(id)
    }

    /// Copy the inherited value of `field` into a clone so that an incremental
    /// edit starts from the effective content. No-op for originals, orphans and
    /// fields that are already overridden.
    pub fn materialize_field(&mut self, id: ContainerId, field: ContainerField) {
        let Some(container) = self.find_container(id) else {
            return;
        };
        if container.is_overridden(field) {
            return;
        }
        let Some(parent) = container
            .parent_container_id
            .and_then(|p| self.resolved_container(p))
        else {
            return;
        };
        if let Some(container) = self.find_container_mut(id) {
            container.copy_field_from(&parent, field);
        }
    }

    /// Make `field` follow the parent again. The parent's current value is
    /// copied into the local slot so an orphaned clone keeps it.
    pub fn reset_override(&mut self, id: ContainerId, field: ContainerField) -> bool {
        let Some(container) = self.find_container(id) else {
            return false;
        };
        if !container.is_clone() || !container.overridden_fields.contains(&field) {
            return false;
        }
        let parent = container
            .parent_container_id
            .and_then(|p| self.resolved_container(p));
        let Some(container) = self.find_container_mut(id) else {
            return false;
        };
        container.overridden_fields.remove(&field);
        if let Some(parent) = parent {
            container.copy_field_from(&parent, field);
        }
        true
    }

    /// Turn a clone into an independent container holding its effective content.
    pub fn unlink_container(&mut self, id: ContainerId) -> bool {
        if !self.find_container(id).is_some_and(Container::is_clone) {
            return false;
        }
        let Some(mut resolved) = self.resolved_container(id) else {
            return false;
        };
        resolved.parent_container_id = None;
        resolved.overridden_fields.clear();
        match self.find_container_mut(id) {
            Some(container) => {
                *container = resolved;
                true
            }
            None => false,
        }
    }

    /// Containers whose parent link points at `id`.
    pub fn clones_of(&self, id: ContainerId) -> Vec<ContainerId> {
        self.songs
            .iter()
            .flat_map(|s| s.tracks.iter())
            .flat_map(|t| t.containers.iter())
            .filter(|c| c.parent_container_id == Some(id))
            .map(|c| c.id)
            .collect()
    }

    // --- Recordings ---

    pub fn add_recording(&mut self, mut recording: SourceRecording) -> RecordingId {
        let id = self.ids.next();
        recording.id = id;
        self.recordings.insert(id, recording);
        id
    }

    /// Remove recording metadata. Containers referencing it keep a dangling
    /// reference and resolve the recording as absent.
    pub fn remove_recording(&mut self, id: RecordingId) -> Option<SourceRecording> {
        self.recordings.remove(&id)
    }

    pub fn recording(&self, id: RecordingId) -> Option<&SourceRecording> {
        self.recordings.get(&id)
    }

    // --- MIDI parameter mappings ---

    pub fn mapping(&self, id: MappingId) -> Option<&MidiParameterMapping> {
        self.midi_mappings.iter().find(|m| m.id == id)
    }

    pub fn mapping_mut(&mut self, id: MappingId) -> Option<&mut MidiParameterMapping> {
        self.midi_mappings.iter_mut().find(|m| m.id == id)
    }

    pub fn mappings_for_track(&self, track_id: TrackId) -> Vec<&MidiParameterMapping> {
        self.midi_mappings
            .iter()
            .filter(|m| m.target.track_id() == track_id)
            .collect()
    }

    /// Mapping backing the track's expression pedal, if one is assigned.
    pub fn mapping_for_track(&self, track_id: TrackId) -> Option<&MidiParameterMapping> {
        let track = self.find_track(track_id)?;
        self.midi_mappings
            .iter()
            .find(|m| is_pedal_mapping(track, m))
    }

    /// Add a mapping, superseding any mapping with an overlapping trigger.
    /// The target's track must exist.
    pub fn add_mapping(
        &mut self,
        trigger: MidiTrigger,
        target: MappingTarget,
        range: (f32, f32),
    ) -> Option<MappingId> {
        if !self.target_exists(&target) {
            return None;
        }
        self.supersede_trigger(&trigger);
        let id = self.ids.next();
        self.midi_mappings
            .push(MidiParameterMapping::new(id, trigger, target, range));
        Some(id)
    }

    /// Remove a mapping. If it backs a track's expression pedal, the pedal
    /// fields on that track are cleared too.
    pub fn remove_mapping(&mut self, id: MappingId) -> Option<MidiParameterMapping> {
        let pos = self.midi_mappings.iter().position(|m| m.id == id)?;
        let mapping = self.midi_mappings.remove(pos);
        self.clear_pedal_backed_by(&mapping);
        Some(mapping)
    }

    /// Assign an expression pedal on `controller` to the track's volume
    /// (`target: None`) or to one of its effect parameters.
    ///
    /// The track's previous pedal mapping is replaced, as are mappings aimed at
    /// the same kind of slot on this track (its volume, or any of its effect
    /// parameters) and any mapping listening on the same controller. Other
    /// mappings on the track are kept. Returns `None` without touching the
    /// project when the track, effect slot or controller number is invalid.
    pub fn assign_expression_pedal(
        &mut self,
        track_id: TrackId,
        controller: u8,
        target: Option<EffectPath>,
        ranges: &MappingRanges,
    ) -> Option<MappingId> {
        if controller > CC_MAX {
            return None;
        }
        let pedal = PedalTarget::from_effect(target);
        let mapping_target = pedal.mapping_target(track_id);
        if mapping_target.track_id() != track_id || !self.target_exists(&mapping_target) {
            return None;
        }

        let replaced: Vec<MappingId> = match self.find_track(track_id) {
            Some(track) => self
                .midi_mappings
                .iter()
                .filter(|m| is_pedal_mapping(track, m) || same_slot_kind(&m.target, &mapping_target))
                .map(|m| m.id)
                .collect(),
            None => return None,
        };
        self.midi_mappings.retain(|m| !replaced.contains(&m.id));
        let trigger = MidiTrigger::control_change(controller);
        self.supersede_trigger(&trigger);

        let track = self.find_track_mut(track_id)?;
        track.expression_pedal_cc = Some(controller);
        track.expression_pedal_target = Some(pedal);

        let id = self.ids.next();
        self.midi_mappings.push(MidiParameterMapping::new(
            id,
            trigger,
            mapping_target,
            ranges.for_target(&mapping_target),
        ));
        Some(id)
    }

    /// Clear the track's pedal fields and delete its mapping together.
    /// Returns false when no pedal was assigned.
    pub fn remove_expression_pedal(&mut self, track_id: TrackId) -> bool {
        let Some(track) = self.find_track(track_id) else {
            return false;
        };
        if !track.has_expression_pedal() {
            return false;
        }
        let backing: Vec<MappingId> = self
            .midi_mappings
            .iter()
            .filter(|m| is_pedal_mapping(track, m))
            .map(|m| m.id)
            .collect();
        self.midi_mappings.retain(|m| !backing.contains(&m.id));
        if let Some(track) = self.find_track_mut(track_id) {
            track.clear_expression_pedal();
        }
        true
    }

    /// Whether any mapping addresses an effect slot on this track by index.
    pub fn has_effect_mappings(&self, track_id: TrackId) -> bool {
        self.midi_mappings
            .iter()
            .any(|m| matches!(m.target, MappingTarget::Effect(path) if path.track_id == track_id))
    }

    /// Re-address effect mappings and the pedal target on `track_id` after its
    /// insert chain changed shape. `remap` takes an old slot index to its new
    /// one, or to `None` when the slot is gone; such mappings are dropped and a
    /// pedal pointing there is cleared with them.
    pub fn remap_effect_slots(&mut self, track_id: TrackId, remap: impl Fn(usize) -> Option<usize>) {
        let Some(track) = self.find_track_mut(track_id) else {
            return;
        };
        let pedal_slot = match track.expression_pedal_target {
            Some(PedalTarget::Effect(path)) => Some(path.effect_index),
            _ => None,
        };
        if let Some(old) = pedal_slot {
            match remap(old) {
                Some(new) => {
                    if let Some(PedalTarget::Effect(path)) = track.expression_pedal_target.as_mut() {
                        path.effect_index = new;
                    }
                }
                None => track.clear_expression_pedal(),
            }
        }

        self.midi_mappings.retain_mut(|m| match &mut m.target {
            MappingTarget::Effect(path) if path.track_id == track_id => match remap(path.effect_index) {
                Some(new) => {
                    path.effect_index = new;
                    true
                }
                None => false,
            },
            _ => true,
        });
    }

    fn target_exists(&self, target: &MappingTarget) -> bool {
        match target {
            MappingTarget::TrackVolume(track_id) => self.find_track(*track_id).is_some(),
            MappingTarget::Effect(path) => self
                .find_track(path.track_id)
                .is_some_and(|t| path.effect_index < t.insert_effects.len()),
        }
    }

    /// Drop every mapping whose trigger overlaps `trigger`, releasing any
    /// expression pedal those mappings backed.
    fn supersede_trigger(&mut self, trigger: &MidiTrigger) {
        let (superseded, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.midi_mappings)
            .into_iter()
            .partition(|m| m.trigger.overlaps(trigger));
        self.midi_mappings = kept;
        for mapping in &superseded {
            self.clear_pedal_backed_by(mapping);
        }
    }

    fn clear_pedal_backed_by(&mut self, mapping: &MidiParameterMapping) {
        let track_id = mapping.target.track_id();
        if let Some(track) = self.find_track_mut(track_id) {
            if is_pedal_mapping(track, mapping) {
                track.clear_expression_pedal();
            }
        }
    }
}

/// Whether two targets address the same kind of slot on the same track.
fn same_slot_kind(a: &MappingTarget, b: &MappingTarget) -> bool {
    match (a, b) {
        (MappingTarget::TrackVolume(x), MappingTarget::TrackVolume(y)) => x == y,
        (MappingTarget::Effect(p), MappingTarget::Effect(q)) => p.track_id == q.track_id,
        _ => false,
    }
}

/// Whether `mapping` is the live representation of the track's pedal fields.
fn is_pedal_mapping(track: &Track, mapping: &MidiParameterMapping) -> bool {
    match (track.expression_pedal_cc, track.expression_pedal_target) {
        (Some(cc), Some(pedal)) => {
            mapping.trigger == MidiTrigger::control_change(cc)
                && mapping.target == pedal.mapping_target(track.id)
        }
        _ => false,
    }
}
