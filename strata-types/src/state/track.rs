//! Tracks: mixer flags, insert effects, expression pedal and containers.

use serde::{Deserialize, Serialize};

use super::container::Container;
use super::effect::EffectChain;
use super::midi_mapping::PedalTarget;
use crate::{ContainerId, TrackId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackKind {
    #[default]
    Audio,
    Midi,
    Master,
}

/// Upper bound for track gain (+6 dB of headroom).
pub const MAX_TRACK_VOLUME: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub soloed: bool,
    /// Linear gain, 0.0..=2.0
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// -1.0 (left) ..= 1.0 (right)
    #[serde(default)]
    pub pan: f32,
    #[serde(default)]
    pub insert_effects: EffectChain,
    /// Controller number of the assigned expression pedal
    #[serde(default)]
    pub expression_pedal_cc: Option<u8>,
    #[serde(default)]
    pub expression_pedal_target: Option<PedalTarget>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

fn default_volume() -> f32 {
    1.0
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            muted: false,
            soloed: false,
            volume: default_volume(),
            pan: 0.0,
            insert_effects: EffectChain::new(),
            expression_pedal_cc: None,
            expression_pedal_target: None,
            containers: Vec::new(),
        }
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    /// Insert keeping containers ordered by start position.
    pub fn insert_container(&mut self, container: Container) {
        let pos = self
            .containers
            .iter()
            .position(|c| c.start_bar > container.start_bar)
            .unwrap_or(self.containers.len());
        self.containers.insert(pos, container);
    }

    pub fn remove_container(&mut self, id: ContainerId) -> Option<Container> {
        let pos = self.containers.iter().position(|c| c.id == id)?;
        Some(self.containers.remove(pos))
    }

    /// Re-sort after a container was moved.
    pub fn sort_containers(&mut self) {
        self.containers
            .sort_by(|a, b| a.start_bar.total_cmp(&b.start_bar));
    }

    pub fn has_expression_pedal(&self) -> bool {
        self.expression_pedal_cc.is_some()
    }

    pub fn clear_expression_pedal(&mut self) {
        self.expression_pedal_cc = None;
        self.expression_pedal_target = None;
    }

    pub fn max_nested_id(&self) -> u64 {
        let containers = self
            .containers
            .iter()
            .map(Container::max_nested_id)
            .max()
            .unwrap_or(0);
        let effects = self.insert_effects.max_id().unwrap_or(0);
        self.id.get().max(containers).max(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_are_kept_in_start_order() {
        let mut track = Track::new(TrackId::from_raw(1), "Drums", TrackKind::Audio);
        track.insert_container(Container::new(ContainerId::from_raw(2), "b", 4.0, 1.0));
        track.insert_container(Container::new(ContainerId::from_raw(3), "a", 0.0, 1.0));
        let names: Vec<&str> = track.containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        track.container_mut(ContainerId::from_raw(3)).unwrap().move_to(8.0);
        track.sort_containers();
        assert_eq!(track.containers[0].id, ContainerId::from_raw(2));
    }

    #[test]
    fn missing_pedal_fields_decode_as_unset() {
        let json = r#"{"id":1,"name":"Bass","kind":"Midi"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.expression_pedal_cc, None);
        assert_eq!(track.expression_pedal_target, None);
        assert_eq!(track.volume, 1.0);
        assert!(track.insert_effects.is_empty());
    }
}
