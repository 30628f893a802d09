//! Insert effect chains shared by tracks and containers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::EffectId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectType {
    Eq,
    Compressor,
    Reverb,
    Delay,
    Distortion,
    Filter,
    Chorus,
    /// Third-party plugin, identified by its host-side name
    Plugin { name: String },
}

impl EffectType {
    pub fn name(&self) -> &str {
        match self {
            EffectType::Eq => "EQ",
            EffectType::Compressor => "Compressor",
            EffectType::Reverb => "Reverb",
            EffectType::Delay => "Delay",
            EffectType::Distortion => "Distortion",
            EffectType::Filter => "Filter",
            EffectType::Chorus => "Chorus",
            EffectType::Plugin { name } => name,
        }
    }

    /// Default normalized parameter values keyed by parameter address.
    pub fn default_params(&self) -> BTreeMap<u64, f32> {
        let defaults: &[(u64, f32)] = match self {
            EffectType::Eq => &[(0, 0.5), (1, 0.5), (2, 0.5)],
            EffectType::Compressor => &[(0, 0.6), (1, 0.25), (2, 0.1), (3, 0.3)],
            EffectType::Reverb => &[(0, 0.5), (1, 0.5), (2, 0.3)],
            EffectType::Delay => &[(0, 0.25), (1, 0.4), (2, 0.3)],
            EffectType::Distortion => &[(0, 0.3), (1, 0.5)],
            EffectType::Filter => &[(0, 1.0), (1, 0.0)],
            EffectType::Chorus => &[(0, 0.2), (1, 0.5), (2, 0.5)],
            EffectType::Plugin { .. } => &[],
        };
        defaults.iter().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    pub id: EffectId,
    pub effect_type: EffectType,
    /// Position in the chain; always equal to the slot's index.
    pub order_index: usize,
    #[serde(default)]
    pub bypassed: bool,
    /// Normalized parameter values keyed by parameter address
    #[serde(default)]
    pub params: BTreeMap<u64, f32>,
}

impl EffectSlot {
    pub fn new(id: EffectId, effect_type: EffectType) -> Self {
        Self {
            id,
            params: effect_type.default_params(),
            effect_type,
            order_index: 0,
            bypassed: false,
        }
    }
}

/// Ordered list of insert effects plus the chain-wide bypass flag.
///
/// Every mutator re-derives `order_index` from position, so the indices are
/// always the contiguous sequence `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectChain {
    #[serde(default)]
    slots: Vec<EffectSlot>,
    #[serde(default)]
    pub bypassed: bool,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[EffectSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EffectSlot> {
        self.slots.get(index)
    }

    pub fn effect(&self, id: EffectId) -> Option<&EffectSlot> {
        self.slots.iter().find(|e| e.id == id)
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut EffectSlot> {
        self.slots.iter_mut().find(|e| e.id == id)
    }

    pub fn position(&self, id: EffectId) -> Option<usize> {
        self.slots.iter().position(|e| e.id == id)
    }

    /// Append a slot at the end of the chain.
    pub fn push(&mut self, slot: EffectSlot) {
        self.slots.push(slot);
        self.reindex();
    }

    /// Insert at `index` (clamped to the chain length).
    pub fn insert(&mut self, index: usize, slot: EffectSlot) {
        let index = index.min(self.slots.len());
        self.slots.insert(index, slot);
        self.reindex();
    }

    pub fn remove(&mut self, id: EffectId) -> Option<EffectSlot> {
        let pos = self.position(id)?;
        let removed = self.slots.remove(pos);
        self.reindex();
        Some(removed)
    }

    /// Move the slot at `from` so it ends up at `to`. Returns false when
    /// either index is out of range or the move would change nothing.
    pub fn move_slot(&mut self, from: usize, to: usize) -> bool {
        if from >= self.slots.len() || to >= self.slots.len() || from == to {
            return false;
        }
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
        self.reindex();
        true
    }

    /// Restore the order-index invariant after deserialization or a bulk edit.
    pub fn reindex(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.order_index = i;
        }
    }

    pub fn max_id(&self) -> Option<u64> {
        self.slots.iter().map(|e| e.id.get()).max()
    }
}
