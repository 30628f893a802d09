//! # strata-types
//!
//! Shared type definitions for the strata document engine.
//! This crate holds the entity model, typed identifiers, action enums and the
//! pure pieces of the engine: clone/override resolution, MIDI mapping math,
//! the automation shape generator and the reducers that apply actions.
//!
//! Nothing in here owns undo history or talks to the outside world; that lives
//! in `strata-core`.

pub mod action;
pub mod reduce;
pub mod resolve;
pub mod shapes;
pub mod state;

pub use action::*;
pub use resolve::{clone_cycles, resolve};
pub use reduce::{reduce_action, ReduceContext};
pub use shapes::{generate, ShapeRequest, ShapeTool};

// Re-export all state types at crate root for convenience
pub use state::*;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Entity kinds an [`Id`] can be scoped to.
pub trait IdKind {
    /// Short prefix used by `Display`, e.g. `track#4`.
    const PREFIX: &'static str;
}

/// Type-level tags for [`Id`]. Uninhabited; they only exist to keep ids apart.
pub mod kind {
    use super::IdKind;

    macro_rules! id_kinds {
        ($($(#[$meta:meta])* $kind:ident => $prefix:literal;)*) => {
            $(
                $(#[$meta])*
                #[derive(Debug)]
                pub enum $kind {}

                impl IdKind for $kind {
                    const PREFIX: &'static str = $prefix;
                }
            )*
        };
    }

    id_kinds! {
        Song => "song";
        Track => "track";
        Container => "container";
        Recording => "recording";
        Mapping => "mapping";
        /// Insert effects, on tracks and on containers.
        Effect => "effect";
        Note => "note";
        /// Automation lanes inside a container.
        Lane => "lane";
    }
}

pub type SongId = Id<kind::Song>;
pub type TrackId = Id<kind::Track>;
pub type ContainerId = Id<kind::Container>;
pub type RecordingId = Id<kind::Recording>;
pub type MappingId = Id<kind::Mapping>;
pub type EffectId = Id<kind::Effect>;
pub type NoteId = Id<kind::Note>;
pub type LaneId = Id<kind::Lane>;

/// Unique identifier scoped to one entity kind.
///
/// The kind only exists at the type level, so a `TrackId` can never be passed
/// where a `ContainerId` is expected. Comparison and hashing use the raw value.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<K: IdKind> {
    raw: u64,
    #[serde(skip)]
    kind: PhantomData<fn() -> K>,
}

impl<K: IdKind> Id<K> {
    pub fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            kind: PhantomData,
        }
    }

    pub fn get(self) -> u64 {
        self.raw
    }
}

impl<K: IdKind> Clone for Id<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: IdKind> Copy for Id<K> {}

impl<K: IdKind> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: IdKind> Eq for Id<K> {}

impl<K: IdKind> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: IdKind> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K: IdKind> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", K::PREFIX, self.raw)
    }
}

impl<K: IdKind> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", K::PREFIX, self.raw)
    }
}

/// Project-wide identifier source. One counter serves every kind, so raw
/// values are unique across kinds too. The counter only moves forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<K: IdKind>(&mut self) -> Id<K> {
        self.next += 1;
        Id::from_raw(self.next)
    }

    /// Next raw value that would be handed out.
    pub fn peek(&self) -> u64 {
        self.next + 1
    }

    /// Never hand out `raw` or anything below it again.
    pub fn reserve_through(&mut self, raw: u64) {
        self.next = self.next.max(raw);
    }
}

/// Identifier of any entity, used to report what a mutation created or touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Song(SongId),
    Track(TrackId),
    Container(ContainerId),
    Recording(RecordingId),
    Mapping(MappingId),
    Effect(EffectId),
    Note(NoteId),
    Lane(LaneId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn allocator_never_repeats() {
        let mut ids = IdAllocator::new();
        let a: TrackId = ids.next();
        let b: ContainerId = ids.next();
        let c: TrackId = ids.next();
        assert_ne!(a.get(), b.get());
        assert_ne!(a, c);
        assert!(c.get() > a.get());
    }

    #[test]
    fn reserve_through_skips_existing_values() {
        let mut ids = IdAllocator::new();
        ids.reserve_through(41);
        let next: SongId = ids.next();
        assert_eq!(next.get(), 42);

        // Reserving a lower value never moves the counter back
        ids.reserve_through(3);
        let after: SongId = ids.next();
        assert_eq!(after.get(), 43);
    }

    #[test]
    fn equality_and_hash_use_raw_value() {
        let a = TrackId::from_raw(7);
        let b = TrackId::from_raw(7);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert_eq!(a.to_string(), "track#7");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let id = ContainerId::from_raw(12);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "12");
        let back: ContainerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
