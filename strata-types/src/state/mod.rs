pub mod automation;
pub mod container;
pub mod effect;
pub mod midi_mapping;
pub mod midi_sequence;
pub mod project;
pub mod recording;
pub mod song;
pub mod track;

pub use automation::*;
pub use container::*;
pub use effect::*;
pub use midi_mapping::*;
pub use midi_sequence::*;
pub use project::*;
pub use recording::*;
pub use song::*;
pub use track::*;
