use serde::{Deserialize, Serialize};

use crate::RecordingId;

/// Recorded or imported audio that containers can reference.
/// The audio itself is owned by the external file layer; this is metadata only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecording {
    pub id: RecordingId,
    pub name: String,
    /// Location understood by the external codec (usually a relative path)
    pub location: String,
    pub sample_rate: u32,
    pub channel_count: u16,
    pub duration_seconds: f64,
}

impl SourceRecording {
    pub fn new(id: RecordingId, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            sample_rate: 48_000,
            channel_count: 2,
            duration_seconds: 0.0,
        }
    }
}
