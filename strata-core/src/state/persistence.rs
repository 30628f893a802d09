//! JSON boundary for whole projects.
//!
//! Documents are wrapped in a versioned envelope. Reading raises the id
//! allocator above every id in the document and rebuilds derived indices.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use strata_types::{clone_cycles, Project};

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("project format version {found} is newer than supported ({supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("malformed project document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ProjectFileRef<'a> {
    format_version: u32,
    project: &'a Project,
}

#[derive(Deserialize)]
struct ProjectFile {
    #[serde(default = "first_version")]
    format_version: u32,
    project: Project,
}

#[derive(Deserialize)]
struct Header {
    #[serde(default = "first_version")]
    format_version: u32,
}

fn first_version() -> u32 {
    1
}

/// Serialize a project into its versioned JSON document.
pub fn to_json(project: &Project) -> Result<String, PersistError> {
    let file = ProjectFileRef {
        format_version: FORMAT_VERSION,
        project,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Parse a versioned JSON document. Absent optional fields decode as unset.
pub fn from_json(json: &str) -> Result<Project, PersistError> {
    let header: Header = serde_json::from_str(json)?;
    if header.format_version > FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: header.format_version,
            supported: FORMAT_VERSION,
        });
    }

    let file: ProjectFile = serde_json::from_str(json)?;
    let mut project = file.project;
    project.finalize_after_load();

    for id in clone_cycles(&project) {
        log::warn!(target: "persistence", "{} is part of a clone cycle; resolving it with local values", id);
    }
    log::debug!(
        target: "persistence",
        "loaded project: {} songs, {} recordings, {} mappings",
        project.songs.len(),
        project.recordings.len(),
        project.midi_mappings.len()
    );
    Ok(project)
}
