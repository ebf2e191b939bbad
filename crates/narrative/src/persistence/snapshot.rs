//! Lossless project snapshots
//!
//! A snapshot is the serde representation of the whole [`Project`]: every
//! board, element and connection attribute, components, variables and the
//! starting element. Only the save path is left out.

use std::path::Path;

use tracing::info;

use super::ntp::write_atomic;
use crate::core::{NarrativeError, Result};
use crate::model::Project;

/// Serialize a project with every attribute
pub fn to_json(project: &Project) -> Result<String> {
    Ok(serde_json::to_string_pretty(project)?)
}

/// Rebuild a project from [`to_json`] output
///
/// The result is checked with [`Project::validate`], so a snapshot with a
/// dangling connection or an entity stored under a foreign key is rejected.
pub fn from_json(text: &str) -> Result<Project> {
    let project: Project = serde_json::from_str(text)?;
    project.validate()?;
    Ok(project)
}

/// Write a snapshot file
pub fn save_snapshot(project: &Project, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = to_json(project)?;
    write_atomic(path, text.as_bytes())?;
    info!(path = %path.display(), project = %project.name(), "Snapshot written");
    Ok(())
}

/// Read a snapshot file
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Project> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| NarrativeError::io(path, e))?;
    let project: Project = serde_json::from_str(&text)
        .map_err(|e| NarrativeError::malformed_file(path, e.to_string()))?;
    project
        .validate()
        .map_err(|e| NarrativeError::malformed_file(path, e.to_string()))?;
    Ok(project)
}
