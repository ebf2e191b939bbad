//! `.ntp` project files
//!
//! The `.ntp` format is plain JSON with a fixed, deliberately narrow schema:
//!
//! ```text
//! { "project": { id, name, created_at, modified_at,
//!     "boards": { "<id>": { id, name, root,
//!         "elements": { "<id>": { id, title, content, position, size } },
//!         "connections": [ { id, source_id, target_id } ] } } } }
//! ```
//!
//! Element themes and components, connection labels, types and themes, board
//! children, project components, variables and the starting element are not
//! part of the schema. They come back with their default values after a
//! save/load cycle. Use [`snapshot`](super::snapshot) for a lossless copy.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{
    format_timestamp, now, parse_timestamp, BoardId, ConnectionId, ElementId, NarrativeError,
    Position, ProjectId, Result, Size,
};
use crate::model::{Board, Connection, Element, Project};

/// Conventional file extension for project files
pub const PROJECT_EXTENSION: &str = "ntp";

#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    project: ProjectRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProjectRecord {
    id: ProjectId,
    name: String,
    created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified_at: Option<String>,
    boards: BTreeMap<String, BoardRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoardRecord {
    id: BoardId,
    name: String,
    #[serde(default)]
    root: bool,
    #[serde(default)]
    elements: BTreeMap<String, ElementRecord>,
    #[serde(default)]
    connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ElementRecord {
    id: ElementId,
    title: String,
    #[serde(default)]
    content: String,
    position: Position,
    size: Size,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectionRecord {
    id: ConnectionId,
    source_id: ElementId,
    target_id: ElementId,
}

impl ProjectRecord {
    fn from_project(project: &Project) -> Self {
        let boards = project
            .boards()
            .map(|board| (board.id().to_string(), BoardRecord::from_board(board)))
            .collect();
        Self {
            id: project.id(),
            name: project.name().to_string(),
            created_at: format_timestamp(&project.created_at()),
            modified_at: Some(format_timestamp(&now())),
            boards,
        }
    }
}

impl BoardRecord {
    fn from_board(board: &Board) -> Self {
        let elements = board
            .elements()
            .map(|element| {
                trace!(element_id = %element.id(), title = %element.title(), "Writing element");
                (
                    element.id().to_string(),
                    ElementRecord {
                        id: element.id(),
                        title: element.title().to_string(),
                        content: element.content().to_string(),
                        position: element.position(),
                        size: element.size(),
                    },
                )
            })
            .collect();

        let mut connections: Vec<ConnectionRecord> = board
            .connections()
            .map(|connection| ConnectionRecord {
                id: connection.id(),
                source_id: connection.source_id(),
                target_id: connection.target_id(),
            })
            .collect();
        connections.sort_by_key(|c| c.id);

        Self {
            id: board.id(),
            name: board.name().to_string(),
            root: board.is_root(),
            elements,
            connections,
        }
    }

    fn into_board(self, path: &Path) -> Result<Board> {
        let mut board = Board::new(self.name, self.root);
        board.id = self.id;

        for (key, record) in self.elements {
            if key != record.id.to_string() {
                warn!(key = %key, element_id = %record.id, "Element key does not match its id");
            }
            let mut element = Element::new(record.title, record.content);
            element.id = record.id;
            element.set_position(record.position);
            element.set_size(record.size);
            element.modified_at = element.created_at;
            board.add_element(element).map_err(|e| {
                NarrativeError::malformed_file(path, format!("board {}: {}", self.id, e))
            })?;
        }

        for record in self.connections {
            let mut connection = Connection::new(record.source_id, record.target_id);
            connection.id = record.id;
            board.add_connection(connection).map_err(|e| {
                NarrativeError::malformed_file(path, format!("board {}: {}", self.id, e))
            })?;
        }

        Ok(board)
    }
}

fn timestamp_field(path: &Path, field: &str, value: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    parse_timestamp(value).ok_or_else(|| {
        NarrativeError::malformed_file(
            path,
            format!("field `{}` is not an ISO-8601 timestamp: {:?}", field, value),
        )
    })
}

/// Serialize a project to `.ntp` JSON text
///
/// `modified_at` is written as the current time.
pub fn to_ntp_string(project: &Project) -> Result<String> {
    let file = ProjectFile {
        project: ProjectRecord::from_project(project),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Rebuild a project from `.ntp` JSON text
///
/// `path` is only used to label errors.
pub fn from_ntp_str(text: &str, path: &Path) -> Result<Project> {
    let file: ProjectFile =
        serde_json::from_str(text).map_err(|e| NarrativeError::malformed_file(path, e.to_string()))?;
    let record = file.project;

    let mut project = Project::new(record.name);
    project.id = record.id;
    project.created_at = timestamp_field(path, "project.created_at", &record.created_at)?;

    for (key, board_record) in record.boards {
        if key != board_record.id.to_string() {
            warn!(key = %key, board_id = %board_record.id, "Board key does not match its id");
        }
        debug!(board_name = %board_record.name, elements = board_record.elements.len(), "Loading board");
        if project.get_board(board_record.id).is_some() {
            return Err(NarrativeError::malformed_file(
                path,
                format!("duplicate board id {}", board_record.id),
            ));
        }
        let mut board = board_record.into_board(path)?;
        // Boards carry no timestamps in the file
        board.created_at = project.created_at;
        board.modified_at = project.created_at;
        project.add_board(board);
    }

    project.modified_at = match record.modified_at.as_deref() {
        Some(value) => timestamp_field(path, "project.modified_at", value)?,
        None => project.created_at,
    };
    Ok(project)
}

/// Save a project to an `.ntp` file
///
/// The document is written to a temporary file next to `path` and renamed
/// over it, so a failed save never leaves a truncated project behind.
pub fn save_project(project: &Project, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let save_span = span!(Level::INFO, "save_project", path = %path.display());
    let _enter = save_span.enter();

    let text = to_ntp_string(project)?;
    write_atomic(path, text.as_bytes())?;

    info!(
        project = %project.name(),
        boards = project.board_count(),
        bytes = text.len(),
        "Project saved"
    );
    Ok(())
}

/// Load a project from an `.ntp` file
///
/// The returned project remembers `path` as its save path.
pub fn load_project(path: impl AsRef<Path>) -> Result<Project> {
    let path = path.as_ref();
    let load_span = span!(Level::INFO, "load_project", path = %path.display());
    let _enter = load_span.enter();

    let text = std::fs::read_to_string(path).map_err(|e| NarrativeError::io(path, e))?;
    let mut project = from_ntp_str(&text, path)?;
    project.set_save_path(Some(path.to_path_buf()));

    info!(
        project = %project.name(),
        boards = project.board_count(),
        "Project loaded"
    );
    Ok(project)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| NarrativeError::io(path, e))?;
    temp.write_all(bytes).map_err(|e| NarrativeError::io(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| NarrativeError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| NarrativeError::io(path, e.error))?;
    trace!(path = %path.display(), bytes = bytes.len(), "File written");
    Ok(())
}
