//! Core error types for the board model
//!
//! This module defines the error type shared by the entity model, the command
//! layer and the persistence layer.

use std::path::PathBuf;

use thiserror::Error;

use super::types::{BoardId, ConnectionId, ElementId};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, NarrativeError>;

/// Core error types for board and project handling
#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Board not found: {board_id}")]
    BoardNotFound { board_id: BoardId },

    #[error("Element not found: {element_id} on board {board_id}")]
    ElementNotFound {
        board_id: BoardId,
        element_id: ElementId,
    },

    #[error("Connection not found: {connection_id} on board {board_id}")]
    ConnectionNotFound {
        board_id: BoardId,
        connection_id: ConnectionId,
    },

    #[error("Element already exists: {element_id} on board {board_id}")]
    DuplicateElement {
        board_id: BoardId,
        element_id: ElementId,
    },

    #[error("Connection already exists: {connection_id} on board {board_id}")]
    DuplicateConnection {
        board_id: BoardId,
        connection_id: ConnectionId,
    },

    #[error("Inconsistent {kind} id: stored under key {key} but has id {id}")]
    InconsistentId {
        kind: &'static str,
        key: String,
        id: String,
    },

    #[error("Dangling connection {connection_id}: endpoint {element_id} is not on board {board_id}")]
    DanglingConnection {
        board_id: BoardId,
        connection_id: ConnectionId,
        element_id: ElementId,
    },

    #[error("Unknown connection type: {value}")]
    UnknownConnectionType { value: String },

    #[error("Project has no save path")]
    NoSavePath,

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project file {}: {message}", path.display())]
    MalformedFile { path: PathBuf, message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl NarrativeError {
    /// Create a board-not-found error
    pub fn board_not_found(board_id: BoardId) -> Self {
        Self::BoardNotFound { board_id }
    }

    /// Create an element-not-found error
    pub fn element_not_found(board_id: BoardId, element_id: ElementId) -> Self {
        Self::ElementNotFound {
            board_id,
            element_id,
        }
    }

    /// Create a connection-not-found error
    pub fn connection_not_found(board_id: BoardId, connection_id: ConnectionId) -> Self {
        Self::ConnectionNotFound {
            board_id,
            connection_id,
        }
    }

    /// Create an error for an entity stored under a key other than its id
    pub fn inconsistent_id(kind: &'static str, key: impl ToString, id: impl ToString) -> Self {
        Self::InconsistentId {
            kind,
            key: key.to_string(),
            id: id.to_string(),
        }
    }

    /// Create an IO error tagged with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed file error
    pub fn malformed_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by a missing board, element or connection
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BoardNotFound { .. }
                | Self::ElementNotFound { .. }
                | Self::ConnectionNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_not_found() {
        let id = BoardId::new();
        let error = NarrativeError::board_not_found(id);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Board not found"));
        assert!(error_msg.contains(&id.to_string()));
        assert!(error.is_not_found());
    }

    #[test]
    fn test_malformed_file() {
        let error = NarrativeError::malformed_file("story.ntp", "missing field `title`");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Malformed project file"));
        assert!(error_msg.contains("story.ntp"));
        assert!(error_msg.contains("`title`"));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = NarrativeError::io("missing.ntp", io_err);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("missing.ntp"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_inconsistent_id() {
        let error = NarrativeError::inconsistent_id("element", "abc", "def");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Inconsistent element id"));
        assert!(error_msg.contains("key abc"));
        assert!(error_msg.contains("id def"));
        assert!(!error.is_not_found());
    }
}
