//! Narrative - boards of story elements with undo/redo editing
//!
//! A project holds boards; a board holds positioned elements and directed
//! connections between them. Edits go through reversible commands recorded
//! in a linear history, and projects are stored as `.ntp` JSON files.
//!
//! # Quick Start
//!
//! ```rust
//! use narrative::prelude::*;
//!
//! let mut session = Session::default();
//! let board = session.current_board_id().unwrap();
//!
//! let scene = Element::new("Scene 1", "It was a dark and stormy night");
//! let scene_id = scene.id();
//! session
//!     .execute(AddElement::new(board, scene, Position::new(50.0, 50.0)))
//!     .unwrap();
//! session.execute(DuplicateElement::new(board, scene_id)).unwrap();
//! assert_eq!(session.current_board().unwrap().element_count(), 2);
//!
//! session.undo().unwrap();
//! assert_eq!(session.current_board().unwrap().element_count(), 1);
//! ```
//!
//! # Saving and Loading
//!
//! ```rust,no_run
//! use narrative::prelude::*;
//!
//! let mut project = Project::new("Heist");
//! project.add_board(Board::new("Main", true));
//! narrative::save(&project, "heist.ntp").unwrap();
//!
//! let loaded = narrative::load("heist.ntp").unwrap();
//! assert_eq!(loaded.name(), "Heist");
//! ```

pub mod commands;
pub mod core;
pub mod model;
pub mod persistence;
pub mod session;

pub use crate::core::*;

use std::path::Path;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::commands::{
        AddConnection, AddElement, Command, CommandStack, DeleteConnection, DeleteElement,
        DuplicateElement, MoveElement, PropertyChange, UpdateElement,
    };
    pub use crate::core::{
        BoardId, ComponentId, ConnectionId, ConnectionType, ElementId, NarrativeError, Position,
        ProjectId, SessionConfig, Size,
    };
    pub use crate::model::{Board, Component, Connection, Element, Project, Variable};
    pub use crate::session::{ChangeEvent, Session};
}

/// Save a project to an `.ntp` file
///
/// Shorthand for [`persistence::save_project`].
///
/// # Example
/// ```rust,no_run
/// use narrative::model::{Board, Project};
///
/// let mut project = Project::new("Story");
/// project.add_board(Board::new("Main", true));
/// narrative::save(&project, "story.ntp").unwrap();
/// ```
pub fn save(project: &model::Project, path: impl AsRef<Path>) -> Result<()> {
    persistence::save_project(project, path)
}

/// Load a project from an `.ntp` file
///
/// Shorthand for [`persistence::load_project`]. The returned project
/// remembers `path` as its save path.
pub fn load(path: impl AsRef<Path>) -> Result<model::Project> {
    persistence::load_project(path)
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_save_and_load_shorthands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.ntp");

        let mut project = Project::new("Story");
        project.add_board(Board::new("Main", true));
        super::save(&project, &path).unwrap();

        let loaded = super::load(&path).unwrap();
        assert_eq!(loaded.name(), "Story");
        assert_eq!(loaded.save_path(), Some(path.as_path()));
    }
}
