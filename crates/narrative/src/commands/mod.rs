//! Reversible editing commands and the undo/redo history
//!
//! Every user-visible mutation of a board is wrapped in a [`Command`]. Commands
//! address boards and elements by identifier and receive the [`Project`] they
//! act on when executed, so they never hold references into the graph.
//!
//! ```rust
//! use narrative::prelude::*;
//!
//! let mut project = Project::new("Story");
//! let board = project.add_board(Board::new("Main", true));
//! let mut history = CommandStack::new();
//!
//! let element = Element::new("Opening", "");
//! let id = element.id();
//! history
//!     .execute(AddElement::new(board, element, Position::new(10.0, 10.0)), &mut project)
//!     .unwrap();
//! assert!(project.get_board(board).unwrap().has_element(id));
//!
//! history.undo(&mut project).unwrap();
//! assert!(!project.get_board(board).unwrap().has_element(id));
//! ```

mod connection;
mod element;
mod stack;

pub use connection::*;
pub use element::*;
pub use stack::*;

use crate::core::{BoardId, NarrativeError, Result};
use crate::model::{Board, Project};

/// A reversible mutation of one board
///
/// `execute` followed by `undo` must leave the board as it was. A command
/// that fails must not have mutated anything.
pub trait Command: std::fmt::Debug {
    /// Apply the command
    fn execute(&mut self, project: &mut Project) -> Result<()>;

    /// Revert a previous [`execute`](Command::execute)
    fn undo(&mut self, project: &mut Project) -> Result<()>;

    /// The board this command edits
    fn board_id(&self) -> BoardId;

    /// Short human-readable description, e.g. for an "Undo ..." menu entry
    fn description(&self) -> String;
}

pub(crate) fn board_mut(project: &mut Project, board_id: BoardId) -> Result<&mut Board> {
    project
        .get_board_mut(board_id)
        .ok_or_else(|| NarrativeError::board_not_found(board_id))
}
