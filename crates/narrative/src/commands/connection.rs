//! Commands that link and unlink elements

use super::{board_mut, Command};
use crate::core::{BoardId, ConnectionId, ElementId, NarrativeError, Result};
use crate::model::{Connection, Project};

/// Connect two elements of a board
#[derive(Debug, Clone)]
pub struct AddConnection {
    board_id: BoardId,
    connection: Connection,
}

impl AddConnection {
    pub fn new(board_id: BoardId, source_id: ElementId, target_id: ElementId) -> Self {
        Self::with_connection(board_id, Connection::new(source_id, target_id))
    }

    /// Add a preconfigured connection (label, type, theme)
    pub fn with_connection(board_id: BoardId, connection: Connection) -> Self {
        Self {
            board_id,
            connection,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }
}

impl Command for AddConnection {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        board_mut(project, self.board_id)?.add_connection(self.connection.clone())
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        let id = self.connection.id();
        self.connection = board_mut(project, self.board_id)?
            .remove_connection(id)
            .ok_or_else(|| NarrativeError::connection_not_found(self.board_id, id))?;
        Ok(())
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        "Connect elements".to_string()
    }
}

/// Remove a single connection
#[derive(Debug, Clone)]
pub struct DeleteConnection {
    board_id: BoardId,
    connection_id: ConnectionId,
    removed: Option<Connection>,
}

impl DeleteConnection {
    pub fn new(board_id: BoardId, connection_id: ConnectionId) -> Self {
        Self {
            board_id,
            connection_id,
            removed: None,
        }
    }
}

impl Command for DeleteConnection {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        let removed = board_mut(project, self.board_id)?
            .remove_connection(self.connection_id)
            .ok_or_else(|| NarrativeError::connection_not_found(self.board_id, self.connection_id))?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        let connection = self
            .removed
            .clone()
            .ok_or_else(|| NarrativeError::connection_not_found(self.board_id, self.connection_id))?;
        board_mut(project, self.board_id)?.add_connection(connection)?;
        self.removed = None;
        Ok(())
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        "Delete connection".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Board, Element};

    fn linked_board() -> (Project, BoardId, ElementId, ElementId) {
        let mut project = Project::new("Story");
        let mut board = Board::new("Main", true);
        let a = Element::new("A", "");
        let b = Element::new("B", "");
        let (a_id, b_id) = (a.id(), b.id());
        board.add_element(a).unwrap();
        board.add_element(b).unwrap();
        let board_id = project.add_board(board);
        (project, board_id, a_id, b_id)
    }

    #[test]
    fn test_add_connection_roundtrip() {
        let (mut project, board, a, b) = linked_board();
        let mut command = AddConnection::new(board, a, b);
        command.execute(&mut project).unwrap();
        let state = project.get_board(board).unwrap();
        assert_eq!(state.connection_count(), 1);
        assert!(state.get_connection(command.connection_id()).is_some());

        command.undo(&mut project).unwrap();
        assert_eq!(project.get_board(board).unwrap().connection_count(), 0);
    }

    #[test]
    fn test_add_connection_to_missing_element_fails() {
        let (mut project, board, a, _) = linked_board();
        let mut command = AddConnection::new(board, a, ElementId::new());
        assert!(command.execute(&mut project).is_err());
        assert_eq!(project.get_board(board).unwrap().connection_count(), 0);
    }

    #[test]
    fn test_delete_connection_roundtrip() {
        let (mut project, board, a, b) = linked_board();
        let link = project.get_board_mut(board).unwrap().connect(a, b).unwrap();

        let mut command = DeleteConnection::new(board, link);
        command.execute(&mut project).unwrap();
        assert_eq!(project.get_board(board).unwrap().connection_count(), 0);
        command.undo(&mut project).unwrap();
        assert!(project.get_board(board).unwrap().get_connection(link).is_some());
    }
}
