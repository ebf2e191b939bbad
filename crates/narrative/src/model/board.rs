//! Boards: named canvases holding elements and the connections between them
//!
//! A board is the only place where elements and connections are added or
//! removed, which lets it maintain the referential invariant: every
//! connection's endpoints are elements of the same board.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{now, BoardId, ConnectionId, ElementId, NarrativeError, Result};

use super::{Connection, Element};

/// An element taken off a board together with the connections that touched it
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedElement {
    pub element: Element,
    pub connections: Vec<Connection>,
}

/// A named canvas of elements and connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub(crate) id: BoardId,
    name: String,
    root: bool,
    elements: HashMap<ElementId, Element>,
    connections: HashMap<ConnectionId, Connection>,
    #[serde(default)]
    children: Vec<BoardId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) modified_at: DateTime<Utc>,
}

impl Board {
    /// Create an empty board
    pub fn new(name: impl Into<String>, root: bool) -> Self {
        let timestamp = now();
        Self {
            id: BoardId::new(),
            name: name.into(),
            root,
            elements: HashMap::new(),
            connections: HashMap::new(),
            children: Vec::new(),
            created_at: timestamp,
            modified_at: timestamp,
        }
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this board is marked as the entry board of its project
    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    fn touch(&mut self) {
        self.modified_at = now();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_root(&mut self, root: bool) {
        self.root = root;
        self.touch();
    }

    /// Child board identifiers in order
    pub fn children(&self) -> &[BoardId] {
        &self.children
    }

    /// Register a child board. Returns false if it was already listed.
    pub fn add_child(&mut self, child: BoardId) -> bool {
        if child == self.id || self.children.contains(&child) {
            return false;
        }
        self.children.push(child);
        self.touch();
        true
    }

    pub fn remove_child(&mut self, child: BoardId) -> bool {
        let before = self.children.len();
        self.children.retain(|id| *id != child);
        let removed = self.children.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Add an element to the board
    ///
    /// Fails if an element with the same identifier is already present.
    pub fn add_element(&mut self, element: Element) -> Result<()> {
        if self.elements.contains_key(&element.id()) {
            return Err(NarrativeError::DuplicateElement {
                board_id: self.id,
                element_id: element.id(),
            });
        }
        trace!(board_id = %self.id, element_id = %element.id(), title = %element.title(), "Adding element to board");
        self.elements.insert(element.id(), element);
        self.touch();
        debug!(element_count = self.elements.len(), "Element added");
        Ok(())
    }

    /// Remove an element and every connection that starts or ends at it
    ///
    /// Returns `None` if the element is not on this board.
    pub fn remove_element(&mut self, element_id: ElementId) -> Option<RemovedElement> {
        let element = self.elements.remove(&element_id)?;

        let incident: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.touches(element_id))
            .map(|c| c.id())
            .collect();
        let connections: Vec<Connection> = incident
            .iter()
            .filter_map(|id| self.connections.remove(id))
            .collect();

        self.touch();
        trace!(
            board_id = %self.id,
            element_id = %element_id,
            removed_connections = connections.len(),
            "Removed element from board"
        );
        debug!(
            element_count = self.elements.len(),
            connection_count = self.connections.len(),
            "Element removed"
        );
        Some(RemovedElement {
            element,
            connections,
        })
    }

    pub fn has_element(&self, element_id: ElementId) -> bool {
        self.elements.contains_key(&element_id)
    }

    pub fn get_element(&self, element_id: ElementId) -> Option<&Element> {
        self.elements.get(&element_id)
    }

    pub fn get_element_mut(&mut self, element_id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&element_id)
    }

    /// Iterate over all elements (in no particular order)
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Add a connection between two elements of this board
    ///
    /// Both endpoints must already be on the board and the identifier must be
    /// unused.
    pub fn add_connection(&mut self, connection: Connection) -> Result<()> {
        if self.connections.contains_key(&connection.id()) {
            return Err(NarrativeError::DuplicateConnection {
                board_id: self.id,
                connection_id: connection.id(),
            });
        }
        for endpoint in [connection.source_id(), connection.target_id()] {
            if !self.elements.contains_key(&endpoint) {
                return Err(NarrativeError::DanglingConnection {
                    board_id: self.id,
                    connection_id: connection.id(),
                    element_id: endpoint,
                });
            }
        }
        trace!(
            board_id = %self.id,
            connection_id = %connection.id(),
            source = %connection.source_id(),
            target = %connection.target_id(),
            "Adding connection to board"
        );
        self.connections.insert(connection.id(), connection);
        self.touch();
        debug!(connection_count = self.connections.len(), "Connection added");
        Ok(())
    }

    /// Connect two elements with a default connection and return its identifier
    pub fn connect(&mut self, source: ElementId, target: ElementId) -> Result<ConnectionId> {
        let connection = Connection::new(source, target);
        let id = connection.id();
        self.add_connection(connection)?;
        Ok(id)
    }

    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let removed = self.connections.remove(&connection_id)?;
        self.touch();
        trace!(board_id = %self.id, connection_id = %connection_id, "Removed connection from board");
        Some(removed)
    }

    pub fn get_connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    pub fn get_connection_mut(&mut self, connection_id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&connection_id)
    }

    /// Iterate over all connections (in no particular order)
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections that start or end at the given element
    pub fn incident_connections(&self, element_id: ElementId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| c.touches(element_id))
            .collect()
    }

    /// Check the invariants that `add_element` and `add_connection` enforce
    ///
    /// Needed for boards built by deserialization, which bypasses both.
    pub fn validate(&self) -> Result<()> {
        for (key, element) in &self.elements {
            if *key != element.id() {
                return Err(NarrativeError::inconsistent_id("element", key, element.id()));
            }
        }
        for (key, connection) in &self.connections {
            if *key != connection.id() {
                return Err(NarrativeError::inconsistent_id("connection", key, connection.id()));
            }
            for endpoint in [connection.source_id(), connection.target_id()] {
                if !self.elements.contains_key(&endpoint) {
                    return Err(NarrativeError::DanglingConnection {
                        board_id: self.id,
                        connection_id: connection.id(),
                        element_id: endpoint,
                    });
                }
            }
        }
        Ok(())
    }

    /// Connections leaving the given element
    pub fn connections_from(&self, element_id: ElementId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| c.source_id() == element_id)
            .collect()
    }

    /// Connections arriving at the given element
    pub fn connections_to(&self, element_id: ElementId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| c.target_id() == element_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_chain() -> (Board, ElementId, ElementId, ElementId) {
        let mut board = Board::new("Main", true);
        let a = Element::new("A", "");
        let b = Element::new("B", "");
        let c = Element::new("C", "");
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());
        board.add_element(a).unwrap();
        board.add_element(b).unwrap();
        board.add_element(c).unwrap();
        board.connect(a_id, b_id).unwrap();
        board.connect(b_id, c_id).unwrap();
        (board, a_id, b_id, c_id)
    }

    #[test]
    fn test_new_board() {
        let board = Board::new("Chapter 1", false);
        assert_eq!(board.name(), "Chapter 1");
        assert!(!board.is_root());
        assert_eq!(board.element_count(), 0);
        assert_eq!(board.connection_count(), 0);
        assert!(board.children().is_empty());
    }

    #[test]
    fn test_duplicate_element_rejected() {
        let mut board = Board::new("Main", true);
        let element = Element::new("A", "");
        board.add_element(element.clone()).unwrap();
        let err = board.add_element(element).unwrap_err();
        assert!(matches!(err, NarrativeError::DuplicateElement { .. }));
        assert_eq!(board.element_count(), 1);
    }

    #[test]
    fn test_connection_requires_both_endpoints() {
        let mut board = Board::new("Main", true);
        let a = Element::new("A", "");
        let a_id = a.id();
        board.add_element(a).unwrap();

        let err = board.connect(a_id, ElementId::new()).unwrap_err();
        assert!(matches!(err, NarrativeError::DanglingConnection { .. }));
        assert_eq!(board.connection_count(), 0);
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let (mut board, a, b, _) = board_with_chain();
        let existing = board.connections_from(a)[0].clone();
        let mut replacement = Connection::new(b, a);
        replacement.id = existing.id();

        let err = board.add_connection(replacement).unwrap_err();
        assert!(matches!(err, NarrativeError::DuplicateConnection { .. }));
        assert_eq!(board.connection_count(), 2);
        assert_eq!(board.get_connection(existing.id()), Some(&existing));
    }

    #[test]
    fn test_validate_detects_bypassed_invariants() {
        let (mut board, _, b, _) = board_with_chain();
        assert!(board.validate().is_ok());

        board.elements.remove(&b);
        let err = board.validate().unwrap_err();
        assert!(matches!(err, NarrativeError::DanglingConnection { element_id, .. } if element_id == b));

        let (mut board, a, ..) = board_with_chain();
        let element = board.elements.remove(&a).unwrap();
        board.elements.insert(ElementId::new(), element);
        let err = board.validate().unwrap_err();
        assert!(matches!(err, NarrativeError::InconsistentId { kind: "element", .. }));
    }

    #[test]
    fn test_remove_element_cascades() {
        let (mut board, _a, b, _c) = board_with_chain();
        assert_eq!(board.incident_connections(b).len(), 2);

        let removed = board.remove_element(b).unwrap();
        assert_eq!(removed.element.title(), "B");
        assert_eq!(removed.connections.len(), 2);
        assert_eq!(board.element_count(), 2);
        assert_eq!(board.connection_count(), 0);
    }

    #[test]
    fn test_remove_element_keeps_unrelated_connections() {
        let (mut board, a, b, c) = board_with_chain();
        board.remove_element(a).unwrap();
        assert_eq!(board.connection_count(), 1);
        let remaining = board.connections().next().unwrap();
        assert_eq!(remaining.source_id(), b);
        assert_eq!(remaining.target_id(), c);
    }

    #[test]
    fn test_remove_missing_element() {
        let (mut board, ..) = board_with_chain();
        assert!(board.remove_element(ElementId::new()).is_none());
        assert_eq!(board.element_count(), 3);
    }

    #[test]
    fn test_directional_queries() {
        let (board, a, b, c) = board_with_chain();
        assert_eq!(board.connections_from(a).len(), 1);
        assert_eq!(board.connections_to(a).len(), 0);
        assert_eq!(board.connections_from(b).len(), 1);
        assert_eq!(board.connections_to(c).len(), 1);
    }

    #[test]
    fn test_children_are_unique() {
        let mut board = Board::new("Main", true);
        let child = BoardId::new();
        assert!(board.add_child(child));
        assert!(!board.add_child(child));
        assert!(!board.add_child(board.id()));
        assert_eq!(board.children(), &[child]);
        assert!(board.remove_child(child));
        assert!(!board.remove_child(child));
    }

    #[test]
    fn test_mutations_bump_modified_at() {
        let mut board = Board::new("Main", true);
        let before = board.modified_at();
        std::thread::sleep(std::time::Duration::from_millis(2));
        board.add_element(Element::new("A", "")).unwrap();
        assert!(board.modified_at() > before);
    }

    #[test]
    fn test_serde_roundtrip() {
        let (mut board, ..) = board_with_chain();
        board.add_child(BoardId::new());
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);
    }
}
