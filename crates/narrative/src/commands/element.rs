//! Commands that create, remove, move and edit elements

use tracing::{debug, trace};

use super::{board_mut, Command};
use crate::core::{BoardId, ElementId, NarrativeError, Position, Result, Size};
use crate::model::{Element, Project, RemovedElement};

/// Place a new element on a board
#[derive(Debug, Clone)]
pub struct AddElement {
    board_id: BoardId,
    element: Element,
    position: Position,
}

impl AddElement {
    pub fn new(board_id: BoardId, element: Element, position: Position) -> Self {
        Self {
            board_id,
            element,
            position,
        }
    }

    pub fn element_id(&self) -> ElementId {
        self.element.id()
    }
}

impl Command for AddElement {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let mut element = self.element.clone();
        element.set_position(self.position);
        board.add_element(element)
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let removed = board
            .remove_element(self.element.id())
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.element.id()))?;
        self.element = removed.element;
        Ok(())
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        format!("Add element '{}'", self.element.title())
    }
}

/// Remove an element together with its incident connections
///
/// The removed element and connections are captured on every execute, so a
/// redo after an undo works on the board as it is at that moment.
#[derive(Debug, Clone)]
pub struct DeleteElement {
    board_id: BoardId,
    element_id: ElementId,
    removed: Option<RemovedElement>,
}

impl DeleteElement {
    pub fn new(board_id: BoardId, element_id: ElementId) -> Self {
        Self {
            board_id,
            element_id,
            removed: None,
        }
    }

    /// Connections removed by the last execute
    pub fn removed_connections(&self) -> usize {
        self.removed.as_ref().map_or(0, |r| r.connections.len())
    }
}

impl Command for DeleteElement {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let removed = board
            .remove_element(self.element_id)
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.element_id))?;
        debug!(
            element_id = %self.element_id,
            connections = removed.connections.len(),
            "Captured deleted element"
        );
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let removed = self
            .removed
            .as_ref()
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.element_id))?;

        if board.has_element(self.element_id) {
            return Err(NarrativeError::DuplicateElement {
                board_id: self.board_id,
                element_id: self.element_id,
            });
        }
        // Every other endpoint must still exist before anything is restored.
        for connection in &removed.connections {
            for endpoint in [connection.source_id(), connection.target_id()] {
                if endpoint != self.element_id && !board.has_element(endpoint) {
                    return Err(NarrativeError::DanglingConnection {
                        board_id: self.board_id,
                        connection_id: connection.id(),
                        element_id: endpoint,
                    });
                }
            }
        }

        board.add_element(removed.element.clone())?;
        for connection in &removed.connections {
            board.add_connection(connection.clone())?;
        }
        trace!(
            element_id = %self.element_id,
            connections = removed.connections.len(),
            "Restored deleted element"
        );
        self.removed = None;
        Ok(())
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        match &self.removed {
            Some(removed) => format!("Delete element '{}'", removed.element.title()),
            None => "Delete element".to_string(),
        }
    }
}

/// Move an element from one position to another
#[derive(Debug, Clone)]
pub struct MoveElement {
    board_id: BoardId,
    element_id: ElementId,
    from: Position,
    to: Position,
}

impl MoveElement {
    pub fn new(board_id: BoardId, element_id: ElementId, from: Position, to: Position) -> Self {
        Self {
            board_id,
            element_id,
            from,
            to,
        }
    }

    /// True when the move does not change the position
    ///
    /// Callers may skip recording such a command.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    fn place(&self, project: &mut Project, position: Position) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let element = board
            .get_element_mut(self.element_id)
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.element_id))?;
        element.move_to(position.x, position.y);
        Ok(())
    }
}

impl Command for MoveElement {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        self.place(project, self.to)
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        self.place(project, self.from)
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        format!("Move element to {}", self.to)
    }
}

/// A typed change of one element property, carrying both values
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyChange {
    Title { old: String, new: String },
    Content { old: String, new: String },
    Size { old: Size, new: Size },
    /// The element's visual style tag, stored as its theme
    Color { old: String, new: String },
}

impl PropertyChange {
    /// Title change starting from the element's current title
    pub fn title(element: &Element, new: impl Into<String>) -> Self {
        PropertyChange::Title {
            old: element.title().to_string(),
            new: new.into(),
        }
    }

    /// Content change starting from the element's current content
    pub fn content(element: &Element, new: impl Into<String>) -> Self {
        PropertyChange::Content {
            old: element.content().to_string(),
            new: new.into(),
        }
    }

    /// Size change starting from the element's current size
    pub fn size(element: &Element, new: Size) -> Self {
        PropertyChange::Size {
            old: element.size(),
            new,
        }
    }

    /// Color change starting from the element's current theme
    pub fn color(element: &Element, new: impl Into<String>) -> Self {
        PropertyChange::Color {
            old: element.theme().to_string(),
            new: new.into(),
        }
    }

    /// Name of the changed property
    pub fn property(&self) -> &'static str {
        match self {
            PropertyChange::Title { .. } => "title",
            PropertyChange::Content { .. } => "content",
            PropertyChange::Size { .. } => "size",
            PropertyChange::Color { .. } => "color",
        }
    }

    pub fn is_noop(&self) -> bool {
        match self {
            PropertyChange::Title { old, new }
            | PropertyChange::Content { old, new }
            | PropertyChange::Color { old, new } => old == new,
            PropertyChange::Size { old, new } => old == new,
        }
    }

    fn apply(&self, element: &mut Element, forward: bool) {
        fn pick<'a, T>(forward: bool, old: &'a T, new: &'a T) -> &'a T {
            if forward {
                new
            } else {
                old
            }
        }

        match self {
            PropertyChange::Title { old, new } => element.set_title(pick(forward, old, new).as_str()),
            PropertyChange::Content { old, new } => {
                element.set_content(pick(forward, old, new).as_str())
            }
            PropertyChange::Size { old, new } => element.set_size(*pick(forward, old, new)),
            PropertyChange::Color { old, new } => element.set_theme(pick(forward, old, new).as_str()),
        }
    }
}

/// Change one property of an element
#[derive(Debug, Clone)]
pub struct UpdateElement {
    board_id: BoardId,
    element_id: ElementId,
    change: PropertyChange,
}

impl UpdateElement {
    pub fn new(board_id: BoardId, element_id: ElementId, change: PropertyChange) -> Self {
        Self {
            board_id,
            element_id,
            change,
        }
    }

    pub fn change(&self) -> &PropertyChange {
        &self.change
    }

    fn apply(&self, project: &mut Project, forward: bool) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let element = board
            .get_element_mut(self.element_id)
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.element_id))?;
        self.change.apply(element, forward);
        trace!(element_id = %self.element_id, property = self.change.property(), forward, "Element property applied");
        Ok(())
    }
}

impl Command for UpdateElement {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        self.apply(project, true)
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        self.apply(project, false)
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        format!("Change element {}", self.change.property())
    }
}

/// Place a copy of an existing element next to it
///
/// The copy is created on the first execute; redo re-inserts the same copy.
#[derive(Debug, Clone)]
pub struct DuplicateElement {
    board_id: BoardId,
    source_id: ElementId,
    copy: Option<Element>,
}

impl DuplicateElement {
    pub fn new(board_id: BoardId, source_id: ElementId) -> Self {
        Self {
            board_id,
            source_id,
            copy: None,
        }
    }

    /// Identifier of the copy, once the command has run
    pub fn copy_id(&self) -> Option<ElementId> {
        self.copy.as_ref().map(|c| c.id())
    }
}

impl Command for DuplicateElement {
    fn execute(&mut self, project: &mut Project) -> Result<()> {
        let board = board_mut(project, self.board_id)?;
        let copy = match &self.copy {
            Some(copy) => copy.clone(),
            None => board
                .get_element(self.source_id)
                .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.source_id))?
                .duplicate(),
        };
        board.add_element(copy.clone())?;
        self.copy = Some(copy);
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<()> {
        let copy_id = self
            .copy_id()
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, self.source_id))?;
        let board = board_mut(project, self.board_id)?;
        let removed = board
            .remove_element(copy_id)
            .ok_or_else(|| NarrativeError::element_not_found(self.board_id, copy_id))?;
        self.copy = Some(removed.element);
        Ok(())
    }

    fn board_id(&self) -> BoardId {
        self.board_id
    }

    fn description(&self) -> String {
        "Duplicate element".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;

    fn project_with_board() -> (Project, BoardId) {
        let mut project = Project::new("Story");
        let board = project.add_board(Board::new("Main", true));
        (project, board)
    }

    fn place(project: &mut Project, board: BoardId, title: &str, x: f64, y: f64) -> ElementId {
        let element = Element::new(title, "").at(x, y);
        let id = element.id();
        project.get_board_mut(board).unwrap().add_element(element).unwrap();
        id
    }

    #[test]
    fn test_add_element_sets_position() {
        let (mut project, board) = project_with_board();
        let element = Element::new("A", "");
        let id = element.id();
        let mut command = AddElement::new(board, element, Position::new(40.0, 60.0));

        command.execute(&mut project).unwrap();
        let placed = project.get_board(board).unwrap().get_element(id).unwrap();
        assert_eq!(placed.position(), Position::new(40.0, 60.0));

        command.undo(&mut project).unwrap();
        assert!(!project.get_board(board).unwrap().has_element(id));
    }

    #[test]
    fn test_add_element_twice_fails() {
        let (mut project, board) = project_with_board();
        let mut command = AddElement::new(board, Element::new("A", ""), Position::default());
        command.execute(&mut project).unwrap();
        assert!(command.execute(&mut project).is_err());
        assert_eq!(project.get_board(board).unwrap().element_count(), 1);
    }

    #[test]
    fn test_add_element_unknown_board() {
        let (mut project, _) = project_with_board();
        let mut command = AddElement::new(BoardId::new(), Element::new("A", ""), Position::default());
        let err = command.execute(&mut project).unwrap_err();
        assert!(matches!(err, NarrativeError::BoardNotFound { .. }));
    }

    #[test]
    fn test_delete_element_restores_connections() {
        let (mut project, board) = project_with_board();
        let a = place(&mut project, board, "A", 0.0, 0.0);
        let b = place(&mut project, board, "B", 100.0, 100.0);
        let link = project.get_board_mut(board).unwrap().connect(a, b).unwrap();

        let mut command = DeleteElement::new(board, a);
        command.execute(&mut project).unwrap();
        assert_eq!(command.removed_connections(), 1);
        let state = project.get_board(board).unwrap();
        assert_eq!(state.element_count(), 1);
        assert_eq!(state.connection_count(), 0);

        command.undo(&mut project).unwrap();
        let state = project.get_board(board).unwrap();
        assert_eq!(state.element_count(), 2);
        let restored = state.get_connection(link).unwrap();
        assert_eq!(restored.source_id(), a);
        assert_eq!(restored.target_id(), b);
    }

    #[test]
    fn test_delete_element_recaptures_on_redo() {
        let (mut project, board) = project_with_board();
        let a = place(&mut project, board, "A", 0.0, 0.0);
        let b = place(&mut project, board, "B", 0.0, 0.0);
        let c = place(&mut project, board, "C", 0.0, 0.0);
        project.get_board_mut(board).unwrap().connect(a, b).unwrap();

        let mut command = DeleteElement::new(board, a);
        command.execute(&mut project).unwrap();
        command.undo(&mut project).unwrap();

        project.get_board_mut(board).unwrap().connect(c, a).unwrap();
        command.execute(&mut project).unwrap();
        assert_eq!(command.removed_connections(), 2);
        assert_eq!(project.get_board(board).unwrap().connection_count(), 0);
    }

    #[test]
    fn test_move_element_roundtrip() {
        let (mut project, board) = project_with_board();
        let a = place(&mut project, board, "A", 5.0, 5.0);
        let mut command = MoveElement::new(board, a, Position::new(5.0, 5.0), Position::new(80.0, 20.0));
        assert!(!command.is_noop());

        command.execute(&mut project).unwrap();
        let position = |p: &Project| p.get_board(board).unwrap().get_element(a).unwrap().position();
        assert_eq!(position(&project), Position::new(80.0, 20.0));
        command.undo(&mut project).unwrap();
        assert_eq!(position(&project), Position::new(5.0, 5.0));
    }

    #[test]
    fn test_update_element_each_property() {
        let (mut project, board) = project_with_board();
        let a = place(&mut project, board, "A", 0.0, 0.0);
        let element = project.get_board(board).unwrap().get_element(a).unwrap().clone();

        let changes = vec![
            PropertyChange::title(&element, "Renamed"),
            PropertyChange::content(&element, "New body"),
            PropertyChange::size(&element, Size::new(320.0, 90.0)),
            PropertyChange::color(&element, "crimson"),
        ];
        for change in changes {
            let mut command = UpdateElement::new(board, a, change);
            command.execute(&mut project).unwrap();
            command.undo(&mut project).unwrap();
        }

        let after = project.get_board(board).unwrap().get_element(a).unwrap();
        assert_eq!(after.title(), "A");
        assert_eq!(after.content(), "");
        assert_eq!(after.size(), Size::default());
        assert_eq!(after.theme(), "default");
    }

    #[test]
    fn test_update_element_applies_new_value() {
        let (mut project, board) = project_with_board();
        let a = place(&mut project, board, "A", 0.0, 0.0);
        let element = project.get_board(board).unwrap().get_element(a).unwrap().clone();
        let mut command = UpdateElement::new(board, a, PropertyChange::color(&element, "crimson"));
        command.execute(&mut project).unwrap();
        let after = project.get_board(board).unwrap().get_element(a).unwrap();
        assert_eq!(after.theme(), "crimson");
        assert_eq!(command.change().property(), "color");
    }

    #[test]
    fn test_duplicate_element_reuses_copy_on_redo() {
        let (mut project, board) = project_with_board();
        let a = place(&mut project, board, "Scene 1", 50.0, 50.0);
        let mut command = DuplicateElement::new(board, a);

        command.execute(&mut project).unwrap();
        let copy_id = command.copy_id().unwrap();
        let copy = project.get_board(board).unwrap().get_element(copy_id).unwrap();
        assert_eq!(copy.title(), "Scene 1 (Copy)");
        assert_eq!(copy.position(), Position::new(70.0, 70.0));

        command.undo(&mut project).unwrap();
        assert_eq!(project.get_board(board).unwrap().element_count(), 1);
        command.execute(&mut project).unwrap();
        assert_eq!(command.copy_id(), Some(copy_id));
        assert_eq!(project.get_board(board).unwrap().element_count(), 2);
    }
}
