//! Projects: the top-level container owning boards, components and variables

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::core::{now, BoardId, ComponentId, ElementId, NarrativeError, ProjectId, Result};

use super::{Board, Element};

/// A reusable component definition that elements can reference
///
/// The model treats components as opaque named records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(),
            name: name.into(),
            properties: serde_json::Map::new(),
        }
    }
}

/// A named project variable with an opaque value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A structural problem found by [`Project::integrity_issues`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// No board is flagged as root
    NoRootBoard,
    /// More than one board is flagged as root
    MultipleRootBoards(Vec<BoardId>),
    /// A board lists a child board that is not part of the project
    OrphanedChild { board_id: BoardId, child_id: BoardId },
    /// The starting element is not on any board
    MissingStartingElement(ElementId),
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::NoRootBoard => write!(f, "no root board"),
            IntegrityIssue::MultipleRootBoards(ids) => {
                write!(f, "{} boards are flagged as root", ids.len())
            }
            IntegrityIssue::OrphanedChild { board_id, child_id } => {
                write!(f, "board {} lists missing child board {}", board_id, child_id)
            }
            IntegrityIssue::MissingStartingElement(id) => {
                write!(f, "starting element {} is not on any board", id)
            }
        }
    }
}

/// The top-level container of a narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub(crate) id: ProjectId,
    name: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) modified_at: DateTime<Utc>,
    boards: HashMap<BoardId, Board>,
    #[serde(default)]
    components: HashMap<ComponentId, Component>,
    #[serde(default)]
    variables: HashMap<String, Variable>,
    #[serde(default)]
    starting_element: Option<ElementId>,
    #[serde(skip)]
    save_path: Option<PathBuf>,
}

impl Project {
    /// Create an empty, unsaved project
    pub fn new(name: impl Into<String>) -> Self {
        let timestamp = now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            created_at: timestamp,
            modified_at: timestamp,
            boards: HashMap::new(),
            components: HashMap::new(),
            variables: HashMap::new(),
            starting_element: None,
            save_path: None,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
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

    /// Add a board and return its identifier
    pub fn add_board(&mut self, board: Board) -> BoardId {
        let id = board.id();
        trace!(board_id = %id, board_name = %board.name(), "Adding board to project");
        self.boards.insert(id, board);
        self.touch();
        debug!(board_count = self.boards.len(), "Board added");
        id
    }

    /// Remove a board
    ///
    /// Other boards listing it as a child keep that reference.
    pub fn remove_board(&mut self, board_id: BoardId) -> Option<Board> {
        let removed = self.boards.remove(&board_id)?;
        self.touch();
        debug!(board_id = %board_id, board_count = self.boards.len(), "Board removed");
        Some(removed)
    }

    pub fn get_board(&self, board_id: BoardId) -> Option<&Board> {
        self.boards.get(&board_id)
    }

    pub fn get_board_mut(&mut self, board_id: BoardId) -> Option<&mut Board> {
        self.boards.get_mut(&board_id)
    }

    /// Iterate over all boards (in no particular order)
    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    /// Boards flagged as root, oldest first
    pub fn root_boards(&self) -> Vec<&Board> {
        let mut roots: Vec<&Board> = self.boards.values().filter(|b| b.is_root()).collect();
        roots.sort_by_key(|b| (b.created_at(), b.id()));
        roots
    }

    /// The entry board: the oldest board flagged as root
    ///
    /// `.ntp` files do not store creation times. Boards loaded from one all
    /// carry the project's creation time, so after a load the root with the
    /// smallest id is chosen, independent of the order in the file.
    pub fn root_board(&self) -> Option<&Board> {
        self.root_boards().into_iter().next()
    }

    /// Check that every board is stored under its own id and satisfies
    /// [`Board::validate`]
    pub fn validate(&self) -> Result<()> {
        for (key, board) in &self.boards {
            if *key != board.id() {
                return Err(NarrativeError::inconsistent_id("board", key, board.id()));
            }
            board.validate()?;
        }
        Ok(())
    }

    /// Look up an element on any board
    pub fn find_element(&self, element_id: ElementId) -> Option<(BoardId, &Element)> {
        self.boards.values().find_map(|board| {
            board
                .get_element(element_id)
                .map(|element| (board.id(), element))
        })
    }

    pub fn starting_element(&self) -> Option<ElementId> {
        self.starting_element
    }

    /// Record the element a reader starts from; the identifier is not checked
    pub fn set_starting_element(&mut self, element_id: ElementId) {
        self.starting_element = Some(element_id);
        self.touch();
    }

    pub fn clear_starting_element(&mut self) {
        self.starting_element = None;
        self.touch();
    }

    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = component.id;
        self.components.insert(id, component);
        self.touch();
        id
    }

    pub fn remove_component(&mut self, component_id: ComponentId) -> Option<Component> {
        let removed = self.components.remove(&component_id)?;
        self.touch();
        Some(removed)
    }

    pub fn get_component(&self, component_id: ComponentId) -> Option<&Component> {
        self.components.get(&component_id)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Insert or replace a variable, keyed by its name
    pub fn set_variable(&mut self, variable: Variable) -> Option<Variable> {
        let previous = self.variables.insert(variable.name.clone(), variable);
        self.touch();
        previous
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        let removed = self.variables.remove(name)?;
        self.touch();
        Some(removed)
    }

    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Where the project was last saved or loaded from; `None` means unsaved
    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn set_save_path(&mut self, path: Option<PathBuf>) {
        self.save_path = path;
    }

    /// Report structural problems that the model tolerates but callers may
    /// want to surface
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let roots = self.root_boards();
        match roots.len() {
            0 if !self.boards.is_empty() => issues.push(IntegrityIssue::NoRootBoard),
            0 | 1 => {}
            _ => issues.push(IntegrityIssue::MultipleRootBoards(
                roots.iter().map(|b| b.id()).collect(),
            )),
        }

        for board in self.boards.values() {
            for child in board.children() {
                if !self.boards.contains_key(child) {
                    issues.push(IntegrityIssue::OrphanedChild {
                        board_id: board.id(),
                        child_id: *child,
                    });
                }
            }
        }

        if let Some(start) = self.starting_element {
            if self.find_element(start).is_none() {
                issues.push(IntegrityIssue::MissingStartingElement(start));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_is_empty() {
        let project = Project::new("Story");
        assert_eq!(project.name(), "Story");
        assert_eq!(project.board_count(), 0);
        assert!(project.starting_element().is_none());
        assert!(project.save_path().is_none());
        assert!(project.integrity_issues().is_empty());
    }

    #[test]
    fn test_board_lookup() {
        let mut project = Project::new("Story");
        let id = project.add_board(Board::new("Main", true));
        assert_eq!(project.get_board(id).unwrap().name(), "Main");
        assert!(project.get_board(BoardId::new()).is_none());
        assert!(project.remove_board(id).is_some());
        assert!(project.remove_board(id).is_none());
    }

    #[test]
    fn test_remove_board_leaves_child_references() {
        let mut project = Project::new("Story");
        let mut parent = Board::new("Main", true);
        let child = Board::new("Side", false);
        parent.add_child(child.id());
        let parent_id = project.add_board(parent);
        let child_id = project.add_board(child);

        project.remove_board(child_id);
        assert_eq!(project.get_board(parent_id).unwrap().children(), &[child_id]);
        assert_eq!(
            project.integrity_issues(),
            vec![IntegrityIssue::OrphanedChild {
                board_id: parent_id,
                child_id
            }]
        );
    }

    #[test]
    fn test_root_board_reporting() {
        let mut project = Project::new("Story");
        project.add_board(Board::new("Loose", false));
        assert_eq!(project.integrity_issues(), vec![IntegrityIssue::NoRootBoard]);

        let first = project.add_board(Board::new("Main", true));
        assert_eq!(project.root_board().unwrap().id(), first);
        assert!(project.integrity_issues().is_empty());

        project.add_board(Board::new("Other", true));
        assert!(matches!(
            project.integrity_issues().as_slice(),
            [IntegrityIssue::MultipleRootBoards(ids)] if ids.len() == 2
        ));
    }

    #[test]
    fn test_validate_checks_board_keys() {
        let mut project = Project::new("Story");
        let id = project.add_board(Board::new("Main", true));
        assert!(project.validate().is_ok());

        let board = project.boards.remove(&id).unwrap();
        project.boards.insert(BoardId::new(), board);
        let err = project.validate().unwrap_err();
        assert!(matches!(err, NarrativeError::InconsistentId { kind: "board", .. }));
    }

    #[test]
    fn test_starting_element_is_not_validated() {
        let mut project = Project::new("Story");
        let ghost = ElementId::new();
        project.set_starting_element(ghost);
        assert_eq!(project.starting_element(), Some(ghost));
        assert_eq!(
            project.integrity_issues(),
            vec![IntegrityIssue::MissingStartingElement(ghost)]
        );
    }

    #[test]
    fn test_find_element_across_boards() {
        let mut project = Project::new("Story");
        let mut board = Board::new("Side", false);
        let element = Element::new("Clue", "");
        let element_id = element.id();
        board.add_element(element).unwrap();
        let board_id = project.add_board(board);

        let (found_board, found) = project.find_element(element_id).unwrap();
        assert_eq!(found_board, board_id);
        assert_eq!(found.title(), "Clue");
    }

    #[test]
    fn test_components_and_variables() {
        let mut project = Project::new("Story");
        let component_id = project.add_component(Component::new("Inventory"));
        assert_eq!(project.get_component(component_id).unwrap().name, "Inventory");

        assert!(project.set_variable(Variable::new("gold", 10)).is_none());
        let previous = project.set_variable(Variable::new("gold", 25)).unwrap();
        assert_eq!(previous.value, 10);
        assert_eq!(project.get_variable("gold").unwrap().value, 25);
        assert!(project.remove_variable("gold").is_some());
    }

    #[test]
    fn test_serde_skips_save_path() {
        let mut project = Project::new("Story");
        project.add_board(Board::new("Main", true));
        project.set_save_path(Some(PathBuf::from("story.ntp")));

        let json = serde_json::to_string(&project).unwrap();
        let restored: Project = serde_json::from_str(&json).unwrap();
        assert!(restored.save_path().is_none());
        assert_eq!(restored.board_count(), 1);
        assert_eq!(restored.id(), project.id());
    }
}
