//! Editing session: the application state a UI drives
//!
//! A [`Session`] owns the open [`Project`], its undo/redo history and the
//! currently selected board. User interfaces subscribe to [`ChangeEvent`]s to
//! know when to refresh their views instead of being called back from the
//! model.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::commands::{Command, CommandStack};
use crate::core::{BoardId, NarrativeError, Result, SessionConfig};
use crate::model::{Board, Project};
use crate::persistence::{load_project, save_project};

/// Structural change notifications emitted by a [`Session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A different project was created or opened
    ProjectReplaced,
    /// Boards were added to or removed from the project
    BoardsChanged,
    /// The selected board changed
    CurrentBoardChanged(Option<BoardId>),
    /// Elements or connections on a board changed through a command
    BoardContentChanged(BoardId),
    /// The project was written to disk
    Saved(PathBuf),
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

/// Application state for one open project
pub struct Session {
    project: Project,
    history: CommandStack,
    current_board: Option<BoardId>,
    config: SessionConfig,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("project", &self.project.name())
            .field("current_board", &self.current_board)
            .field("undo_len", &self.history.undo_len())
            .field("redo_len", &self.history.redo_len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Start a session on a fresh project with one root board selected
    pub fn new(config: SessionConfig) -> Self {
        let (project, root) = Self::fresh_project(&config);
        let history = Self::history_for(&config);
        Self {
            project,
            history,
            current_board: Some(root),
            config,
            listeners: Vec::new(),
        }
    }

    /// Start a session on an existing project, selecting its root board
    pub fn with_project(project: Project, config: SessionConfig) -> Self {
        let current_board = Self::entry_board(&project);
        let history = Self::history_for(&config);
        Self {
            project,
            history,
            current_board,
            config,
            listeners: Vec::new(),
        }
    }

    fn fresh_project(config: &SessionConfig) -> (Project, BoardId) {
        let mut project = Project::new(config.project_name.clone());
        let root = project.add_board(Board::new(config.root_board_name.clone(), true));
        (project, root)
    }

    fn history_for(config: &SessionConfig) -> CommandStack {
        match config.history_limit {
            Some(limit) => CommandStack::with_limit(limit),
            None => CommandStack::new(),
        }
    }

    fn entry_board(project: &Project) -> Option<BoardId> {
        project
            .root_board()
            .or_else(|| project.boards().min_by_key(|b| (b.created_at(), b.id())))
            .map(|b| b.id())
    }

    /// Register a listener for change events
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: ChangeEvent) {
        debug!(event = ?event, listeners = self.listeners.len(), "Notifying listeners");
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Direct access to the project, bypassing the history
    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn current_board_id(&self) -> Option<BoardId> {
        self.current_board
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.current_board.and_then(|id| self.project.get_board(id))
    }

    /// Select the board whose elements the UI shows
    pub fn switch_board(&mut self, board_id: BoardId) -> Result<()> {
        if self.project.get_board(board_id).is_none() {
            return Err(NarrativeError::board_not_found(board_id));
        }
        if self.current_board != Some(board_id) {
            self.current_board = Some(board_id);
            self.notify(ChangeEvent::CurrentBoardChanged(Some(board_id)));
        }
        Ok(())
    }

    /// Add a board to the project
    pub fn add_board(&mut self, board: Board) -> BoardId {
        let id = self.project.add_board(board);
        self.notify(ChangeEvent::BoardsChanged);
        id
    }

    /// Remove a board; removing the selected board clears the selection
    pub fn remove_board(&mut self, board_id: BoardId) -> Option<Board> {
        let removed = self.project.remove_board(board_id)?;
        self.notify(ChangeEvent::BoardsChanged);
        if self.current_board == Some(board_id) {
            self.current_board = None;
            self.notify(ChangeEvent::CurrentBoardChanged(None));
        }
        Some(removed)
    }

    /// Execute a command and record it in the history
    pub fn execute<C>(&mut self, command: C) -> Result<()>
    where
        C: Command + 'static,
    {
        let board_id = command.board_id();
        self.history.execute(command, &mut self.project)?;
        self.notify(ChangeEvent::BoardContentChanged(board_id));
        Ok(())
    }

    /// Undo the last command; returns false if there was nothing to undo
    pub fn undo(&mut self) -> Result<bool> {
        let board_id = self.history_top_board(true);
        let undone = self.history.undo(&mut self.project)?;
        if let (true, Some(board_id)) = (undone, board_id) {
            self.notify(ChangeEvent::BoardContentChanged(board_id));
        }
        Ok(undone)
    }

    /// Redo the last undone command; returns false if there was nothing to redo
    pub fn redo(&mut self) -> Result<bool> {
        let board_id = self.history_top_board(false);
        let redone = self.history.redo(&mut self.project)?;
        if let (true, Some(board_id)) = (redone, board_id) {
            self.notify(ChangeEvent::BoardContentChanged(board_id));
        }
        Ok(redone)
    }

    fn history_top_board(&self, undo: bool) -> Option<BoardId> {
        if undo {
            self.history.peek_undo().map(|c| c.board_id())
        } else {
            self.history.peek_redo().map(|c| c.board_id())
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the project with a fresh one and reset the history
    pub fn new_project(&mut self, name: impl Into<String>) -> BoardId {
        let mut config = self.config.clone();
        config.project_name = name.into();
        let (project, root) = Self::fresh_project(&config);
        self.replace_project(project, Some(root));
        info!(project = %self.project.name(), "Created new project");
        root
    }

    /// Open a project file, replacing the current project and history
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let project = load_project(path)?;
        let entry = Self::entry_board(&project);
        self.replace_project(project, entry);
        Ok(())
    }

    fn replace_project(&mut self, project: Project, current_board: Option<BoardId>) {
        self.project = project;
        self.history.clear();
        self.current_board = current_board;
        self.notify(ChangeEvent::ProjectReplaced);
        self.notify(ChangeEvent::CurrentBoardChanged(current_board));
    }

    /// Save to the project's save path
    ///
    /// Fails with [`NarrativeError::NoSavePath`] for a project that was never
    /// saved; use [`save_as`](Self::save_as) for those.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self
            .project
            .save_path()
            .map(Path::to_path_buf)
            .ok_or(NarrativeError::NoSavePath)?;
        save_project(&self.project, &path)?;
        self.notify(ChangeEvent::Saved(path.clone()));
        Ok(path)
    }

    /// Save to a new path and remember it for later saves
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<PathBuf> {
        let path = path.into();
        save_project(&self.project, &path)?;
        self.project.set_save_path(Some(path.clone()));
        self.notify(ChangeEvent::Saved(path.clone()));
        Ok(path)
    }
}
