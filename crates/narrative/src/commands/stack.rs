//! Undo/redo history

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::Command;
use crate::core::Result;
use crate::model::Project;

/// Linear undo/redo history of executed commands
///
/// Executing a new command clears the redo stack, so history never branches.
/// With a limit set, the oldest undo entries are dropped once it is exceeded.
#[derive(Debug, Default)]
pub struct CommandStack {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    limit: Option<usize>,
}

impl CommandStack {
    /// Create an unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` undo steps
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Execute a command and record it
    ///
    /// A failing command is not recorded and leaves the redo stack intact.
    pub fn execute<C>(&mut self, command: C, project: &mut Project) -> Result<()>
    where
        C: Command + 'static,
    {
        self.execute_boxed(Box::new(command), project)
    }

    /// Execute an already boxed command and record it
    pub fn execute_boxed(&mut self, mut command: Box<dyn Command>, project: &mut Project) -> Result<()> {
        command.execute(project)?;
        debug!(command = %command.description(), "Executed command");
        self.undo_stack.push_back(command);
        self.redo_stack.clear();
        self.enforce_limit();
        Ok(())
    }

    /// Undo the most recent command
    ///
    /// Returns `Ok(false)` when there is nothing to undo. A command whose undo
    /// fails is dropped from the history and the error is returned.
    pub fn undo(&mut self, project: &mut Project) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = command.undo(project) {
            warn!(command = %command.description(), error = %err, "Undo failed, dropping command");
            return Err(err);
        }
        debug!(command = %command.description(), "Undid command");
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Redo the most recently undone command
    ///
    /// Returns `Ok(false)` when there is nothing to redo. A command whose
    /// execute fails is dropped from the history and the error is returned.
    pub fn redo(&mut self, project: &mut Project) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.execute(project) {
            warn!(command = %command.description(), error = %err, "Redo failed, dropping command");
            return Err(err);
        }
        debug!(command = %command.description(), "Redid command");
        self.undo_stack.push_back(command);
        self.enforce_limit();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// The command the next undo would revert
    pub fn peek_undo(&self) -> Option<&dyn Command> {
        self.undo_stack.back().map(|c| &**c)
    }

    /// The command the next redo would apply
    pub fn peek_redo(&self) -> Option<&dyn Command> {
        self.redo_stack.last().map(|c| &**c)
    }

    /// Description of the command the next undo would revert
    pub fn undo_description(&self) -> Option<String> {
        self.peek_undo().map(|c| c.description())
    }

    /// Description of the command the next redo would apply
    pub fn redo_description(&self) -> Option<String> {
        self.peek_redo().map(|c| c.description())
    }

    /// Forget all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
    }
}
