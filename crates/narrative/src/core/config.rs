//! Session configuration
//!
//! Settings that shape an editing session: how much undo history is kept and
//! what a freshly created project looks like.

use tracing::warn;

/// Environment variable overriding [`SessionConfig::history_limit`]
pub const HISTORY_LIMIT_ENV: &str = "NARRATIVE_HISTORY_LIMIT";

/// Configuration for a [`Session`](crate::session::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of undo steps kept; `None` keeps the whole history
    pub history_limit: Option<usize>,
    /// Name given to projects created with [`Session::new_project`](crate::session::Session::new_project)
    pub project_name: String,
    /// Name of the root board created alongside a new project
    pub root_board_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            project_name: "New Project".to_string(),
            root_board_name: "Main Board".to_string(),
        }
    }
}

impl SessionConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with overrides read from the environment
    ///
    /// An unparsable `NARRATIVE_HISTORY_LIMIT` is ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(HISTORY_LIMIT_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.history_limit = Some(limit),
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", HISTORY_LIMIT_ENV),
            }
        }
        config
    }

    /// Set the history limit
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Set the name used for new projects
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }
}
