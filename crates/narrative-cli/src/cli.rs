//! Command-line interface for the narrative utility
//!
//! Provides a CLI to create, inspect, validate and export `.ntp` projects.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use narrative::core::logging::init_logging;
use narrative::model::{Board, Project};
use narrative::persistence::{snapshot, PROJECT_EXTENSION};
use narrative::session::Session;
use narrative::SessionConfig;

/// Narrative - manage story board projects
#[derive(Parser)]
#[command(name = "narrative")]
#[command(about = "Create, inspect, validate and export narrative board projects")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty project with a root board
    New {
        /// Project file to create (`.ntp` is appended when no extension is given)
        path: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Summarize the boards of a project
    Info {
        /// Project file to read
        path: PathBuf,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Load a project and check its structure
    Validate {
        /// Project file to validate
        path: PathBuf,
    },

    /// Write a lossless JSON snapshot of a project
    Export {
        /// Project file to read
        path: PathBuf,

        /// Output file for the snapshot (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Per-board line of the `info` summary
#[derive(Debug, Serialize)]
struct BoardSummary {
    id: String,
    name: String,
    root: bool,
    elements: usize,
    connections: usize,
}

impl BoardSummary {
    fn from_board(board: &Board) -> Self {
        Self {
            id: board.id().to_string(),
            name: board.name().to_string(),
            root: board.is_root(),
            elements: board.element_count(),
            connections: board.connection_count(),
        }
    }
}

/// The `info` summary of a whole project
#[derive(Debug, Serialize)]
struct ProjectSummary {
    id: String,
    name: String,
    boards: Vec<BoardSummary>,
    elements: usize,
    connections: usize,
}

impl ProjectSummary {
    fn from_project(project: &Project) -> Self {
        let mut boards: Vec<BoardSummary> =
            project.boards().map(BoardSummary::from_board).collect();
        // Root boards first, then by name; ids break ties.
        boards.sort_by(|a, b| {
            (!a.root, &a.name, &a.id).cmp(&(!b.root, &b.name, &b.id))
        });
        Self {
            id: project.id().to_string(),
            name: project.name().to_string(),
            elements: boards.iter().map(|b| b.elements).sum(),
            connections: boards.iter().map(|b| b.connections).sum(),
            boards,
        }
    }
}

/// Main CLI application
#[derive(Default)]
pub struct NarrativeApp {
    config: Option<SessionConfig>,
}

impl NarrativeApp {
    /// Create an application that reads its session config from the environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an application with a fixed session config
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    fn session_config(&self) -> SessionConfig {
        self.config.clone().unwrap_or_else(SessionConfig::from_env)
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("NARRATIVE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("NARRATIVE_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Narrative v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::New { path, name, force } => self.new_command(path, name, force, cli.verbose),
            Commands::Info { path, json } => self.info_command(&path, json, cli.verbose),
            Commands::Validate { path } => self.validate_command(&path, cli.verbose),
            Commands::Export { path, output } => self.export_command(&path, output, cli.verbose),
        }
    }

    /// Handle the new command
    fn new_command(
        &self,
        path: PathBuf,
        name: Option<String>,
        force: bool,
        verbose: bool,
    ) -> Result<()> {
        let path = with_default_extension(path);
        if path.exists() && !force {
            return Err(anyhow!(
                "'{}' already exists (use --force to overwrite)",
                path.display()
            ));
        }

        let mut config = self.session_config();
        if let Some(name) = name {
            config = config.with_project_name(name);
        }
        let mut session = Session::new(config);
        session
            .save_as(&path)
            .with_context(|| format!("Failed to create project '{}'", path.display()))?;

        if verbose {
            eprintln!("Root board: {}", session.config().root_board_name);
        }
        println!(
            "Created project '{}' at {}",
            session.project().name(),
            path.display()
        );
        Ok(())
    }

    /// Handle the info command
    fn info_command(&self, path: &Path, json: bool, verbose: bool) -> Result<()> {
        let project = load(path)?;
        let summary = ProjectSummary::from_project(&project);

        if verbose {
            eprintln!("Loaded {} board(s) from {}", summary.boards.len(), path.display());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("Project: {} ({})", summary.name, summary.id);
        println!("Boards: {}", summary.boards.len());
        for board in &summary.boards {
            let marker = if board.root { "*" } else { "-" };
            println!(
                "  {} {}: {} element(s), {} connection(s)",
                marker, board.name, board.elements, board.connections
            );
        }
        println!(
            "Total: {} element(s), {} connection(s)",
            summary.elements, summary.connections
        );
        Ok(())
    }

    /// Handle the validate command
    fn validate_command(&self, path: &Path, verbose: bool) -> Result<()> {
        let project = match narrative::load(path) {
            Ok(project) => project,
            Err(e) => {
                println!("✗ Invalid project: {}", e);
                return Err(e.into());
            }
        };

        if verbose {
            eprintln!("Checking {} board(s)", project.board_count());
        }

        let issues = project.integrity_issues();
        if issues.is_empty() {
            println!(
                "✓ Valid project '{}' ({} board(s))",
                project.name(),
                project.board_count()
            );
            return Ok(());
        }

        for issue in &issues {
            println!("✗ {}", issue);
        }
        Err(anyhow!("{} integrity issue(s) found", issues.len()))
    }

    /// Handle the export command
    fn export_command(&self, path: &Path, output: Option<PathBuf>, verbose: bool) -> Result<()> {
        let project = load(path)?;

        match output {
            Some(out) if out.to_string_lossy() != "-" => {
                snapshot::save_snapshot(&project, &out)
                    .with_context(|| format!("Failed to write snapshot '{}'", out.display()))?;
                if verbose {
                    eprintln!("Wrote snapshot to {}", out.display());
                }
            }
            _ => {
                let text = snapshot::to_json(&project)?;
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", text)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

fn load(path: &Path) -> Result<Project> {
    narrative::load(path).with_context(|| format!("Failed to load project '{}'", path.display()))
}

fn with_default_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(PROJECT_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use narrative::model::Element;
    use tempfile::tempdir;

    fn quiet_app() -> NarrativeApp {
        NarrativeApp::with_config(SessionConfig::default())
    }

    #[test]
    fn test_cli_parsing_new_command() {
        let args = vec!["narrative", "new", "story.ntp", "--name", "Saga"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::New { path, name, force } => {
                assert_eq!(path.to_string_lossy(), "story.ntp");
                assert_eq!(name.as_deref(), Some("Saga"));
                assert!(!force);
            }
            _ => panic!("Expected New command"),
        }
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_cli_parsing_info_command() {
        let args = vec!["narrative", "info", "story.ntp", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Info { path, json } => {
                assert_eq!(path.to_string_lossy(), "story.ntp");
                assert!(json);
            }
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_cli_parsing_export_command() {
        let args = vec!["narrative", "export", "story.ntp", "-o", "-"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Export { output, .. } => {
                assert_eq!(output.unwrap().to_string_lossy(), "-");
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(Cli::try_parse_from(vec!["narrative", "validate"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let args = vec!["narrative", "--verbose", "validate", "story.ntp"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(
            with_default_extension(PathBuf::from("story")),
            PathBuf::from("story.ntp")
        );
        assert_eq!(
            with_default_extension(PathBuf::from("story.json")),
            PathBuf::from("story.json")
        );
    }

    #[test]
    fn test_new_command_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("story.ntp");
        let app = quiet_app();

        app.new_command(path.clone(), Some("Saga".into()), false, false)
            .unwrap();
        assert!(app.new_command(path.clone(), None, false, false).is_err());
        app.new_command(path.clone(), None, true, false).unwrap();

        let project = narrative::load(&path).unwrap();
        assert_eq!(project.name(), "New Project");
        assert!(project.root_board().is_some());
    }

    #[test]
    fn test_summary_orders_root_first() {
        let mut project = Project::new("Story");
        project.add_board(Board::new("Appendix", false));
        let main = project.add_board(Board::new("Main", true));
        project
            .get_board_mut(main)
            .unwrap()
            .add_element(Element::new("A", ""))
            .unwrap();

        let summary = ProjectSummary::from_project(&project);
        assert_eq!(summary.boards[0].name, "Main");
        assert_eq!(summary.boards[1].name, "Appendix");
        assert_eq!(summary.elements, 1);
        assert_eq!(summary.connections, 0);
    }

    #[test]
    fn test_validate_command_reports_missing_root() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rootless.ntp");
        let mut project = Project::new("Rootless");
        project.add_board(Board::new("Side", false));
        narrative::save(&project, &path).unwrap();

        assert!(quiet_app().validate_command(&path, false).is_err());
    }
}
