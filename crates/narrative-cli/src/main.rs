//! Narrative CLI - create, inspect, validate and export board projects

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();
    let app = cli::NarrativeApp::new();

    // Logging is set up inside `run`, once CLI flags and environment are known.
    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
