//! Core building blocks shared by the model, command and persistence layers
//!
//! Errors, identifiers and value types, session configuration and logging setup.

mod config;
mod error;
pub mod logging;
mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
