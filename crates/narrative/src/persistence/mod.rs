//! Reading and writing projects
//!
//! - [`ntp`]: the `.ntp` project file format
//! - [`snapshot`]: lossless JSON snapshots of a whole project

pub mod ntp;
pub mod snapshot;

pub use ntp::{from_ntp_str, load_project, save_project, to_ntp_string, PROJECT_EXTENSION};
