//! Entity model: elements, connections, boards and projects
//!
//! Ownership runs one way: a [`Project`] owns its boards, a [`Board`] owns its
//! elements and connections, and a [`Connection`] refers to elements by id.

mod board;
mod connection;
mod element;
mod project;

pub use board::*;
pub use connection::*;
pub use element::*;
pub use project::*;
