//! Connections: directed edges between two elements of the same board

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::{default_theme, now, ConnectionId, ConnectionType, ElementId};

/// A directed link from a source element to a target element
///
/// Endpoints are element identifiers, not owning references. The owning
/// [`Board`](super::Board) guarantees both endpoints exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    source_id: ElementId,
    target_id: ElementId,
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    connection_type: ConnectionType,
    #[serde(default = "default_theme")]
    theme: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl Connection {
    /// Create a new unlabeled bezier connection
    pub fn new(source_id: ElementId, target_id: ElementId) -> Self {
        let timestamp = now();
        Self {
            id: ConnectionId::new(),
            source_id,
            target_id,
            label: String::new(),
            connection_type: ConnectionType::default(),
            theme: default_theme(),
            created_at: timestamp,
            modified_at: timestamp,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source_id(&self) -> ElementId {
        self.source_id
    }

    pub fn target_id(&self) -> ElementId {
        self.target_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Check whether this connection starts or ends at the given element
    pub fn touches(&self, element_id: ElementId) -> bool {
        self.source_id == element_id || self.target_id == element_id
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.modified_at = now();
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
        self.modified_at = now();
    }

    pub fn set_connection_type(&mut self, connection_type: ConnectionType) {
        self.connection_type = connection_type;
        self.modified_at = now();
    }

    /// Set the connection type by name
    ///
    /// Unknown names leave the connection unchanged and return false.
    pub fn set_type(&mut self, name: &str) -> bool {
        match name.parse::<ConnectionType>() {
            Ok(connection_type) => {
                self.set_connection_type(connection_type);
                trace!(connection_id = %self.id, connection_type = %connection_type, "Connection type set");
                true
            }
            Err(_) => {
                warn!(connection_id = %self.id, value = %name, "Rejected unknown connection type");
                false
            }
        }
    }
}
