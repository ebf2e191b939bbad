//! Elements: the nodes placed on a board

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{default_theme, now, ComponentId, ElementId, Position, Size};

/// Offset applied to the position of a duplicated element
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// A node on a board with a title, a content body, a position and a size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    title: String,
    content: String,
    #[serde(default = "default_theme")]
    theme: String,
    #[serde(default)]
    components: Vec<ComponentId>,
    position: Position,
    size: Size,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) modified_at: DateTime<Utc>,
}

impl Default for Element {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl Element {
    /// Create a new element at the origin with the default size
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let timestamp = now();
        Self {
            id: ElementId::new(),
            title: title.into(),
            content: content.into(),
            theme: default_theme(),
            components: Vec::new(),
            position: Position::default(),
            size: Size::default(),
            created_at: timestamp,
            modified_at: timestamp,
        }
    }

    /// Builder-style position setter for freshly created elements
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Attached component identifiers in attachment order
    pub fn components(&self) -> &[ComponentId] {
        &self.components
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

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
        self.touch();
    }

    /// Update title and/or content in one step; `None` leaves a field as is
    pub fn update_content(&mut self, title: Option<&str>, content: Option<&str>) {
        if let Some(title) = title {
            self.title = title.to_string();
        }
        if let Some(content) = content {
            self.content = content.to_string();
        }
        self.touch();
        trace!(element_id = %self.id, "Element content updated");
    }

    /// Set the position; non-finite coordinates are stored as zero
    pub fn set_position(&mut self, position: Position) {
        self.position = position.sanitized();
        self.touch();
    }

    /// Move the element to the given coordinates
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.set_position(Position::new(x, y));
        trace!(element_id = %self.id, x, y, "Element moved");
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.touch();
    }

    /// Resize the element; negative dimensions are clamped to zero
    pub fn resize_to(&mut self, width: f64, height: f64) {
        self.set_size(Size::new(width, height));
        trace!(element_id = %self.id, width = self.size.width(), height = self.size.height(), "Element resized");
    }

    /// Attach a component. Returns false if it was already attached.
    pub fn add_component(&mut self, component_id: ComponentId) -> bool {
        if self.components.contains(&component_id) {
            return false;
        }
        self.components.push(component_id);
        self.touch();
        true
    }

    /// Detach a component. Returns false if it was not attached.
    pub fn remove_component(&mut self, component_id: ComponentId) -> bool {
        let before = self.components.len();
        self.components.retain(|id| *id != component_id);
        if self.components.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Create a copy with a new identity
    ///
    /// The copy is titled `"<title> (Copy)"` and placed 20 units right and
    /// below the original.
    pub fn duplicate(&self) -> Element {
        let mut copy = Element::new(format!("{} (Copy)", self.title), self.content.clone());
        copy.theme = self.theme.clone();
        copy.components = self.components.clone();
        copy.position = self.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        copy.size = self.size;
        copy
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element(id={}, title='{}')", self.id, self.title)
    }
}
