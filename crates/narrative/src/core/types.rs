//! Core type definitions for the board model
//!
//! This module contains the small value types shared by every entity:
//! identifiers, positions, sizes, connection styles and timestamp helpers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::NarrativeError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Project`](crate::model::Project)
    ProjectId
);
entity_id!(
    /// Identifier of a [`Board`](crate::model::Board)
    BoardId
);
entity_id!(
    /// Identifier of an [`Element`](crate::model::Element)
    ElementId
);
entity_id!(
    /// Identifier of a [`Connection`](crate::model::Connection)
    ConnectionId
);
entity_id!(
    /// Identifier of a [`Component`](crate::model::Component)
    ComponentId
);

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Position of an element on its board
///
/// Coordinates built through [`Position::new`] are always finite: NaN and
/// infinities become zero, since JSON cannot represent them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position, replacing non-finite coordinates with zero
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
        }
    }

    /// Copy of this position with non-finite coordinates replaced by zero
    pub fn sanitized(self) -> Self {
        Self::new(self.x, self.y)
    }

    /// Return this position shifted by the given deltas
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Size of an element
///
/// Both dimensions are kept finite and non-negative: negative, NaN and
/// infinite input is clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SizeRepr")]
pub struct Size {
    width: f64,
    height: f64,
}

#[derive(Deserialize)]
struct SizeRepr {
    width: f64,
    height: f64,
}

impl From<SizeRepr> for Size {
    fn from(repr: SizeRepr) -> Self {
        Size::new(repr.width, repr.height)
    }
}

impl Size {
    /// Default element width
    pub const DEFAULT_WIDTH: f64 = 200.0;
    /// Default element height
    pub const DEFAULT_HEIGHT: f64 = 150.0;

    /// Create a new size, clamping both dimensions to be finite and non-negative
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Drawing style of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Curved connector (default)
    #[default]
    Bezier,
    /// Straight line between the two elements
    Straight,
    /// Orthogonal flowchart-style connector
    Flowchart,
}

impl ConnectionType {
    /// Get all valid type names
    pub fn variants() -> &'static [&'static str] {
        &["bezier", "straight", "flowchart"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Bezier => "bezier",
            ConnectionType::Straight => "straight",
            ConnectionType::Flowchart => "flowchart",
        }
    }
}

impl FromStr for ConnectionType {
    type Err = NarrativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bezier" => Ok(ConnectionType::Bezier),
            "straight" => Ok(ConnectionType::Straight),
            "flowchart" => Ok(ConnectionType::Flowchart),
            _ => Err(NarrativeError::UnknownConnectionType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme tag given to new elements and connections
pub const DEFAULT_THEME: &str = "default";

pub(crate) fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

/// Current time as stored on entities
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as ISO-8601
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

/// Parse an ISO-8601 timestamp
///
/// Accepts RFC 3339 strings with an offset as well as naive
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` strings, which are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
