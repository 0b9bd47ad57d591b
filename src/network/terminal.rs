//! Terminals: the electrical nodes of the network.

use std::collections::HashSet;
use std::fmt;

/// A grid position.
///
/// Coordinates arrive grid-snapped from the placement layer, so structural
/// node identity is exact coordinate equality; the merge radius only governs
/// when two *distinct* positions collapse into one terminal at insertion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An electrical node owned by the network registry.
///
/// `adjacent` holds the ids of terminals recorded as electrically adjacent
/// (the far ends of parts attached here, plus merge partners). It is a
/// relation, not ownership; the registry prunes entries whose terminal has
/// been garbage-collected.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub id: String,
    pub position: Position,
    pub adjacent: HashSet<String>,
}

impl Terminal {
    /// Create an unconnected terminal at a grid position.
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            position: Position::new(x, y),
            adjacent: HashSet::new(),
        }
    }
}
