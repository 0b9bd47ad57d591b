//! Electrical parts placed on the workspace grid.
//!
//! A [`Part`] is a two-terminal element of the analog sandbox:
//! - Wire: plain conductor
//! - Battery: the power source whose terminals anchor the loop search
//! - Bulb: conductor with an on/off visual state driven by the caller
//! - Switch: conductor only while closed
//! - Resistor: conductor carrying an ohm rating
//!
//! Kind dispatch is a closed tag enum rather than a trait hierarchy; the
//! kind-specific state lives inline in the variant.

use crate::network::Position;

/// The kind of an electrical part, with its kind-specific state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartKind {
    Wire,
    Battery { voltage: f64 },
    Bulb { lit: bool },
    Switch { on: bool },
    Resistor { ohms: f64 },
}

impl PartKind {
    /// Short lowercase tag for display and logging.
    pub fn tag(&self) -> &'static str {
        match self {
            PartKind::Wire => "wire",
            PartKind::Battery { .. } => "battery",
            PartKind::Bulb { .. } => "bulb",
            PartKind::Switch { .. } => "switch",
            PartKind::Resistor { .. } => "resistor",
        }
    }
}

/// A part's handle on one of its electrical terminals: the canonical
/// terminal id plus a position snapshot the owning network keeps in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Canonical terminal id (after insertion into a network)
    pub terminal: String,
    /// Grid position of the terminal
    pub position: Position,
}

impl Endpoint {
    /// Create an endpoint at a grid position.
    pub fn new(terminal: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            terminal: terminal.into(),
            position: Position::new(x, y),
        }
    }
}

/// A typed electrical element between two terminals.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub id: String,
    pub kind: PartKind,
    pub start: Endpoint,
    pub end: Endpoint,
}

impl Part {
    /// Create a part of an arbitrary kind.
    pub fn new(id: impl Into<String>, kind: PartKind, start: Endpoint, end: Endpoint) -> Self {
        Self {
            id: id.into(),
            kind,
            start,
            end,
        }
    }

    /// Create a wire.
    pub fn wire(id: impl Into<String>, start: Endpoint, end: Endpoint) -> Self {
        Self::new(id, PartKind::Wire, start, end)
    }

    /// Create a battery with the given voltage rating.
    pub fn battery(id: impl Into<String>, start: Endpoint, end: Endpoint, voltage: f64) -> Self {
        Self::new(id, PartKind::Battery { voltage }, start, end)
    }

    /// Create a bulb. Bulbs start lit; the caller dims them after an open
    /// simulation verdict.
    pub fn bulb(id: impl Into<String>, start: Endpoint, end: Endpoint) -> Self {
        Self::new(id, PartKind::Bulb { lit: true }, start, end)
    }

    /// Create a switch in the given state.
    pub fn switch(id: impl Into<String>, start: Endpoint, end: Endpoint, on: bool) -> Self {
        Self::new(id, PartKind::Switch { on }, start, end)
    }

    /// Create a resistor with the given ohm rating.
    pub fn resistor(id: impl Into<String>, start: Endpoint, end: Endpoint, ohms: f64) -> Self {
        Self::new(id, PartKind::Resistor { ohms }, start, end)
    }

    /// Whether current can pass through this part.
    ///
    /// Switches conduct only while closed. Batteries never conduct: they are
    /// the loop's endpoints, not an intermediate edge.
    pub fn conducts(&self) -> bool {
        match self.kind {
            PartKind::Wire | PartKind::Bulb { .. } | PartKind::Resistor { .. } => true,
            PartKind::Switch { on } => on,
            PartKind::Battery { .. } => false,
        }
    }

    /// Whether either endpoint sits exactly at `position`.
    pub fn is_incident_to(&self, position: Position) -> bool {
        self.start.position == position || self.end.position == position
    }

    /// The endpoint position opposite to `position`, if incident.
    pub fn opposite_end(&self, position: Position) -> Option<Position> {
        if self.start.position == position {
            Some(self.end.position)
        } else if self.end.position == position {
            Some(self.start.position)
        } else {
            None
        }
    }

    /// Whether this part is a battery.
    pub fn is_battery(&self) -> bool {
        matches!(self.kind, PartKind::Battery { .. })
    }

    /// Whether this part is a bulb.
    pub fn is_bulb(&self) -> bool {
        matches!(self.kind, PartKind::Bulb { .. })
    }

    /// Whether this part is a switch.
    pub fn is_switch(&self) -> bool {
        matches!(self.kind, PartKind::Switch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends() -> (Endpoint, Endpoint) {
        (Endpoint::new("p_start", 0.0, 0.0), Endpoint::new("p_end", 50.0, 0.0))
    }

    #[test]
    fn test_conduction_by_kind() {
        let (s, e) = ends();
        assert!(Part::wire("w", s.clone(), e.clone()).conducts());
        assert!(Part::bulb("b", s.clone(), e.clone()).conducts());
        assert!(Part::resistor("r", s.clone(), e.clone(), 220.0).conducts());
        assert!(!Part::battery("bat", s.clone(), e.clone(), 9.0).conducts());
        assert!(!Part::switch("sw", s.clone(), e.clone(), false).conducts());
        assert!(Part::switch("sw", s, e, true).conducts());
    }

    #[test]
    fn test_opposite_end() {
        let (s, e) = ends();
        let wire = Part::wire("w", s, e);
        assert_eq!(
            wire.opposite_end(Position::new(0.0, 0.0)),
            Some(Position::new(50.0, 0.0))
        );
        assert_eq!(
            wire.opposite_end(Position::new(50.0, 0.0)),
            Some(Position::new(0.0, 0.0))
        );
        assert_eq!(wire.opposite_end(Position::new(25.0, 25.0)), None);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(PartKind::Wire.tag(), "wire");
        assert_eq!(PartKind::Switch { on: true }.tag(), "switch");
        assert_eq!(PartKind::Battery { voltage: 9.0 }.tag(), "battery");
    }
}
