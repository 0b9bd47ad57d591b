//! # Sparklab Core
//!
//! Simulation engines for an educational electronics sandbox.
//!
//! This library provides the two engines behind a grid-based circuit
//! playground:
//! - An electrical network graph that merges spatially-coincident part
//!   terminals into shared electrical nodes and answers "does current
//!   flow?" by graph search
//! - A directed logic-gate graph with cycle-refusing connections and lazy,
//!   memoized boolean evaluation
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`parts`] - Typed electrical parts (wire, battery, bulb, switch,
//!   resistor)
//! - [`network`] - Terminal registry, part placement, and the closed-loop
//!   search
//! - [`gates`] - Gate registry, acyclic wiring, and boolean evaluation
//! - [`error`] - Unified error type
//!
//! ## Usage
//!
//! ```
//! use sparklab_core::{Endpoint, Network, Part, SimulateOutcome};
//!
//! let mut network = Network::new();
//! network.add_part(Part::battery(
//!     "bat",
//!     Endpoint::new("bat_start", 0.0, 0.0),
//!     Endpoint::new("bat_end", 100.0, 0.0),
//!     9.0,
//! ));
//! network.add_part(Part::wire(
//!     "w1",
//!     Endpoint::new("w1_start", 0.0, 0.0),
//!     Endpoint::new("w1_end", 100.0, 0.0),
//! ));
//! assert_eq!(network.simulate(), SimulateOutcome::Closed);
//! ```
//!
//! ```
//! use sparklab_core::{Circuit, Operation};
//!
//! let mut circuit = Circuit::new();
//! circuit.add_gate(Operation::Buffer, "in1").unwrap();
//! circuit.add_gate(Operation::Not, "not1").unwrap();
//! circuit.connect("in1", "not1");
//! assert!(circuit.output("not1"));
//! ```
//!
//! ## Simulation Model
//!
//! Both engines are topological. The network engine reports whether a
//! closed path of conducting parts spans the battery's terminals; no
//! currents or voltages are computed. The gate engine caches each gate's
//! output and invalidates the cache transitively on upstream mutation, so
//! evaluation order never matters. Everything is single-threaded and
//! synchronous, driven one call at a time by the placement layer.

pub mod error;
pub mod gates;
pub mod network;
pub mod parts;

// Re-export main types for convenience
pub use error::{Result, SparkError};
pub use gates::{Circuit, Gate, Operation};
pub use network::{Network, Position, SimulateOutcome, Terminal};
pub use parts::{Endpoint, Part, PartKind};

/// Default distance below which two inserted terminal positions are
/// treated as one electrical node.
pub const DEFAULT_MERGE_RADIUS: f64 = 25.0;
