//! Electrical network engine.
//!
//! The [`Network`] owns every terminal and part placed on the workspace.
//! Spatially-coincident part terminals merge into shared electrical nodes
//! at insertion, and [`Network::simulate`] answers whether a closed
//! conductive loop spans the battery's terminals. Topology only: no
//! currents or voltages are computed.

mod graph;
mod terminal;

pub use graph::{Network, SimulateOutcome};
pub use terminal::{Position, Terminal};
