//! Logic-gate engine.
//!
//! The [`Circuit`] owns every [`Gate`] in a boolean operator graph wired by
//! id. Connections are refused rather than applied when they would close a
//! cycle, and outputs are evaluated lazily with transitive dirty
//! invalidation, so reads are cheap and always consistent with the last
//! mutation.

mod circuit;
mod gate;

pub use circuit::Circuit;
pub use gate::{Gate, Operation};
