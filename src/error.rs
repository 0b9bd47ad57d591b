//! Error types for the Sparklab simulation engines.
//!
//! This module provides a unified error type [`SparkError`] covering the
//! few hard failure conditions the engines can hit. Topology queries never
//! error: they answer `false`/empty on missing or malformed data, and
//! recoverable user actions (cycle-creating connections, occupied input
//! slots) are reported through boolean returns.

use thiserror::Error;

/// Result type alias using [`SparkError`].
pub type Result<T> = std::result::Result<T, SparkError>;

/// Unified error type for all Sparklab operations.
#[derive(Error, Debug)]
pub enum SparkError {
    // ============ Gate Construction Errors ============
    /// Unrecognized gate operation tag
    #[error("Unknown gate operation '{tag}'")]
    UnknownOperation { tag: String },

    /// Gate id already registered
    #[error("Duplicate gate id '{id}'")]
    DuplicateGate { id: String },
}

impl SparkError {
    /// Create an unknown-operation error
    pub fn unknown_operation(tag: impl Into<String>) -> Self {
        Self::UnknownOperation { tag: tag.into() }
    }

    /// Create a duplicate-gate error
    pub fn duplicate_gate(id: impl Into<String>) -> Self {
        Self::DuplicateGate { id: id.into() }
    }
}
