//! Error types for Canopy Core

use thiserror::Error;

use crate::limits::ValidationError;

/// Result type alias using Canopy's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Canopy error types
///
/// These are fatal: they abort an evaluation or reconciliation before anything
/// is written. Recoverable per-item problems are reported as warnings on the
/// operation's result instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Duplicate element: {0}")]
    DuplicateElement(String),

    #[error("Consolidation {parent} -> {child} would create a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("Unknown propagation rule: {0}")]
    UnknownPropagation(String),

    #[error("Unknown load semantic: {0}")]
    UnknownLoadSemantic(String),

    #[error("Unknown consolidation mode: {0}")]
    UnknownConsolidationMode(String),

    #[error("Dimension {0} has no root elements to scope unique-root consolidations")]
    NoDistinguishableRoots(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
