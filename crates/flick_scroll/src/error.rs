//! Scroll error types

use thiserror::Error;

/// Errors surfaced by programmatic scroll control
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScrollError {
    /// No scroll position is attached to the controller
    #[error("no scroll position is attached")]
    NoPosition,

    /// More than one scroll position is attached; the operation is ambiguous
    #[error("multiple scroll positions are attached")]
    MultiplePositions,

    /// The target scroll position has been disposed
    #[error("the scroll position has been disposed")]
    Disposed,
}

/// Result type for scroll operations
pub type Result<T> = std::result::Result<T, ScrollError>;
