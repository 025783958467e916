//! Error types.
//!
//! Only configuration problems and misuse of the schedule grid are
//! errors. Placement failures during search are expected outcomes and are
//! reported through [`FailureAnalysis`](crate::report::FailureAnalysis).

use thiserror::Error;

use crate::models::TimeSlot;
use crate::validation::ValidationError;

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that stop a generation call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The input bundle failed the feasibility pass.
    #[error("invalid timetable input: {} problem(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),

    /// A grid operation failed.
    #[error(transparent)]
    Cell(#[from] CellError),
}

/// Errors from mutating the schedule grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    /// The class is not part of the grid.
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// The slot lies outside the class's weekly layout.
    #[error("slot {slot} is outside the layout of class '{class_id}'")]
    OutOfBounds { class_id: String, slot: TimeSlot },

    /// The cell already holds a lesson.
    #[error("cell {slot} of class '{class_id}' is already occupied")]
    Occupied { class_id: String, slot: TimeSlot },

    /// The cell holds a fixed lesson.
    #[error("cell {slot} of class '{class_id}' holds a fixed lesson")]
    Immutable { class_id: String, slot: TimeSlot },

    /// The cell is empty.
    #[error("cell {slot} of class '{class_id}' is empty")]
    Empty { class_id: String, slot: TimeSlot },
}
