// error.rs - Error types for the grid model and the engine handle

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidDimensions { rows: usize, cols: usize },
    OutOfBounds { row: usize, col: usize, rows: usize, cols: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidDimensions { rows, cols } => {
                write!(f, "grid dimensions must be positive, got {rows}x{cols}")
            }
            GridError::OutOfBounds { row, col, rows, cols } => write!(
                f,
                "cell ({row}, {col}) is outside the {rows}x{cols} grid"
            ),
        }
    }
}

impl Error for GridError {}

/// Failures reported back through an `EngineHandle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The simulation refused the intent; its state is unchanged.
    Rejected(GridError),
    /// The engine loop has shut down.
    Closed,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Rejected(e) => write!(f, "intent rejected: {e}"),
            EngineError::Closed => write!(f, "simulation engine is no longer running"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Rejected(e) => Some(e),
            EngineError::Closed => None,
        }
    }
}

impl From<GridError> for EngineError {
    fn from(e: GridError) -> Self {
        EngineError::Rejected(e)
    }
}
