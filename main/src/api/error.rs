use thiserror::Error;

pub type CellResult<T> = Result<T, CellError>;

#[derive(Debug, Error)]
pub enum CellError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),
}
