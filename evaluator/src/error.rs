use board::BoardError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("failed to load parameters: {0}")]
    Deserialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EvalError {
    pub(crate) fn width(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            expected: format!("vector of width {}", expected),
            actual: format!("width {}", actual),
        }
    }
}
