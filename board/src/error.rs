use thiserror::Error;

use crate::piece::PieceKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid board state: {0}")]
    InvalidBoardState(String),
}

impl BoardError {
    pub(crate) fn cardinality(kind: PieceKind, expected: usize, actual: usize) -> Self {
        Self::InvalidBoardState(format!(
            "expected {} {:?} pieces, found {}",
            expected, kind, actual
        ))
    }

    pub(crate) fn slot(kind: PieceKind, slot: usize) -> Self {
        Self::InvalidBoardState(format!(
            "{:?} slot {} out of range (max {})",
            kind,
            slot,
            kind.slots() - 1
        ))
    }
}
