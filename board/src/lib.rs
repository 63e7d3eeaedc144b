mod board;
pub mod encoding;
mod error;
mod piece;

pub use board::Board;
pub use encoding::{encode_board, encode_pieces, NUM_FEATURES, NUM_PIECE_FEATURES};
pub use error::BoardError;
pub use piece::{Piece, PieceKind, Side, Square, BOARD_SIZE};
