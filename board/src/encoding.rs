use crate::board::Board;
use crate::error::BoardError;
use crate::piece::{Piece, PieceKind, Side};

// Feature Layout (138 total):
//
// Pieces [0-127] - one 4-wide slice per slot:
//   [alive, row, col, cooldown]
//
//   [K0][K1][Q0][Q1][R0..R3][B0..B3][N0..N3][P0 ........ P15]
//   └ 8 ┘   └ 8 ┘   └─ 16 ┘ └─ 16 ┘ └─ 16 ┘ └───── 64 ─────┘
//
// Material [128-137] - alive counts per non-king kind:
//   [Q: W, B][R: W, B][B: W, B][N: W, B][P: W, B]
//
// Values are raw board units (coordinates 0-7, cooldown as-is).

const FEATURES_PER_PIECE: usize = 4;
const NUM_SLOTS: usize = 32;

pub const NUM_PIECE_FEATURES: usize = NUM_SLOTS * FEATURES_PER_PIECE; // 128
const NUM_MATERIAL_FEATURES: usize = (PieceKind::NUM - 1) * 2; // 10

pub const NUM_FEATURES: usize = NUM_PIECE_FEATURES + NUM_MATERIAL_FEATURES; // 138

const MATERIAL_START: usize = NUM_PIECE_FEATURES;

const _: () = assert!(NUM_SLOTS == 2 + 2 + 4 + 4 + 4 + 16);
const _: () = assert!(NUM_FEATURES == 138);

/// Offset of the slice belonging to `(kind, slot)`.
pub fn feature_offset(kind: PieceKind, slot: usize) -> Result<usize, BoardError> {
    if slot >= kind.slots() {
        return Err(BoardError::slot(kind, slot));
    }
    let preceding: usize = PieceKind::ALL[..kind.index()]
        .iter()
        .map(|k| k.slots())
        .sum();
    Ok((preceding + slot) * FEATURES_PER_PIECE)
}

/// Encodes the board into the full feature vector (pieces + material counts).
pub fn encode_board(board: &Board) -> Result<[f32; NUM_FEATURES], BoardError> {
    board.validate()?;

    let mut features = [0f32; NUM_FEATURES];
    write_pieces(board, &mut features[..NUM_PIECE_FEATURES]);

    let mut offset = MATERIAL_START;
    for kind in &PieceKind::ALL[1..] {
        for side in Side::ALL {
            features[offset] = board.alive_count(*kind, side) as f32;
            offset += 1;
        }
    }

    Ok(features)
}

/// Encodes only the per-piece slices, without the material summary.
pub fn encode_pieces(board: &Board) -> Result<[f32; NUM_PIECE_FEATURES], BoardError> {
    board.validate()?;

    let mut features = [0f32; NUM_PIECE_FEATURES];
    write_pieces(board, &mut features);
    Ok(features)
}

fn write_pieces(board: &Board, out: &mut [f32]) {
    for (slice, piece) in out.chunks_exact_mut(FEATURES_PER_PIECE).zip(board.iter()) {
        write_piece(piece, slice);
    }
}

#[inline]
fn write_piece(piece: &Piece, out: &mut [f32]) {
    out[0] = if piece.alive { 1.0 } else { 0.0 };
    out[1] = piece.square.row() as f32;
    out[2] = piece.square.col() as f32;
    out[3] = piece.cooldown as f32;
}
