use crate::error::BoardError;
use crate::piece::{Piece, PieceKind, Side, Square, BOARD_SIZE};

// Back rank columns per kind, left to right.
const BACK_RANK: [(PieceKind, &[u8]); 5] = [
    (PieceKind::King, &[4]),
    (PieceKind::Queen, &[3]),
    (PieceKind::Rook, &[0, 7]),
    (PieceKind::Bishop, &[2, 5]),
    (PieceKind::Knight, &[1, 6]),
];

/// Board state: one ordered list of pieces per kind.
///
/// The slot order inside each list never changes. The encoder relies on it,
/// so a slot always maps to the same feature offset regardless of what
/// happens to the piece in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: [Vec<Piece>; PieceKind::NUM],
}

impl Board {
    /// Standard starting array. White occupies rows 0 and 1, Black rows 7 and 6.
    /// Within each kind, White's pieces take the first slots.
    pub fn initial() -> Self {
        let mut pieces: [Vec<Piece>; PieceKind::NUM] = Default::default();

        for side in Side::ALL {
            let (back, front) = match side {
                Side::White => (0, 1),
                Side::Black => (BOARD_SIZE - 1, BOARD_SIZE - 2),
            };

            for (kind, cols) in BACK_RANK {
                for &col in cols {
                    pieces[kind.index()].push(Piece::new(
                        kind,
                        side,
                        Square::new_unchecked(back, col),
                    ));
                }
            }

            for col in 0..BOARD_SIZE {
                pieces[PieceKind::Pawn.index()].push(Piece::new(
                    PieceKind::Pawn,
                    side,
                    Square::new_unchecked(front, col),
                ));
            }
        }

        Self { pieces }
    }

    /// Builds a board from a flat list of pieces, keeping the relative order of
    /// pieces of the same kind as their slot order.
    pub fn from_pieces(list: Vec<Piece>) -> Result<Self, BoardError> {
        let mut pieces: [Vec<Piece>; PieceKind::NUM] = Default::default();
        for piece in list {
            pieces[piece.kind.index()].push(piece);
        }

        let board = Self { pieces };
        board.validate()?;
        Ok(board)
    }

    /// Checks the per-kind cardinalities and that every piece sits in the
    /// list of its own kind.
    pub fn validate(&self) -> Result<(), BoardError> {
        for kind in PieceKind::ALL {
            let list = &self.pieces[kind.index()];
            if list.len() != kind.slots() {
                return Err(BoardError::cardinality(kind, kind.slots(), list.len()));
            }
            if let Some(stray) = list.iter().find(|p| p.kind != kind) {
                return Err(BoardError::InvalidBoardState(format!(
                    "{:?} piece stored among {:?} slots",
                    stray.kind, kind
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> &[Piece] {
        &self.pieces[kind.index()]
    }

    pub fn piece(&self, kind: PieceKind, slot: usize) -> Result<&Piece, BoardError> {
        self.pieces[kind.index()]
            .get(slot)
            .ok_or_else(|| BoardError::slot(kind, slot))
    }

    pub fn piece_mut(&mut self, kind: PieceKind, slot: usize) -> Result<&mut Piece, BoardError> {
        self.pieces[kind.index()]
            .get_mut(slot)
            .ok_or_else(|| BoardError::slot(kind, slot))
    }

    /// All pieces in encoding order (kind, then slot).
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().flatten()
    }

    /// The living piece standing on `square`, as `(kind, slot)`.
    pub fn piece_at(&self, square: Square) -> Option<(PieceKind, usize)> {
        PieceKind::ALL.iter().find_map(|&kind| {
            self.pieces(kind)
                .iter()
                .position(|p| p.alive && p.square == square)
                .map(|slot| (kind, slot))
        })
    }

    /// Marks a piece as captured. It keeps its last square.
    pub fn capture(&mut self, kind: PieceKind, slot: usize) -> Result<(), BoardError> {
        self.piece_mut(kind, slot)?.alive = false;
        Ok(())
    }

    pub fn relocate(
        &mut self,
        kind: PieceKind,
        slot: usize,
        square: Square,
    ) -> Result<(), BoardError> {
        self.piece_mut(kind, slot)?.square = square;
        Ok(())
    }

    pub fn set_cooldown(
        &mut self,
        kind: PieceKind,
        slot: usize,
        cooldown: u32,
    ) -> Result<(), BoardError> {
        self.piece_mut(kind, slot)?.cooldown = cooldown;
        Ok(())
    }

    pub fn alive_count(&self, kind: PieceKind, side: Side) -> usize {
        self.pieces(kind)
            .iter()
            .filter(|p| p.alive && p.side == side)
            .count()
    }

    pub fn material(&self, side: Side) -> u32 {
        self.iter()
            .filter(|p| p.side == side)
            .map(Piece::material)
            .sum()
    }

    /// White material minus Black material.
    pub fn material_balance(&self) -> i32 {
        self.material(Side::White) as i32 - self.material(Side::Black) as i32
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board_is_valid() {
        let board = Board::initial();
        assert!(board.validate().is_ok());
        assert_eq!(board.iter().count(), 32);
        assert_eq!(board.material(Side::White), 39);
        assert_eq!(board.material_balance(), 0);
    }

    #[test]
    fn test_initial_slot_order() {
        let board = Board::initial();

        let kings = board.pieces(PieceKind::King);
        assert_eq!(kings[0].side, Side::White);
        assert_eq!((kings[0].square.row(), kings[0].square.col()), (0, 4));
        assert_eq!(kings[1].side, Side::Black);
        assert_eq!((kings[1].square.row(), kings[1].square.col()), (7, 4));

        let rooks = board.pieces(PieceKind::Rook);
        let squares: Vec<_> = rooks
            .iter()
            .map(|p| (p.square.row(), p.square.col()))
            .collect();
        assert_eq!(squares, vec![(0, 0), (0, 7), (7, 0), (7, 7)]);

        let pawns = board.pieces(PieceKind::Pawn);
        assert!(pawns[..8].iter().all(|p| p.side == Side::White && p.square.row() == 1));
        assert!(pawns[8..].iter().all(|p| p.side == Side::Black && p.square.row() == 6));
    }

    #[test]
    fn test_from_pieces_rejects_wrong_cardinality() {
        let mut pieces: Vec<Piece> = Board::initial().iter().copied().collect();
        pieces.pop();

        let err = Board::from_pieces(pieces).unwrap_err();
        assert!(matches!(err, BoardError::InvalidBoardState(_)));
    }

    #[test]
    fn test_from_pieces_round_trip() {
        let board = Board::initial();
        let rebuilt = Board::from_pieces(board.iter().copied().collect()).unwrap();
        assert_eq!(board, rebuilt);
    }

    #[test]
    fn test_capture_keeps_square() {
        let mut board = Board::initial();
        board.capture(PieceKind::Queen, 1).unwrap();

        let queen = board.piece(PieceKind::Queen, 1).unwrap();
        assert!(!queen.alive);
        assert_eq!((queen.square.row(), queen.square.col()), (7, 3));
        assert_eq!(board.alive_count(PieceKind::Queen, Side::Black), 0);
        assert_eq!(board.material_balance(), 9);
    }

    #[test]
    fn test_piece_at_ignores_dead_pieces() {
        let mut board = Board::initial();
        let e2 = Square::new(1, 4).unwrap();

        assert_eq!(board.piece_at(e2), Some((PieceKind::Pawn, 4)));
        assert_eq!(board.piece_at(Square::new(4, 4).unwrap()), None);

        board.capture(PieceKind::Pawn, 4).unwrap();
        assert_eq!(board.piece_at(e2), None);
    }

    #[test]
    fn test_mutators_reject_bad_slot() {
        let mut board = Board::initial();
        assert!(board.capture(PieceKind::King, 2).is_err());
        assert!(board.set_cooldown(PieceKind::Pawn, 16, 3).is_err());
        assert!(board
            .relocate(PieceKind::Rook, 4, Square::new(3, 3).unwrap())
            .is_err());
    }
}
