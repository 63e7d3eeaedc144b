use crate::error::BoardError;

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// All kinds in encoding order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    pub const NUM: usize = 6;

    /// Number of slots a well-formed board holds for this kind (both sides).
    pub const fn slots(self) -> usize {
        match self {
            PieceKind::King => 2,
            PieceKind::Queen => 2,
            PieceKind::Rook => 4,
            PieceKind::Bishop => 4,
            PieceKind::Knight => 4,
            PieceKind::Pawn => 16,
        }
    }

    pub const fn material(self) -> u32 {
        match self {
            PieceKind::King => 0,
            PieceKind::Queen => 9,
            PieceKind::Rook => 5,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 3,
            PieceKind::Pawn => 1,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    pub const fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Result<Self, BoardError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(BoardError::InvalidBoardState(format!(
                "square ({}, {}) is off the board",
                row, col
            )));
        }
        Ok(Self { row, col })
    }

    // Only for coordinates known to be on the board.
    pub(crate) const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    #[inline]
    pub fn row(&self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(&self) -> u8 {
        self.col
    }
}

/// A single piece. Pieces are never removed from a board, only marked dead,
/// so a dead piece keeps the square it was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
    pub alive: bool,
    pub cooldown: u32,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side, square: Square) -> Self {
        Self {
            kind,
            side,
            square,
            alive: true,
            cooldown: 0,
        }
    }

    /// Material value contributed while the piece is alive.
    pub fn material(&self) -> u32 {
        if self.alive {
            self.kind.material()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_rejects_off_board() {
        assert!(Square::new(7, 7).is_ok());
        assert!(matches!(
            Square::new(8, 0),
            Err(BoardError::InvalidBoardState(_))
        ));
        assert!(Square::new(0, 8).is_err());
    }

    #[test]
    fn test_slots_sum_to_full_army() {
        let total: usize = PieceKind::ALL.iter().map(|k| k.slots()).sum();
        assert_eq!(total, 32);
    }

    #[test]
    fn test_dead_piece_has_no_material() {
        let mut queen = Piece::new(PieceKind::Queen, Side::White, Square::new(0, 3).unwrap());
        assert_eq!(queen.material(), 9);
        queen.alive = false;
        assert_eq!(queen.material(), 0);
    }
}
