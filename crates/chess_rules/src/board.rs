use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastleRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

/// The 8x8 grid. Each square holds an optional piece; an empty square is
/// `None`, not a sentinel piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

const BACK_RANK_ORDER: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting position.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for (col, &kind) in BACK_RANK_ORDER.iter().enumerate() {
            let col = col as u8;
            board.place(Square { row: 0, col }, Piece::new(Color::Black, kind));
            board.place(Square { row: 7, col }, Piece::new(Color::White, kind));
        }
        for col in 0..8 {
            board.place(
                Square { row: 1, col },
                Piece::new(Color::Black, PieceKind::Pawn),
            );
            board.place(
                Square { row: 6, col },
                Piece::new(Color::White, PieceKind::Pawn),
            );
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize]
    }

    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.row as usize][sq.col as usize] = Some(piece);
    }

    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row as usize][sq.col as usize].take()
    }
}
