use std::fmt;

use crate::board::Board;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;

/// Immutable description of a single board transition.
///
/// The three special-move flags are not mutually exclusive with captures: an
/// en-passant move always carries the captured pawn even though the end
/// square is empty when the move is constructed.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub start: Square,
    pub end: Square,
    pub piece_moved: Piece,
    pub piece_captured: Option<Piece>,
    pub is_pawn_promotion: bool,
    pub is_en_passant: bool,
    pub is_castle: bool,
}

impl Move {
    /// Builds a move from two squares and the current board, e.g. from a
    /// pair of user-selected squares. Returns None if the start square is
    /// empty. Promotion is derived from the mover reaching the far rank.
    pub fn new(start: Square, end: Square, board: &Board) -> Option<Move> {
        let piece_moved = board.piece_at(start)?;
        Some(Self::with_pieces(
            start,
            end,
            piece_moved,
            board.piece_at(end),
        ))
    }

    pub(crate) fn with_pieces(
        start: Square,
        end: Square,
        piece_moved: Piece,
        piece_captured: Option<Piece>,
    ) -> Move {
        let is_pawn_promotion = piece_moved.kind == PieceKind::Pawn
            && end.row == piece_moved.color.opposite().back_rank();
        Move {
            start,
            end,
            piece_moved,
            piece_captured,
            is_pawn_promotion,
            is_en_passant: false,
            is_castle: false,
        }
    }

    /// The captured pawn sits one rank behind the end square, so it is
    /// recorded here rather than read from the (empty) destination.
    pub(crate) fn en_passant(start: Square, end: Square, piece_moved: Piece) -> Move {
        Move {
            start,
            end,
            piece_moved,
            piece_captured: Some(Piece::new(
                piece_moved.color.opposite(),
                PieceKind::Pawn,
            )),
            is_pawn_promotion: false,
            is_en_passant: true,
            is_castle: false,
        }
    }

    pub(crate) fn castle(start: Square, end: Square, piece_moved: Piece) -> Move {
        Move {
            start,
            end,
            piece_moved,
            piece_captured: None,
            is_pawn_promotion: false,
            is_en_passant: false,
            is_castle: true,
        }
    }

    /// Collision-free identity over all start/end combinations: a base-10
    /// composite of the four coordinates.
    pub fn id(&self) -> u16 {
        self.start.row as u16 * 1000
            + self.start.col as u16 * 100
            + self.end.row as u16 * 10
            + self.end.col as u16
    }

    pub fn is_capture(&self) -> bool {
        self.piece_captured.is_some()
    }
}

/// Two moves are the same transition iff their coordinate identity matches;
/// flags are derived from the position and do not participate. This lets a
/// bare start/end move built from user input match the flag-carrying variant
/// in the legal-move list.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// Algebraic-style rendering: `O-O`/`O-O-O` for castles, destination square
/// (with `<file>x` on captures) for pawns, piece letter plus destination for
/// the rest. Promotion and check/checkmate suffixes are not rendered.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_castle {
            return if self.end.col == 6 {
                write!(f, "O-O")
            } else {
                write!(f, "O-O-O")
            };
        }

        let end_square = self.end.to_algebraic();
        if self.piece_moved.kind == PieceKind::Pawn {
            return if self.is_capture() {
                write!(f, "{}x{}", (b'a' + self.start.col) as char, end_square)
            } else {
                write!(f, "{end_square}")
            };
        }

        write!(f, "{}", self.piece_moved.kind.letter())?;
        if self.is_capture() {
            write!(f, "x")?;
        }
        write!(f, "{end_square}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn sq(notation: &str) -> Square {
        Square::from_algebraic(notation).unwrap()
    }

    #[test]
    fn move_ids_are_injective() {
        let mut seen = HashSet::new();
        let pawn = Piece::new(Color::White, PieceKind::Pawn);
        for start_row in 0..8 {
            for start_col in 0..8 {
                for end_row in 0..8 {
                    for end_col in 0..8 {
                        let mv = Move::with_pieces(
                            Square {
                                row: start_row,
                                col: start_col,
                            },
                            Square {
                                row: end_row,
                                col: end_col,
                            },
                            pawn,
                            None,
                        );
                        assert!(seen.insert(mv.id()), "duplicate id {}", mv.id());
                    }
                }
            }
        }
        assert_eq!(seen.len(), 8 * 8 * 8 * 8);
    }

    #[test]
    fn equality_ignores_flags() {
        let board = Board::initial();
        let plain = Move::new(sq("e1"), sq("g1"), &board).unwrap();
        let king = Piece::new(Color::White, PieceKind::King);
        let castle = Move::castle(sq("e1"), sq("g1"), king);
        assert_eq!(plain, castle);
    }

    #[test]
    fn renders_pawn_moves() {
        let mut board = Board::empty();
        board.place(sq("e2"), Piece::new(Color::White, PieceKind::Pawn));
        board.place(sq("d5"), Piece::new(Color::Black, PieceKind::Pawn));
        board.place(sq("e4"), Piece::new(Color::White, PieceKind::Pawn));
        let push = Move::new(sq("e2"), sq("e4"), &Board::initial()).unwrap();
        assert_eq!(push.to_string(), "e4");
        let capture = Move::new(sq("e4"), sq("d5"), &board).unwrap();
        assert_eq!(capture.to_string(), "exd5");
    }

    #[test]
    fn renders_piece_moves_and_castles() {
        let board = Board::initial();
        let knight = Move::new(sq("g1"), sq("f3"), &board).unwrap();
        assert_eq!(knight.to_string(), "Nf3");

        let mut capture_board = Board::empty();
        capture_board.place(sq("f3"), Piece::new(Color::White, PieceKind::Knight));
        capture_board.place(sq("e5"), Piece::new(Color::Black, PieceKind::Pawn));
        let capture = Move::new(sq("f3"), sq("e5"), &capture_board).unwrap();
        assert_eq!(capture.to_string(), "Nxe5");

        let king = Piece::new(Color::White, PieceKind::King);
        assert_eq!(Move::castle(sq("e1"), sq("g1"), king).to_string(), "O-O");
        assert_eq!(Move::castle(sq("e1"), sq("c1"), king).to_string(), "O-O-O");
    }

    #[test]
    fn promotion_flag_derived_from_far_rank() {
        let pawn = Piece::new(Color::White, PieceKind::Pawn);
        let promoting = Move::with_pieces(sq("a7"), sq("a8"), pawn, None);
        assert!(promoting.is_pawn_promotion);
        let quiet = Move::with_pieces(sq("a6"), sq("a7"), pawn, None);
        assert!(!quiet.is_pawn_promotion);

        let black_pawn = Piece::new(Color::Black, PieceKind::Pawn);
        let black_promoting = Move::with_pieces(sq("h2"), sq("h1"), black_pawn, None);
        assert!(black_promoting.is_pawn_promotion);
    }
}
