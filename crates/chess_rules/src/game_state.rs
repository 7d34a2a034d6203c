use log::{debug, warn};

use crate::board::{Board, CastleRights};
use crate::error::MoveError;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Aggregate owner of the board, the turn flag, the king-square caches, the
/// castling rights and the three history stacks kept in lock-step:
/// `move_log.len() + 1 == en_passant_log.len() == castle_rights_log.len()`.
/// Pushes happen only in [`GameState::apply_move`], pops only in
/// [`GameState::undo_move`].
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    white_to_move: bool,
    white_king: Square,
    black_king: Square,
    castle_rights: CastleRights,
    checkmate: bool,
    stalemate: bool,
    en_passant_target: Option<Square>,
    move_log: Vec<Move>,
    en_passant_log: Vec<Option<Square>>,
    castle_rights_log: Vec<CastleRights>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            white_to_move: true,
            white_king: Square { row: 7, col: 4 },
            black_king: Square { row: 0, col: 4 },
            castle_rights: CastleRights::default(),
            checkmate: false,
            stalemate: false,
            en_passant_target: None,
            en_passant_log: vec![None],
            castle_rights_log: vec![CastleRights::default()],
            move_log: Vec::new(),
        }
    }

    /// Builds a state from an arbitrary position, locating the kings by
    /// scanning the board. Returns None unless the board holds exactly one
    /// king of each color. Castling rights start out fully granted; the
    /// castle generator additionally requires the rook on its home square.
    pub fn from_board(board: Board, white_to_move: bool) -> Option<Self> {
        let mut white_king = None;
        let mut black_king = None;
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square { row, col };
                if let Some(piece) = board.piece_at(sq) {
                    if piece.kind == PieceKind::King {
                        let slot = match piece.color {
                            Color::White => &mut white_king,
                            Color::Black => &mut black_king,
                        };
                        if slot.is_some() {
                            return None;
                        }
                        *slot = Some(sq);
                    }
                }
            }
        }
        Some(Self {
            board,
            white_to_move,
            white_king: white_king?,
            black_king: black_king?,
            castle_rights: CastleRights::default(),
            checkmate: false,
            stalemate: false,
            en_passant_target: None,
            en_passant_log: vec![None],
            castle_rights_log: vec![CastleRights::default()],
            move_log: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    pub fn checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn stalemate(&self) -> bool {
        self.stalemate
    }

    pub fn move_log(&self) -> &[Move] {
        &self.move_log
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub fn castle_rights(&self) -> CastleRights {
        self.castle_rights
    }

    fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    fn king_square(&self) -> Square {
        if self.white_to_move {
            self.white_king
        } else {
            self.black_king
        }
    }

    /// Checked entry point for host/input layers: the proposed move is
    /// equality-matched against the current legal set and the matched move
    /// (which carries the correct special-move flags) is applied.
    pub fn make_move(&mut self, mv: Move) -> Result<(), MoveError> {
        let legal = self.valid_moves();
        match legal.into_iter().find(|m| *m == mv) {
            Some(matched) => {
                self.apply_move(matched);
                Ok(())
            }
            None => {
                warn!("rejected illegal move {mv}");
                Err(MoveError::IllegalMove(mv))
            }
        }
    }

    /// Applies the move unconditionally. The caller must hold a move from
    /// the legal set; this is the fast path used by the legality filter and
    /// by speculative search, which make and undo thousands of moves.
    pub fn apply_move(&mut self, mv: Move) {
        self.board.remove(mv.start);
        self.board.place(mv.end, mv.piece_moved);

        if mv.piece_moved.kind == PieceKind::King {
            match mv.piece_moved.color {
                Color::White => self.white_king = mv.end,
                Color::Black => self.black_king = mv.end,
            }
        }

        // Promotion always resolves to a queen.
        if mv.is_pawn_promotion {
            self.board.place(
                mv.end,
                Piece::new(mv.piece_moved.color, PieceKind::Queen),
            );
        }

        // The en-passant victim sits beside the start square, not on the
        // destination.
        if mv.is_en_passant {
            self.board.remove(Square {
                row: mv.start.row,
                col: mv.end.col,
            });
        }

        // A two-rank pawn advance exposes the square it passed over.
        self.en_passant_target = if mv.piece_moved.kind == PieceKind::Pawn
            && mv.start.row.abs_diff(mv.end.row) == 2
        {
            Some(Square {
                row: (mv.start.row + mv.end.row) / 2,
                col: mv.start.col,
            })
        } else {
            None
        };
        self.en_passant_log.push(self.en_passant_target);

        if mv.is_castle {
            let (rook_from, rook_to) = castle_rook_squares(&mv);
            if let Some(rook) = self.board.remove(rook_from) {
                self.board.place(rook_to, rook);
            }
        }

        self.update_castle_rights(&mv);
        self.castle_rights_log.push(self.castle_rights);

        self.move_log.push(mv);
        self.white_to_move = !self.white_to_move;
    }

    /// Reverses the most recent move. A no-op on an empty log. Checkmate and
    /// stalemate are cleared: they describe the current position, not the
    /// history.
    pub fn undo_move(&mut self) -> Option<Move> {
        let mv = self.move_log.pop()?;

        self.board.place(mv.start, mv.piece_moved);
        match mv.piece_captured {
            Some(captured) => self.board.place(mv.end, captured),
            None => {
                self.board.remove(mv.end);
            }
        }
        self.white_to_move = !self.white_to_move;

        if mv.piece_moved.kind == PieceKind::King {
            match mv.piece_moved.color {
                Color::White => self.white_king = mv.start,
                Color::Black => self.black_king = mv.start,
            }
        }

        // The captured pawn goes back beside the start square; the landing
        // square stays empty.
        if mv.is_en_passant {
            self.board.remove(mv.end);
            if let Some(captured) = mv.piece_captured {
                self.board.place(
                    Square {
                        row: mv.start.row,
                        col: mv.end.col,
                    },
                    captured,
                );
            }
        }

        self.en_passant_log.pop();
        self.en_passant_target = self.en_passant_log.last().copied().flatten();

        self.castle_rights_log.pop();
        if let Some(rights) = self.castle_rights_log.last() {
            self.castle_rights = *rights;
        }

        if mv.is_castle {
            let (rook_from, rook_to) = castle_rook_squares(&mv);
            if let Some(rook) = self.board.remove(rook_to) {
                self.board.place(rook_from, rook);
            }
        }

        self.checkmate = false;
        self.stalemate = false;
        Some(mv)
    }

    fn update_castle_rights(&mut self, mv: &Move) {
        match (mv.piece_moved.color, mv.piece_moved.kind) {
            (Color::White, PieceKind::King) => {
                self.castle_rights.white_kingside = false;
                self.castle_rights.white_queenside = false;
            }
            (Color::Black, PieceKind::King) => {
                self.castle_rights.black_kingside = false;
                self.castle_rights.black_queenside = false;
            }
            (Color::White, PieceKind::Rook) if mv.start.row == 7 => {
                if mv.start.col == 0 {
                    self.castle_rights.white_queenside = false;
                } else if mv.start.col == 7 {
                    self.castle_rights.white_kingside = false;
                }
            }
            (Color::Black, PieceKind::Rook) if mv.start.row == 0 => {
                if mv.start.col == 0 {
                    self.castle_rights.black_queenside = false;
                } else if mv.start.col == 7 {
                    self.castle_rights.black_kingside = false;
                }
            }
            _ => {}
        }

        // A rook captured on its home square also forfeits the right.
        if let Some(captured) = mv.piece_captured {
            if captured.kind == PieceKind::Rook {
                match (captured.color, mv.end.row, mv.end.col) {
                    (Color::White, 7, 0) => self.castle_rights.white_queenside = false,
                    (Color::White, 7, 7) => self.castle_rights.white_kingside = false,
                    (Color::Black, 0, 0) => self.castle_rights.black_queenside = false,
                    (Color::Black, 0, 7) => self.castle_rights.black_kingside = false,
                    _ => {}
                }
            }
        }
    }

    /// Legal moves for the side to move, via simulate-and-filter: every
    /// pseudo-legal move is made, tested for leaving the mover's own king
    /// attacked, and undone. Castles are validated separately and appended
    /// before the empty-set test, so a position whose only legal move is a
    /// castle is not misreported as mate. Sets or clears the checkmate and
    /// stalemate flags.
    pub fn valid_moves(&mut self) -> Vec<Move> {
        let mut moves = self.pseudo_legal_moves();
        for i in (0..moves.len()).rev() {
            self.apply_move(moves[i]);
            // apply_move flipped the turn; flip back to test the mover's king.
            self.white_to_move = !self.white_to_move;
            let exposes_king = self.in_check();
            self.white_to_move = !self.white_to_move;
            self.undo_move();
            if exposes_king {
                moves.remove(i);
            }
        }

        let king = self.king_square();
        self.castle_moves(king, &mut moves);

        if moves.is_empty() {
            if self.in_check() {
                self.checkmate = true;
                debug!("no legal moves: checkmate for {:?}", self.side_to_move());
            } else {
                self.stalemate = true;
                debug!("no legal moves: stalemate");
            }
        } else {
            self.checkmate = false;
            self.stalemate = false;
        }
        moves
    }

    /// Whether the side to move's king is currently attacked.
    pub fn in_check(&mut self) -> bool {
        let king = self.king_square();
        self.square_under_attack(king)
    }

    /// Whether any opposing piece's movement pattern reaches the square.
    /// Opponent moves are taken pseudo-legally on purpose: an attack counts
    /// even if delivering it would expose the attacker's own king.
    pub fn square_under_attack(&mut self, sq: Square) -> bool {
        self.white_to_move = !self.white_to_move;
        let opponent_moves = self.pseudo_legal_moves();
        self.white_to_move = !self.white_to_move;
        opponent_moves.iter().any(|m| m.end == sq)
    }

    fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let side = self.side_to_move();
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square { row, col };
                let Some(piece) = self.board.piece_at(sq) else {
                    continue;
                };
                if piece.color != side {
                    continue;
                }
                match piece.kind {
                    PieceKind::Pawn => self.pawn_moves(sq, piece, &mut moves),
                    PieceKind::Knight => {
                        self.offset_moves(sq, piece, &KNIGHT_OFFSETS, &mut moves)
                    }
                    PieceKind::Bishop => {
                        self.sliding_moves(sq, piece, &BISHOP_DIRECTIONS, &mut moves)
                    }
                    PieceKind::Rook => {
                        self.sliding_moves(sq, piece, &ROOK_DIRECTIONS, &mut moves)
                    }
                    PieceKind::Queen => {
                        self.sliding_moves(sq, piece, &ROOK_DIRECTIONS, &mut moves);
                        self.sliding_moves(sq, piece, &BISHOP_DIRECTIONS, &mut moves);
                    }
                    PieceKind::King => self.offset_moves(sq, piece, &KING_OFFSETS, &mut moves),
                }
            }
        }
        moves
    }

    fn pawn_moves(&self, sq: Square, piece: Piece, moves: &mut Vec<Move>) {
        let (forward, start_row) = match piece.color {
            Color::White => (-1, 6),
            Color::Black => (1, 1),
        };

        if let Some(one_ahead) = sq.offset(forward, 0) {
            if self.board.piece_at(one_ahead).is_none() {
                moves.push(Move::with_pieces(sq, one_ahead, piece, None));
                // The double advance needs both intervening squares clear.
                if sq.row == start_row {
                    if let Some(two_ahead) = sq.offset(2 * forward, 0) {
                        if self.board.piece_at(two_ahead).is_none() {
                            moves.push(Move::with_pieces(sq, two_ahead, piece, None));
                        }
                    }
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(target) = sq.offset(forward, d_col) else {
                continue;
            };
            match self.board.piece_at(target) {
                Some(other) if other.color != piece.color => {
                    moves.push(Move::with_pieces(sq, target, piece, Some(other)));
                }
                None if self.en_passant_target == Some(target) => {
                    moves.push(Move::en_passant(sq, target, piece));
                }
                _ => {}
            }
        }
    }

    /// Rook/bishop/queen rays: empty square extends the ray, an enemy piece
    /// is captured and stops it, an own piece stops it outright.
    fn sliding_moves(
        &self,
        sq: Square,
        piece: Piece,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(d_row, d_col) in directions {
            for step in 1..8 {
                let Some(target) = sq.offset(d_row * step, d_col * step) else {
                    break;
                };
                match self.board.piece_at(target) {
                    None => moves.push(Move::with_pieces(sq, target, piece, None)),
                    Some(other) if other.color != piece.color => {
                        moves.push(Move::with_pieces(sq, target, piece, Some(other)));
                        break;
                    }
                    Some(_) => break,
                }
            }
        }
    }

    fn offset_moves(
        &self,
        sq: Square,
        piece: Piece,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(d_row, d_col) in offsets {
            let Some(target) = sq.offset(d_row, d_col) else {
                continue;
            };
            match self.board.piece_at(target) {
                Some(other) if other.color == piece.color => {}
                other => moves.push(Move::with_pieces(sq, target, piece, other)),
            }
        }
    }

    /// Castle legality: the right must be intact, the rook on its home
    /// square, the traversed squares empty, and neither the king's square
    /// nor the two squares it crosses attacked.
    fn castle_moves(&mut self, king: Square, moves: &mut Vec<Move>) {
        if self.square_under_attack(king) {
            return;
        }
        let rights = self.castle_rights;
        let (kingside, queenside) = if self.white_to_move {
            (rights.white_kingside, rights.white_queenside)
        } else {
            (rights.black_kingside, rights.black_queenside)
        };
        if kingside {
            self.kingside_castle_move(king, moves);
        }
        if queenside {
            self.queenside_castle_move(king, moves);
        }
    }

    fn kingside_castle_move(&mut self, king: Square, moves: &mut Vec<Move>) {
        let Some(piece) = self.board.piece_at(king) else {
            return;
        };
        let (Some(one), Some(two)) = (king.offset(0, 1), king.offset(0, 2)) else {
            return;
        };
        if !self.rook_at_home(king, 7, piece.color) {
            return;
        }
        if self.board.piece_at(one).is_some() || self.board.piece_at(two).is_some() {
            return;
        }
        if self.square_under_attack(one) || self.square_under_attack(two) {
            return;
        }
        moves.push(Move::castle(king, two, piece));
    }

    fn queenside_castle_move(&mut self, king: Square, moves: &mut Vec<Move>) {
        let Some(piece) = self.board.piece_at(king) else {
            return;
        };
        let (Some(one), Some(two), Some(three)) =
            (king.offset(0, -1), king.offset(0, -2), king.offset(0, -3))
        else {
            return;
        };
        if !self.rook_at_home(king, 0, piece.color) {
            return;
        }
        if self.board.piece_at(one).is_some()
            || self.board.piece_at(two).is_some()
            || self.board.piece_at(three).is_some()
        {
            return;
        }
        if self.square_under_attack(one) || self.square_under_attack(two) {
            return;
        }
        moves.push(Move::castle(king, two, piece));
    }

    fn rook_at_home(&self, king: Square, corner_col: u8, color: Color) -> bool {
        self.board.piece_at(Square {
            row: king.row,
            col: corner_col,
        }) == Some(Piece::new(color, PieceKind::Rook))
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

fn castle_rook_squares(mv: &Move) -> (Square, Square) {
    let row = mv.end.row;
    if mv.end.col > mv.start.col {
        // Kingside: the h-file rook lands beside the king.
        (
            Square {
                row,
                col: mv.end.col + 1,
            },
            Square {
                row,
                col: mv.end.col - 1,
            },
        )
    } else {
        (
            Square {
                row,
                col: mv.end.col - 2,
            },
            Square {
                row,
                col: mv.end.col + 1,
            },
        )
    }
}
