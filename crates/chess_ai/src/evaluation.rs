use chess_rules::{Board, Color, GameState, Piece, PieceKind, Square};

/// Scores are integers in tenth-of-a-pawn units: ten times the material
/// value plus the raw positional table value. Positional bonuses are worth
/// a tenth of a material point without any floating point involved.
pub const CHECKMATE_SCORE: i32 = 10_000;
pub const STALEMATE_SCORE: i32 = 0;

// Fixed positional grids, indexed [row][col] with row 0 = rank 8. Only the
// pawn tables are color-specific; the other pieces read the same grid for
// both sides.
const KNIGHT_SCORES: [[i32; 8]; 8] = [
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
];

const BISHOP_SCORES: [[i32; 8]; 8] = [
    [4, 3, 2, 1, 1, 2, 3, 4],
    [3, 4, 3, 2, 2, 3, 4, 3],
    [2, 3, 4, 3, 3, 4, 3, 2],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [2, 3, 4, 3, 3, 4, 3, 2],
    [3, 4, 3, 2, 2, 3, 4, 3],
    [4, 3, 2, 1, 1, 2, 3, 4],
];

const QUEEN_SCORES: [[i32; 8]; 8] = [
    [1, 1, 1, 3, 1, 1, 1, 1],
    [1, 2, 3, 3, 3, 1, 1, 1],
    [1, 4, 3, 3, 3, 4, 2, 1],
    [1, 2, 3, 3, 3, 2, 2, 1],
    [1, 2, 3, 3, 3, 2, 2, 1],
    [1, 4, 3, 3, 3, 4, 2, 1],
    [1, 1, 2, 3, 3, 1, 1, 1],
    [1, 1, 1, 3, 1, 1, 1, 1],
];

const ROOK_SCORES: [[i32; 8]; 8] = [
    [4, 3, 4, 4, 4, 4, 3, 3],
    [4, 4, 4, 4, 4, 4, 4, 4],
    [1, 1, 2, 3, 3, 2, 1, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 1, 2, 2, 2, 2, 1, 1],
    [4, 4, 4, 4, 4, 4, 4, 4],
    [4, 3, 4, 4, 4, 4, 3, 4],
];

const WHITE_PAWN_SCORES: [[i32; 8]; 8] = [
    [8, 8, 8, 8, 8, 8, 8, 8],
    [8, 8, 8, 8, 8, 8, 8, 8],
    [5, 6, 6, 7, 7, 6, 6, 5],
    [2, 3, 3, 5, 5, 3, 3, 2],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 1, 2, 3, 3, 2, 1, 1],
    [1, 1, 1, 0, 0, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const BLACK_PAWN_SCORES: [[i32; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 0, 0, 1, 1, 1],
    [1, 1, 2, 3, 3, 2, 1, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [2, 3, 3, 5, 5, 3, 3, 2],
    [5, 6, 6, 7, 7, 6, 6, 5],
    [8, 8, 8, 8, 8, 8, 8, 8],
    [8, 8, 8, 8, 8, 8, 8, 8],
];

/// Material value in pawns. Kings carry no material; the game is decided by
/// mate, not by capturing them.
fn material_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight => 3,
        PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 10,
        PieceKind::King => 0,
    }
}

fn position_score(piece: Piece, sq: Square) -> i32 {
    let (row, col) = (sq.row as usize, sq.col as usize);
    match piece.kind {
        PieceKind::King => 0,
        PieceKind::Pawn => match piece.color {
            Color::White => WHITE_PAWN_SCORES[row][col],
            Color::Black => BLACK_PAWN_SCORES[row][col],
        },
        PieceKind::Knight => KNIGHT_SCORES[row][col],
        PieceKind::Bishop => BISHOP_SCORES[row][col],
        PieceKind::Rook => ROOK_SCORES[row][col],
        PieceKind::Queen => QUEEN_SCORES[row][col],
    }
}

/// Full evaluation from white's perspective: +/-CHECKMATE_SCORE for a mated
/// side, zero for stalemate, otherwise the material-plus-positional sum over
/// every occupied square. The terminal flags are taken from the state, so
/// this expects `valid_moves` to have run for the current position.
pub fn score_board(gs: &GameState) -> i32 {
    if gs.checkmate() {
        return if gs.white_to_move() {
            -CHECKMATE_SCORE
        } else {
            CHECKMATE_SCORE
        };
    }
    if gs.stalemate() {
        return STALEMATE_SCORE;
    }

    let mut score = 0;
    for row in 0..8 {
        for col in 0..8 {
            let sq = Square { row, col };
            if let Some(piece) = gs.board().piece_at(sq) {
                let value = 10 * material_value(piece.kind) + position_score(piece, sq);
                match piece.color {
                    Color::White => score += value,
                    Color::Black => score -= value,
                }
            }
        }
    }
    score
}

/// Material-only evaluation from white's perspective, in the same units as
/// [`score_board`].
pub fn score_material(board: &Board) -> i32 {
    let mut score = 0;
    for row in 0..8 {
        for col in 0..8 {
            if let Some(piece) = board.piece_at(Square { row, col }) {
                let value = 10 * material_value(piece.kind);
                match piece.color {
                    Color::White => score += value,
                    Color::Black => score -= value,
                }
            }
        }
    }
    score
}
