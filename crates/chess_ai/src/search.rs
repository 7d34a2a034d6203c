use chess_rules::{GameState, Move};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::evaluation::{score_board, score_material, CHECKMATE_SCORE, STALEMATE_SCORE};
use crate::task::CancelToken;

/// Default search depth in plies.
pub const SEARCH_DEPTH: u8 = 3;

/// Per-search state threaded through the recursion instead of living in
/// globals: the configured root depth (used to recognize root nodes), the
/// move chosen so far, a node counter and the cooperative cancellation flag.
struct SearchContext<'a, R: Rng> {
    max_depth: u8,
    best_move: Option<Move>,
    nodes: u64,
    rng: &'a mut R,
    cancel: &'a CancelToken,
}

/// Picks a move for the side to move using negamax with alpha-beta pruning.
///
/// The state must be exclusively owned by this call; it is mutated during
/// speculative exploration but left exactly as found. `valid_moves` must be
/// the legal set for the current position and must not be empty - the caller
/// checks for checkmate/stalemate before searching.
pub fn find_best_move<R: Rng>(
    gs: &mut GameState,
    valid_moves: Vec<Move>,
    depth: u8,
    rng: &mut R,
) -> Option<Move> {
    find_best_move_cancellable(gs, valid_moves, depth, rng, &CancelToken::new())
}

/// [`find_best_move`] with a cancellation token checked at every node. A
/// cancelled search unwinds promptly (undoing all speculative moves on the
/// way out) and reports no move, so its result is simply discarded.
pub fn find_best_move_cancellable<R: Rng>(
    gs: &mut GameState,
    valid_moves: Vec<Move>,
    depth: u8,
    rng: &mut R,
    cancel: &CancelToken,
) -> Option<Move> {
    debug_assert!(
        !valid_moves.is_empty(),
        "search entered with no legal moves; check checkmate/stalemate first"
    );
    let mut ctx = SearchContext {
        max_depth: depth,
        best_move: None,
        nodes: 0,
        rng,
        cancel,
    };
    let turn_multiplier = if gs.white_to_move() { 1 } else { -1 };
    let score = negamax_alpha_beta(
        gs,
        valid_moves,
        depth,
        -CHECKMATE_SCORE,
        CHECKMATE_SCORE,
        turn_multiplier,
        &mut ctx,
    );
    if cancel.is_cancelled() {
        debug!("search cancelled after {} nodes", ctx.nodes);
        return None;
    }
    debug!(
        "searched {} nodes to depth {depth}, score {score}, best {:?}",
        ctx.nodes,
        ctx.best_move.map(|m| m.to_string())
    );
    ctx.best_move
}

/// Alpha-beta root returning both the score and the chosen move; exposed so
/// the pruned search can be checked against the full-width reference.
pub fn find_move_alpha_beta<R: Rng>(
    gs: &mut GameState,
    valid_moves: Vec<Move>,
    depth: u8,
    rng: &mut R,
) -> (i32, Option<Move>) {
    let cancel = CancelToken::new();
    let mut ctx = SearchContext {
        max_depth: depth,
        best_move: None,
        nodes: 0,
        rng,
        cancel: &cancel,
    };
    let turn_multiplier = if gs.white_to_move() { 1 } else { -1 };
    let score = negamax_alpha_beta(
        gs,
        valid_moves,
        depth,
        -CHECKMATE_SCORE,
        CHECKMATE_SCORE,
        turn_multiplier,
        &mut ctx,
    );
    (score, ctx.best_move)
}

/// Full-width negamax without pruning. Slower but explores every line; kept
/// as the reference the pruning search must agree with.
pub fn find_move_negamax<R: Rng>(
    gs: &mut GameState,
    valid_moves: Vec<Move>,
    depth: u8,
    rng: &mut R,
) -> (i32, Option<Move>) {
    let cancel = CancelToken::new();
    let mut ctx = SearchContext {
        max_depth: depth,
        best_move: None,
        nodes: 0,
        rng,
        cancel: &cancel,
    };
    let turn_multiplier = if gs.white_to_move() { 1 } else { -1 };
    let score = negamax(gs, valid_moves, depth, turn_multiplier, &mut ctx);
    (score, ctx.best_move)
}

fn negamax_alpha_beta<R: Rng>(
    gs: &mut GameState,
    mut moves: Vec<Move>,
    depth: u8,
    mut alpha: i32,
    beta: i32,
    turn_multiplier: i32,
    ctx: &mut SearchContext<'_, R>,
) -> i32 {
    ctx.nodes += 1;
    if ctx.cancel.is_cancelled() {
        return turn_multiplier * score_board(gs);
    }
    // An empty move list means the position one ply up was terminal; the
    // checkmate/stalemate flags were just set by valid_moves, so the
    // evaluation folds them in.
    if depth == 0 || moves.is_empty() {
        return turn_multiplier * score_board(gs);
    }

    // Randomize so equal-valued moves do not always resolve the same way.
    moves.shuffle(&mut *ctx.rng);
    let mut max_score = -CHECKMATE_SCORE;
    for mv in moves {
        gs.apply_move(mv);
        let next_moves = gs.valid_moves();
        let score = -negamax_alpha_beta(
            gs,
            next_moves,
            depth - 1,
            -beta,
            -alpha,
            -turn_multiplier,
            ctx,
        );
        gs.undo_move();
        if score > max_score {
            max_score = score;
            if depth == ctx.max_depth {
                ctx.best_move = Some(mv);
            }
        }
        if max_score > alpha {
            alpha = max_score;
        }
        if alpha >= beta {
            break;
        }
    }
    max_score
}

fn negamax<R: Rng>(
    gs: &mut GameState,
    mut moves: Vec<Move>,
    depth: u8,
    turn_multiplier: i32,
    ctx: &mut SearchContext<'_, R>,
) -> i32 {
    ctx.nodes += 1;
    if depth == 0 || moves.is_empty() {
        return turn_multiplier * score_board(gs);
    }
    moves.shuffle(&mut *ctx.rng);
    let mut max_score = -CHECKMATE_SCORE;
    for mv in moves {
        gs.apply_move(mv);
        let next_moves = gs.valid_moves();
        let score = -negamax(gs, next_moves, depth - 1, -turn_multiplier, ctx);
        gs.undo_move();
        if score > max_score {
            max_score = score;
            if depth == ctx.max_depth {
                ctx.best_move = Some(mv);
            }
        }
    }
    max_score
}

/// Two-ply greedy baseline: picks the move minimizing the opponent's best
/// material reply. A weak but fast opponent, kept for benchmarking the real
/// search against.
pub fn find_greedy_move<R: Rng>(
    gs: &mut GameState,
    mut valid_moves: Vec<Move>,
    rng: &mut R,
) -> Option<Move> {
    let turn_multiplier = if gs.white_to_move() { 1 } else { -1 };
    let mut opponent_min_max = CHECKMATE_SCORE;
    let mut best_move = None;
    valid_moves.shuffle(rng);
    for player_move in valid_moves {
        gs.apply_move(player_move);
        let opponent_moves = gs.valid_moves();
        let opponent_max = if gs.stalemate() {
            STALEMATE_SCORE
        } else if gs.checkmate() {
            -CHECKMATE_SCORE
        } else {
            let mut max = -CHECKMATE_SCORE;
            for opponent_move in opponent_moves {
                gs.apply_move(opponent_move);
                gs.valid_moves();
                let score = if gs.checkmate() {
                    CHECKMATE_SCORE
                } else if gs.stalemate() {
                    STALEMATE_SCORE
                } else {
                    -turn_multiplier * score_material(gs.board())
                };
                if score > max {
                    max = score;
                }
                gs.undo_move();
            }
            max
        };
        if opponent_max < opponent_min_max {
            opponent_min_max = opponent_max;
            best_move = Some(player_move);
        }
        gs.undo_move();
    }
    best_move
}

/// Uniform fallback when the search reports no move.
pub fn find_random_move<R: Rng>(valid_moves: &[Move], rng: &mut R) -> Option<Move> {
    valid_moves.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Board, Color, Piece, PieceKind, Square};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(notation: &str) -> Square {
        Square::from_algebraic(notation).unwrap()
    }

    /// White rook a1 versus a hanging black queen a8; capturing it is the
    /// only move that does not lose material (the queen otherwise takes the
    /// rook along the a-file).
    fn hanging_queen_position() -> GameState {
        let mut board = Board::empty();
        board.place(sq("e1"), Piece::new(Color::White, PieceKind::King));
        board.place(sq("a1"), Piece::new(Color::White, PieceKind::Rook));
        board.place(sq("a8"), Piece::new(Color::Black, PieceKind::Queen));
        board.place(sq("e8"), Piece::new(Color::Black, PieceKind::King));
        GameState::from_board(board, true).unwrap()
    }

    #[test]
    fn depth_one_takes_the_hanging_queen_for_any_shuffle() {
        for seed in 0..8 {
            let mut gs = hanging_queen_position();
            let moves = gs.valid_moves();
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = find_best_move(&mut gs, moves, 1, &mut rng)
                .expect("a move must be found");
            assert_eq!(chosen.start, sq("a1"), "seed {seed} chose {chosen}");
            assert_eq!(chosen.end, sq("a8"), "seed {seed} chose {chosen}");
            assert!(chosen.is_capture());
        }
    }

    #[test]
    fn search_leaves_the_state_exactly_as_found() {
        let mut gs = GameState::new();
        let moves = gs.valid_moves();
        let before = gs.clone();
        let mut rng = StdRng::seed_from_u64(7);
        find_best_move(&mut gs, moves, 2, &mut rng);
        assert_eq!(gs, before);
    }

    #[test]
    fn pruned_search_matches_full_width_reference() {
        for seed in 0..4 {
            let mut gs = hanging_queen_position();
            let moves = gs.valid_moves();
            let mut rng = StdRng::seed_from_u64(seed);
            let (pruned_score, pruned_move) =
                find_move_alpha_beta(&mut gs, moves.clone(), 2, &mut rng);

            let mut reference_gs = hanging_queen_position();
            let reference_moves = reference_gs.valid_moves();
            let mut reference_rng = StdRng::seed_from_u64(seed ^ 0xdead);
            let (full_score, full_move) =
                find_move_negamax(&mut reference_gs, reference_moves, 2, &mut reference_rng);

            assert_eq!(pruned_score, full_score);
            // The winning capture is unique, so both searches must land on it
            // whatever the shuffle order.
            assert_eq!(pruned_move, full_move);
            assert_eq!(pruned_move.map(|m| m.end), Some(sq("a8")));
        }
    }

    #[test]
    fn search_finds_mate_in_one() {
        // Back-rank mate: Ra8 is immediately decisive.
        let mut board = Board::empty();
        board.place(sq("g1"), Piece::new(Color::White, PieceKind::King));
        board.place(sq("a1"), Piece::new(Color::White, PieceKind::Rook));
        board.place(sq("g8"), Piece::new(Color::Black, PieceKind::King));
        board.place(sq("f7"), Piece::new(Color::Black, PieceKind::Pawn));
        board.place(sq("g7"), Piece::new(Color::Black, PieceKind::Pawn));
        board.place(sq("h7"), Piece::new(Color::Black, PieceKind::Pawn));
        let mut gs = GameState::from_board(board, true).unwrap();
        let moves = gs.valid_moves();
        let mut rng = StdRng::seed_from_u64(3);
        let (score, chosen) = find_move_alpha_beta(&mut gs, moves, 2, &mut rng);
        assert_eq!(score, CHECKMATE_SCORE);
        assert_eq!(chosen.map(|m| m.end), Some(sq("a8")));
    }

    #[test]
    fn cancelled_search_reports_no_move() {
        let mut gs = GameState::new();
        let moves = gs.valid_moves();
        let before = gs.clone();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut rng = StdRng::seed_from_u64(1);
        let chosen = find_best_move_cancellable(&mut gs, moves, SEARCH_DEPTH, &mut rng, &cancel);
        assert_eq!(chosen, None);
        assert_eq!(gs, before);
    }

    #[test]
    fn greedy_baseline_takes_the_hanging_queen() {
        let mut gs = hanging_queen_position();
        let moves = gs.valid_moves();
        let mut rng = StdRng::seed_from_u64(11);
        let chosen = find_greedy_move(&mut gs, moves, &mut rng).expect("a move must be found");
        assert_eq!(chosen.end, sq("a8"));
    }

    #[test]
    fn random_fallback_stays_inside_the_legal_set() {
        let mut gs = GameState::new();
        let moves = gs.valid_moves();
        let mut rng = StdRng::seed_from_u64(5);
        let chosen = find_random_move(&moves, &mut rng).expect("non-empty list");
        assert!(moves.contains(&chosen));
        assert_eq!(find_random_move(&[], &mut rng), None);
    }
}
