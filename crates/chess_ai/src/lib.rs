// Move-finding modules built on top of chess_rules
pub mod evaluation;
pub mod search;
pub mod task;

// Re-export main entry points for convenience
pub use evaluation::{score_board, score_material, CHECKMATE_SCORE, STALEMATE_SCORE};
pub use search::{
    find_best_move, find_greedy_move, find_random_move, SEARCH_DEPTH,
};
pub use task::{CancelToken, SearchError, SearchTask};
