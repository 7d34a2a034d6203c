// Core chess rules modules
pub mod board;
pub mod error;
pub mod game_state;
pub mod moves;
pub mod piece;
pub mod square;

// Re-export main types for convenience
pub use board::{Board, CastleRights};
pub use error::MoveError;
pub use game_state::GameState;
pub use moves::Move;
pub use piece::{Color, Piece, PieceKind};
pub use square::Square;
