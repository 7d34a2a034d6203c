use thiserror::Error;

use crate::moves::Move;

#[derive(Debug, Error, PartialEq)]
pub enum MoveError {
    #[error("move {0} is not legal in the current position")]
    IllegalMove(Move),
}
