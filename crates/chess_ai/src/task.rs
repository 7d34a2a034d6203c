use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chess_rules::{GameState, Move};
use log::debug;
use thiserror::Error;

use crate::search;

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("search requires at least one legal move; check checkmate/stalemate first")]
    NoLegalMoves,
}

/// Shared cancellation flag, checked cooperatively at every search node.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A search running on its own thread over a private copy of the game state,
/// so the interactive loop stays responsive and no shared state is ever
/// mutated mid-search.
///
/// The host polls (or joins) for the result and only then applies the
/// returned move to the live state. Cancelling - explicitly or by dropping
/// the task - makes the worker unwind and report no move, so a stale result
/// can never be half-applied.
#[derive(Debug)]
pub struct SearchTask {
    cancel: CancelToken,
    result: Receiver<Option<Move>>,
    handle: Option<JoinHandle<()>>,
}

impl SearchTask {
    /// Moves `state` (the host passes a clone of the live state) and the
    /// legal move list onto a worker thread. Fails if the move list is
    /// empty: a terminal position must not be searched.
    pub fn spawn(
        mut state: GameState,
        valid_moves: Vec<Move>,
        depth: u8,
    ) -> Result<SearchTask, SearchError> {
        if valid_moves.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let chosen = search::find_best_move_cancellable(
                &mut state,
                valid_moves,
                depth,
                &mut rng,
                &worker_cancel,
            );
            // The host may have dropped the task already; the result is
            // discarded either way.
            let _ = sender.send(chosen);
        });
        Ok(SearchTask {
            cancel,
            result: receiver,
            handle: Some(handle),
        })
    }

    /// Asks the worker to stop at the next node boundary.
    pub fn cancel(&self) {
        debug!("cancelling search task");
        self.cancel.cancel();
    }

    /// Non-blocking check, suitable for a frame loop: None while the worker
    /// is still thinking, otherwise the worker's final answer (which is
    /// itself None for a cancelled or terminal search).
    pub fn poll(&mut self) -> Option<Option<Move>> {
        match self.result.try_recv() {
            Ok(chosen) => {
                self.join_worker();
                Some(chosen)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join_worker();
                Some(None)
            }
        }
    }

    /// Blocks until the worker finishes.
    pub fn join(mut self) -> Option<Move> {
        let chosen = self.result.recv().unwrap_or(None);
        self.join_worker();
        chosen
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.join_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn spawning_on_a_terminal_position_is_an_error() {
        let gs = GameState::new();
        let err = SearchTask::spawn(gs, Vec::new(), search::SEARCH_DEPTH).unwrap_err();
        assert_eq!(err, SearchError::NoLegalMoves);
    }

    #[test]
    fn task_delivers_a_legal_move() {
        let mut gs = GameState::new();
        let moves = gs.valid_moves();
        let task = SearchTask::spawn(gs.clone(), moves.clone(), 2).unwrap();
        let chosen = task.join().expect("search over a live position finds a move");
        assert!(moves.contains(&chosen));
        // The live state was never touched by the worker.
        assert_eq!(gs, {
            let mut fresh = GameState::new();
            fresh.valid_moves();
            fresh
        });
    }

    #[test]
    fn polling_eventually_yields_the_result() {
        let mut gs = GameState::new();
        let moves = gs.valid_moves();
        let mut task = SearchTask::spawn(gs, moves.clone(), 1).unwrap();
        let outcome = loop {
            if let Some(outcome) = task.poll() {
                break outcome;
            }
            thread::yield_now();
        };
        assert!(moves.contains(&outcome.expect("depth-1 search finds a move")));
    }

    #[test]
    fn cancelled_task_result_is_discardable() {
        let mut gs = GameState::new();
        let moves = gs.valid_moves();
        let task = SearchTask::spawn(gs, moves, search::SEARCH_DEPTH).unwrap();
        task.cancel();
        // Whether the worker finished before seeing the flag or unwound
        // early, joining always settles without applying anything.
        let _ = task.join();
    }
}
