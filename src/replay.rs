//! Replay of a recorded move history over a shadow board.
//!
//! [`ReplayCursor`] is the pure, stepwise half of replay: it owns a
//! private shadow board and re-enacts recorded moves one at a time in
//! chronological order. The timed pacing, display publication and
//! state restoration live in the controller, which drives the cursor
//! between suspensions.

use crate::action::Move;
use crate::types::{Board, Square};

/// Error that can occur when starting or interacting with a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ReplayError {
    /// There is no recorded history to replay.
    #[display("No recorded moves to replay")]
    EmptyHistory,

    /// A replay is already running (replay is single-flight).
    #[display("A replay is already running")]
    AlreadyReplaying,

    /// Reset was requested while a replay is running.
    #[display("Cannot reset while a replay is running")]
    ResetDuringReplay,
}

impl std::error::Error for ReplayError {}

/// One re-enacted move: the shadow board after applying it.
#[derive(Debug, Clone)]
pub struct ReplayStep {
    /// Shadow board state after the move.
    pub board: Board,
    /// The move that was re-enacted.
    pub mov: Move,
    /// True if this was the final recorded move.
    pub is_last: bool,
}

/// Sequential stepper over a recorded history.
///
/// The shadow board starts empty and accumulates the recorded moves;
/// it never aliases the authoritative board, so replay visuals cannot
/// corrupt the live game.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    moves: Vec<Move>,
    shadow: Board,
    next: usize,
}

impl ReplayCursor {
    /// Creates a cursor over the given history.
    pub fn new(moves: &[Move]) -> Self {
        Self {
            moves: moves.to_vec(),
            shadow: Board::new(),
            next: 0,
        }
    }

    /// Applies the next recorded move to the shadow board.
    ///
    /// Returns `None` once every move has been re-enacted. Steps are
    /// strictly sequential: each call applies exactly one move.
    pub fn advance(&mut self) -> Option<ReplayStep> {
        let mov = *self.moves.get(self.next)?;
        self.next += 1;
        self.shadow.set(mov.position, Square::Occupied(mov.player));
        Some(ReplayStep {
            board: self.shadow.clone(),
            mov,
            is_last: self.next == self.moves.len(),
        })
    }

    /// Number of moves not yet re-enacted.
    pub fn remaining(&self) -> usize {
        self.moves.len() - self.next
    }
}
