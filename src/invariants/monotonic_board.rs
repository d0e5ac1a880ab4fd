//! Monotonic board invariant: squares never change once set.

use super::Invariant;
use crate::types::{Board, Square};
use crate::typestate::GameInProgress;

/// Invariant: Board squares are monotonic (never overwritten).
///
/// Once a square transitions from Empty to Occupied, it never changes.
/// This is verified by replaying the move history and comparing.
pub struct MonotonicBoardInvariant;

impl Invariant<GameInProgress> for MonotonicBoardInvariant {
    fn holds(game: &GameInProgress) -> bool {
        // Reconstruct board from history
        let mut reconstructed = Board::new();

        for mov in game.history() {
            // Square must be empty before placing
            if reconstructed.get(mov.position) != Square::Empty {
                return false;
            }

            reconstructed.set(mov.position, Square::Occupied(mov.player));
        }

        // Reconstructed board must match current board
        reconstructed == *game.board()
    }

    fn description() -> &'static str {
        "Board squares are monotonic (never overwritten)"
    }
}
