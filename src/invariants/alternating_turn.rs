//! Alternating turn invariant: players alternate X, O, X, O, ...

use super::Invariant;
use crate::types::Player;
use crate::typestate::GameInProgress;

/// Invariant: Players alternate turns.
///
/// Move history must show X, O, X, O, ... pattern.
/// First move is always X.
pub struct AlternatingTurnInvariant;

impl Invariant<GameInProgress> for AlternatingTurnInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let history = game.history();

        if history.is_empty() {
            return true;
        }

        // First move must be X
        if history[0].player != Player::X {
            return false;
        }

        // Check alternation
        for window in history.windows(2) {
            if window[0].player == window[1].player {
                return false;
            }
        }

        // Current to_move must be correct
        let expected_next = if history.len() % 2 == 0 {
            Player::X
        } else {
            Player::O
        };

        game.to_move() == expected_next
    }

    fn description() -> &'static str {
        "Players alternate turns (X, O, X, O, ...)"
    }
}
