//! Contract-based validation for tic-tac-toe.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use crate::action::{Move, MoveError};
use crate::invariants::{InvariantSet, TicTacToeInvariants};
use crate::typestate::GameInProgress;
use tracing::instrument;

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// Contracts formalize Hoare-style reasoning:
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    ///
    /// This verifies that the transition maintained system invariants.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: The square at the move's position must be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Checks that the move targets an empty square.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if !game.board().is_empty(mov.position) {
            Err(MoveError::SquareOccupied(mov.position))
        } else {
            Ok(())
        }
    }
}

/// Precondition: It must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Checks that the move is made by the player whose turn it is.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if mov.player != game.to_move() {
            Err(MoveError::WrongPlayer(mov.player))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition: A move is legal if the square is empty and it's the player's turn.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        SquareIsEmpty::check(mov, game)?;
        PlayersTurn::check(mov, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions:
/// - Square must be empty
/// - Must be player's turn
///
/// Postconditions:
/// - Board remains monotonic
/// - Players still alternate
/// - History remains consistent with board
pub struct MoveContract;

impl Contract<GameInProgress, Move> for MoveContract {
    fn pre(game: &GameInProgress, action: &Move) -> Result<(), MoveError> {
        LegalMove::check(action, game)
    }

    fn post(_before: &GameInProgress, after: &GameInProgress) -> Result<(), MoveError> {
        // Verify all invariants using the composed set
        TicTacToeInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::types::{Player, Square};
    use crate::typestate::{GameResult, GameSetup};

    #[test]
    fn test_precondition_empty_square() {
        let game = GameSetup::new().start(Player::X);
        let action = Move::new(Player::X, Position::Center);

        // Should pass - square is empty
        assert!(MoveContract::pre(&game, &action).is_ok());
    }

    #[test]
    fn test_precondition_occupied_square() {
        let game = GameSetup::new().start(Player::X);
        let action = Move::new(Player::X, Position::Center);

        if let Ok(GameResult::InProgress(game)) = game.make_move(action) {
            // Try to play same square
            let action2 = Move::new(Player::O, Position::Center);
            assert!(matches!(
                MoveContract::pre(&game, &action2),
                Err(MoveError::SquareOccupied(_))
            ));
        }
    }

    #[test]
    fn test_precondition_wrong_turn() {
        let game = GameSetup::new().start(Player::X);
        let action = Move::new(Player::O, Position::Center); // O plays when it's X's turn

        assert!(matches!(
            MoveContract::pre(&game, &action),
            Err(MoveError::WrongPlayer(_))
        ));
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let game = GameSetup::new().start(Player::X);
        let action = Move::new(Player::X, Position::Center);

        if let Ok(GameResult::InProgress(after)) = game.clone().make_move(action) {
            // Postcondition should hold
            assert!(MoveContract::post(&game, &after).is_ok());
        }
    }

    #[test]
    fn test_postcondition_detects_corruption() {
        let game = GameSetup::new().start(Player::X);
        let action = Move::new(Player::X, Position::Center);

        if let Ok(GameResult::InProgress(mut after)) = game.clone().make_move(action) {
            // Corrupt the board
            after
                .board
                .set(Position::TopLeft, Square::Occupied(Player::O));

            // Postcondition should fail
            assert!(MoveContract::post(&game, &after).is_err());
        }
    }
}
