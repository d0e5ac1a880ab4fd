//! Serializable game wrapper for typestate phases.

use crate::action::{Move, MoveError};
use crate::phases::Outcome;
use crate::types::{Board, Player};
use crate::typestate::{GameFinished, GameInProgress, GameResult};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Wrapper for a game in any playable phase.
///
/// Typestate phases can't be held in a single field across
/// transitions, so components that own a game over its whole
/// lifetime (the session controller, snapshots, serialization)
/// use this enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyGame {
    /// Game in progress.
    InProgress {
        /// The board state.
        board: Board,
        /// Current player to move.
        to_move: Player,
        /// Move history, chronological.
        history: Vec<Move>,
    },
    /// Game finished.
    Finished {
        /// The board state.
        board: Board,
        /// The outcome.
        outcome: Outcome,
        /// Move history, chronological.
        history: Vec<Move>,
    },
}

impl From<GameInProgress> for AnyGame {
    fn from(game: GameInProgress) -> Self {
        AnyGame::InProgress {
            board: game.board().clone(),
            to_move: game.to_move(),
            history: game.history().to_vec(),
        }
    }
}

impl From<GameFinished> for AnyGame {
    fn from(game: GameFinished) -> Self {
        AnyGame::Finished {
            board: game.board().clone(),
            outcome: *game.outcome(),
            history: game.history().to_vec(),
        }
    }
}

impl From<GameResult> for AnyGame {
    fn from(result: GameResult) -> Self {
        match result {
            GameResult::InProgress(g) => g.into(),
            GameResult::Finished(g) => g.into(),
        }
    }
}

impl AnyGame {
    /// Returns the board for any game phase.
    pub fn board(&self) -> &Board {
        match self {
            AnyGame::InProgress { board, .. } => board,
            AnyGame::Finished { board, .. } => board,
        }
    }

    /// Returns the move history for any game phase.
    pub fn history(&self) -> &[Move] {
        match self {
            AnyGame::InProgress { history, .. } => history,
            AnyGame::Finished { history, .. } => history,
        }
    }

    /// Returns a status string for display.
    pub fn status_string(&self) -> String {
        match self {
            AnyGame::InProgress { to_move, .. } => format!("Player {:?}'s turn", to_move),
            AnyGame::Finished { outcome, .. } => match outcome {
                Outcome::Winner(player) => format!("Player {:?} has won!", player),
                Outcome::Draw => "The game is a draw!".to_string(),
            },
        }
    }

    /// Returns true if the game is over.
    pub fn is_over(&self) -> bool {
        matches!(self, AnyGame::Finished { .. })
    }

    /// Returns the current player to move, if the game is in progress.
    pub fn to_move(&self) -> Option<Player> {
        match self {
            AnyGame::InProgress { to_move, .. } => Some(*to_move),
            AnyGame::Finished { .. } => None,
        }
    }

    /// Returns the outcome, if the game is finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            AnyGame::InProgress { .. } => None,
            AnyGame::Finished { outcome, .. } => Some(*outcome),
        }
    }

    /// Returns the winner, if the game is won.
    pub fn winner(&self) -> Option<Player> {
        self.outcome().and_then(|outcome| outcome.winner())
    }

    /// Makes a move, returning the resulting game.
    ///
    /// Delegates to the typestate engine so every move passes through
    /// the same contract validation as direct typestate play. The
    /// wrapped game is not modified on error.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] on a finished game, or the
    /// underlying contract violation for an illegal move.
    #[instrument(skip(self))]
    pub fn make_move(&self, action: Move) -> Result<AnyGame, MoveError> {
        match self {
            AnyGame::InProgress {
                board,
                to_move,
                history,
            } => {
                let game = GameInProgress {
                    board: board.clone(),
                    history: history.clone(),
                    to_move: *to_move,
                };
                game.make_move(action).map(AnyGame::from)
            }
            AnyGame::Finished { .. } => Err(MoveError::GameOver),
        }
    }
}
