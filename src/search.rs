//! Adversarial search for the computer opponent.
//!
//! Minimax with alpha-beta pruning over the full game tree. The state
//! space is at most 9! positions and far smaller after pruning, so the
//! search runs exhaustively and synchronously in the caller's task.
//!
//! Scores are always from X's perspective: an X win is worth
//! `10 - depth`, an O win `depth - 10`, a draw `0`. Depth-sensitivity
//! makes the engine prefer faster wins and slower losses, which is
//! required for optimal non-dithering play. X maximizes this score and
//! O minimizes it, so the same evaluation serves both sides.

use crate::position::Position;
use crate::rules;
use crate::types::{Board, Player, Square};
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// Error that can occur when invoking the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SearchError {
    /// The board has no legal moves: it is full or already won.
    ///
    /// Callers must guarantee a non-terminal board before searching;
    /// this is a contract violation, defensively checked.
    #[display("No legal moves to search")]
    NoLegalMoves,
}

impl std::error::Error for SearchError {}

const WIN_SCORE: i32 = 10;

/// Returns the optimal move for the side to move.
///
/// Children are scanned in row-major order and ties go to the first
/// move found, so the result is deterministic for a given board.
///
/// # Errors
///
/// Returns [`SearchError::NoLegalMoves`] if the board is full or
/// already has a winner.
#[instrument(skip(board))]
pub fn best_move(board: &Board, to_move: Player) -> Result<Position, SearchError> {
    evaluate(board, to_move).map(|(pos, _)| pos)
}

/// Returns the optimal move for the side to move along with its score.
///
/// The score is from X's perspective regardless of which side moves;
/// X picks the child maximizing it, O the child minimizing it.
#[instrument(skip(board))]
pub fn evaluate(board: &Board, to_move: Player) -> Result<(Position, i32), SearchError> {
    if rules::check_winner(board).is_some() {
        return Err(SearchError::NoLegalMoves);
    }

    // Search mutates a private scratch copy; every placement is undone
    // before the next candidate, so no caller observes a mid-search board.
    let mut scratch = board.clone();
    let mut best: Option<(Position, i32)> = None;

    for pos in Position::iter() {
        if !scratch.is_empty(pos) {
            continue;
        }
        scratch.set(pos, Square::Occupied(to_move));
        let score = minimax(&mut scratch, to_move.opponent(), 0, i32::MIN, i32::MAX);
        scratch.set(pos, Square::Empty);

        let better = match best {
            None => true,
            Some((_, best_score)) => match to_move {
                Player::X => score > best_score,
                Player::O => score < best_score,
            },
        };
        if better {
            best = Some((pos, score));
        }
    }

    match best {
        Some((pos, score)) => {
            debug!(position = %pos, score, ?to_move, "search complete");
            Ok((pos, score))
        }
        None => Err(SearchError::NoLegalMoves),
    }
}

/// Recursive minimax with alpha-beta pruning.
///
/// `alpha` is the best score the maximizer can already guarantee on
/// the current path, `beta` the minimizer's counterpart; once
/// `beta <= alpha` the remaining siblings cannot affect the result
/// and are skipped. Pruning never changes the returned score.
fn minimax(board: &mut Board, to_move: Player, depth: i32, mut alpha: i32, mut beta: i32) -> i32 {
    if let Some(winner) = rules::check_winner(board) {
        return match winner {
            Player::X => WIN_SCORE - depth,
            Player::O => depth - WIN_SCORE,
        };
    }
    if rules::is_full(board) {
        return 0;
    }

    match to_move {
        Player::X => {
            let mut best = i32::MIN;
            for pos in Position::iter() {
                if !board.is_empty(pos) {
                    continue;
                }
                board.set(pos, Square::Occupied(Player::X));
                let score = minimax(board, Player::O, depth + 1, alpha, beta);
                board.set(pos, Square::Empty);
                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
        Player::O => {
            let mut best = i32::MAX;
            for pos in Position::iter() {
                if !board.is_empty(pos) {
                    continue;
                }
                board.set(pos, Square::Occupied(Player::O));
                let score = minimax(board, Player::X, depth + 1, alpha, beta);
                board.set(pos, Square::Empty);
                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(marks: &[(Position, Player)]) -> Board {
        let mut board = Board::new();
        for (pos, player) in marks {
            board.set(*pos, Square::Occupied(*player));
        }
        board
    }

    #[test]
    fn test_empty_board_first_match_tie_break() {
        // All first moves score a draw under optimal play, so the
        // row-major scan settles on the first candidate.
        let board = Board::new();
        assert_eq!(best_move(&board, Player::X), Ok(Position::TopLeft));
    }

    #[test]
    fn test_takes_immediate_win() {
        // X X .
        // O O .
        // . . .
        let board = board_from(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::X),
            (Position::MiddleLeft, Player::O),
            (Position::Center, Player::O),
        ]);
        assert_eq!(best_move(&board, Player::X), Ok(Position::TopRight));
    }

    #[test]
    fn test_blocks_opponent_win() {
        // X X .
        // . O .
        // . . O
        let board = board_from(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::X),
            (Position::Center, Player::O),
            (Position::BottomRight, Player::O),
        ]);
        assert_eq!(best_move(&board, Player::O), Ok(Position::TopRight));
    }

    #[test]
    fn test_prefers_faster_win() {
        // X X .
        // O O .
        // . . .
        // X to move: TopRight wins now. Blocking O at MiddleRight
        // keeps the game going, so whatever it yields scores below
        // the immediate win.
        let board = board_from(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::X),
            (Position::MiddleLeft, Player::O),
            (Position::Center, Player::O),
        ]);
        let (pos, score) = evaluate(&board, Player::X).unwrap();
        assert_eq!(pos, Position::TopRight);
        assert_eq!(score, WIN_SCORE);

        let mut scratch = board.clone();
        scratch.set(Position::MiddleRight, Square::Occupied(Player::X));
        let deferred = minimax(&mut scratch, Player::O, 0, i32::MIN, i32::MAX);
        assert!(deferred < WIN_SCORE);
    }

    #[test]
    fn test_prefers_slower_loss() {
        // X O .
        // . X .
        // . . .
        // O to move is lost either way: leaving the diagonal open
        // loses on X's next move (X-score 9); blocking at BottomRight
        // drags the loss out to depth 3 (X-score 7). The minimizer
        // must block.
        let board = board_from(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::O),
            (Position::Center, Player::X),
        ]);
        let (pos, score) = evaluate(&board, Player::O).unwrap();
        assert_eq!(pos, Position::BottomRight);
        assert_eq!(score, WIN_SCORE - 3);
    }

    #[test]
    fn test_no_legal_moves_on_won_board() {
        let board = board_from(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::X),
            (Position::TopRight, Player::X),
            (Position::MiddleLeft, Player::O),
            (Position::Center, Player::O),
        ]);
        assert_eq!(best_move(&board, Player::O), Err(SearchError::NoLegalMoves));
    }

    #[test]
    fn test_no_legal_moves_on_full_board() {
        // Full draw board: X O X / O X X / O X O
        let board = board_from(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::O),
            (Position::TopRight, Player::X),
            (Position::MiddleLeft, Player::O),
            (Position::Center, Player::X),
            (Position::MiddleRight, Player::X),
            (Position::BottomLeft, Player::O),
            (Position::BottomCenter, Player::X),
            (Position::BottomRight, Player::O),
        ]);
        assert_eq!(best_move(&board, Player::X), Err(SearchError::NoLegalMoves));
    }

    #[test]
    fn test_repeated_searches_agree() {
        // The scratch board must be fully restored on every exit path,
        // including pruning breaks, so repeated searches of the same
        // position return identical results.
        let board = board_from(&[(Position::Center, Player::X)]);
        let first = evaluate(&board, Player::O).unwrap();
        let second = evaluate(&board, Player::O).unwrap();
        assert_eq!(first, second);
    }
}
