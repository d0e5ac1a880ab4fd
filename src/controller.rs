//! Game session controller.
//!
//! One [`GameController`] owns the single authoritative game for a
//! session. Every mutation funnels through its entry points: user
//! cell activation, reset, and replay. The computer opponent is
//! triggered here, and the timed replay runs here, publishing display
//! state over an event channel for push-style hosts while
//! [`GameController::display_state`] serves pull-style hosts.

use crate::action::Move;
use crate::phases::Outcome;
use crate::position::Position;
use crate::replay::{ReplayCursor, ReplayError};
use crate::search;
use crate::types::{Board, Player, Square};
use crate::typestate::GameSetup;
use crate::wrapper::AnyGame;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Side played by the search engine, or `None` for two humans.
    pub computer: Option<Player>,
    /// Pause between re-enacted moves during replay.
    pub replay_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            computer: Some(Player::O),
            replay_interval: Duration::from_millis(1000),
        }
    }
}

/// Messages sent from the controller to the host.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// Move was made (live play only).
    MoveMade {
        /// The player who moved.
        player: Player,
        /// Where the mark was placed.
        position: Position,
    },
    /// Displayed state updated.
    StateChanged(DisplayState),
    /// Game ended.
    GameOver {
        /// The final outcome.
        outcome: Outcome,
    },
    /// Replay started.
    ReplayStarted,
    /// Replay finished; the live state is restored.
    ReplayFinished,
}

/// Read-only projection of the displayed game for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// The displayed grid, `grid[row][col]`.
    pub grid: [[Square; 3]; 3],
    /// User-visible status line.
    pub status_text: String,
    /// True when cell activation is currently ignored.
    pub input_disabled: bool,
}

/// Session mode: live play or replay in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    Replaying,
}

/// Displayed projection while a replay is running.
///
/// The authoritative game is untouched during replay; this shadow
/// view is what the host sees instead.
#[derive(Debug, Clone)]
struct ShadowView {
    board: Board,
}

struct Session {
    game: AnyGame,
    status: String,
    mode: Mode,
    shadow: Option<ShadowView>,
}

impl Session {
    fn new() -> Self {
        let game: AnyGame = GameSetup::new().start(Player::X).into();
        let status = game.status_string();
        Self {
            game,
            status,
            mode: Mode::Live,
            shadow: None,
        }
    }

    fn project(&self) -> DisplayState {
        let board = match &self.shadow {
            Some(shadow) => &shadow.board,
            None => self.game.board(),
        };
        let mut grid = [[Square::Empty; 3]; 3];
        for pos in Position::ALL {
            grid[pos.row()][pos.col()] = board.get(pos);
        }
        DisplayState {
            grid,
            status_text: self.status.clone(),
            input_disabled: self.mode == Mode::Replaying || self.game.is_over(),
        }
    }
}

/// Owns the authoritative game for one session.
///
/// Cloning the controller yields another handle to the same session,
/// so a host can drive input from one task while a replay runs in
/// another. Mutual exclusion between user moves, the computer
/// opponent and replay is structural: the `Replaying` mode gates the
/// first two.
#[derive(Clone)]
pub struct GameController {
    session: Arc<Mutex<Session>>,
    config: ControllerConfig,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl GameController {
    /// Creates a controller with an empty live game, X to move.
    ///
    /// Events are published to `event_tx`; publication is best-effort
    /// and a dropped receiver never fails the game.
    #[instrument(skip(event_tx))]
    pub fn new(config: ControllerConfig, event_tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        info!(?config, "Creating game controller");
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            config,
            events: event_tx,
        }
    }

    /// Returns the current display projection.
    pub async fn display_state(&self) -> DisplayState {
        self.session.lock().await.project()
    }

    /// Returns a snapshot of the authoritative game.
    pub async fn game(&self) -> AnyGame {
        self.session.lock().await.game.clone()
    }

    /// Returns true while a replay is running.
    pub async fn is_replaying(&self) -> bool {
        self.session.lock().await.mode == Mode::Replaying
    }

    /// Handles a user activating a cell.
    ///
    /// The move is made for whichever player is to move. Activations
    /// are ignored while a replay runs, when the game is over, when
    /// the cell is occupied, or when the coordinates fall outside the
    /// board - state is left unchanged in every such case.
    #[instrument(skip(self))]
    pub async fn on_cell_activated(&self, row: usize, col: usize) -> Result<()> {
        let mut session = self.session.lock().await;

        if session.mode == Mode::Replaying {
            debug!("Cell activation ignored: replay in progress");
            return Ok(());
        }
        let Some(pos) = Position::from_row_col(row, col) else {
            warn!(row, col, "Cell activation ignored: out of bounds");
            return Ok(());
        };
        let Some(player) = session.game.to_move() else {
            debug!("Cell activation ignored: game is over");
            return Ok(());
        };

        if self.apply_move(&mut session, Move::new(player, pos)) {
            self.run_computer_turn(&mut session)?;
        }
        Ok(())
    }

    /// Resets to an empty live game with X to move.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::ResetDuringReplay`] while a replay is
    /// running; the session is unchanged in that case.
    #[instrument(skip(self))]
    pub async fn on_reset_requested(&self) -> Result<()> {
        let mut session = self.session.lock().await;

        if session.mode == Mode::Replaying {
            warn!("Reset rejected: replay in progress");
            return Err(ReplayError::ResetDuringReplay.into());
        }

        info!("Resetting game");
        session.game = GameSetup::new().start(Player::X).into();
        session.status = session.game.status_string();
        self.publish(GameEvent::StateChanged(session.project()));

        // A computer playing X opens immediately.
        self.run_computer_turn(&mut session)?;
        Ok(())
    }

    /// Re-enacts the recorded history, one move per replay interval.
    ///
    /// The displayed board is cleared and each recorded move is
    /// applied to a private shadow board, published in order. After
    /// the final move the pre-replay status is restored verbatim and
    /// the authoritative game - untouched throughout - is displayed
    /// again. Runs to completion; there is no cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EmptyHistory`] or
    /// [`ReplayError::AlreadyReplaying`] without touching any state;
    /// both are recoverable no-ops for the host.
    #[instrument(skip(self))]
    pub async fn on_replay_requested(&self) -> Result<(), ReplayError> {
        let (mut cursor, saved_status) = {
            let mut session = self.session.lock().await;

            if session.mode == Mode::Replaying {
                debug!("Replay request ignored: already replaying");
                return Err(ReplayError::AlreadyReplaying);
            }
            if session.game.history().is_empty() {
                debug!("Replay request ignored: no history");
                return Err(ReplayError::EmptyHistory);
            }

            info!(moves = session.game.history().len(), "Starting replay");
            let saved_status = session.status.clone();
            session.mode = Mode::Replaying;
            session.shadow = Some(ShadowView {
                board: Board::new(),
            });
            session.status = format!("Player {:?}'s turn", Player::X);
            self.publish(GameEvent::ReplayStarted);
            self.publish(GameEvent::StateChanged(session.project()));

            (ReplayCursor::new(session.game.history()), saved_status)
        };

        while cursor.remaining() > 0 {
            // Suspend outside the lock so the host can poll (and be
            // refused) between steps.
            sleep(self.config.replay_interval).await;
            let Some(step) = cursor.advance() else { break };

            let mut session = self.session.lock().await;
            if step.is_last {
                // Restore the snapshotted pre-replay view verbatim;
                // the authoritative game was never modified.
                session.status = saved_status.clone();
                session.shadow = None;
                session.mode = Mode::Live;
            } else {
                let next = step.mov.player.opponent();
                session.status = format!("Player {:?}'s turn", next);
                if let Some(shadow) = session.shadow.as_mut() {
                    shadow.board = step.board.clone();
                }
            }
            self.publish(GameEvent::StateChanged(session.project()));
            if step.is_last {
                info!("Replay finished");
                self.publish(GameEvent::ReplayFinished);
            }
        }

        Ok(())
    }

    /// Applies one validated move, updating status and publishing
    /// events. Returns true if the move was applied.
    fn apply_move(&self, session: &mut Session, action: Move) -> bool {
        match session.game.make_move(action) {
            Ok(next) => {
                session.game = next;
                session.status = session.game.status_string();
                debug!(%action, status = %session.status, "Move applied");
                self.publish(GameEvent::MoveMade {
                    player: action.player,
                    position: action.position,
                });
                self.publish(GameEvent::StateChanged(session.project()));
                if let Some(outcome) = session.game.outcome() {
                    info!(%outcome, "Game over");
                    self.publish(GameEvent::GameOver { outcome });
                }
                true
            }
            Err(e) => {
                debug!(%action, error = %e, "Move rejected");
                false
            }
        }
    }

    /// Invokes the search and applies its move when it is the
    /// computer's turn in a live, in-progress game.
    fn run_computer_turn(&self, session: &mut Session) -> Result<()> {
        let Some(computer) = self.config.computer else {
            return Ok(());
        };
        if session.mode == Mode::Replaying {
            return Ok(());
        }
        while let Some(to_move) = session.game.to_move() {
            if to_move != computer {
                break;
            }
            // In progress implies a non-terminal, non-full board, so
            // the search contract holds.
            let pos = search::best_move(session.game.board(), to_move)?;
            info!(position = %pos, "Computer move");
            if !self.apply_move(session, Move::new(to_move, pos)) {
                break;
            }
        }
        Ok(())
    }

    /// Best-effort event publication.
    fn publish(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
