//! Tic-tac-toe game core with an optimal-play opponent and timed replay.
//!
//! This library is the game core only: board model, rules, adversarial
//! search, the authoritative game state machine, and a timed replay of
//! recorded histories. Rendering and interaction belong to the host,
//! which consumes the [`GameController`] interface.
//!
//! # Architecture
//!
//! - **Board model**: [`Board`], [`Square`], [`Player`], [`Position`]
//! - **Rules**: pure win/draw/legal-move functions in [`rules`]
//! - **Search**: minimax with alpha-beta pruning in [`search`]
//! - **State machine**: typestate phases ([`GameSetup`],
//!   [`GameInProgress`], [`GameFinished`]) with contract-validated moves
//! - **Replay**: [`ReplayCursor`] shadow stepping, paced by the controller
//! - **Controller**: [`GameController`], one authoritative game per session
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_engine::{ControllerConfig, GameController};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (event_tx, _events) = mpsc::unbounded_channel();
//! let controller = GameController::new(ControllerConfig::default(), event_tx);
//!
//! // X plays the top-left cell; the computer answers as O.
//! controller.on_cell_activated(0, 0).await?;
//!
//! let state = controller.display_state().await;
//! assert_eq!(state.status_text, "Player X's turn");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod contracts;
mod controller;
mod phases;
mod position;
mod replay;
mod search;
mod types;
mod typestate;
mod wrapper;

// Public rule functions and invariants keep their namespaces
pub mod invariants;
pub mod rules;

// Crate-level exports - board model
pub use position::Position;
pub use types::{Board, Player, Square};

// Crate-level exports - actions and outcomes
pub use action::{Move, MoveError};
pub use phases::Outcome;

// Crate-level exports - typestate game
pub use typestate::{GameFinished, GameInProgress, GameResult, GameSetup};
pub use wrapper::AnyGame;

// Crate-level exports - contracts
pub use contracts::{Contract, LegalMove, MoveContract, PlayersTurn, SquareIsEmpty};

// Crate-level exports - search
pub use search::{SearchError, best_move, evaluate};

// Crate-level exports - replay
pub use replay::{ReplayCursor, ReplayError, ReplayStep};

// Crate-level exports - session controller
pub use controller::{ControllerConfig, DisplayState, GameController, GameEvent};
