//! A serializable rules engine for multi-hand casino blackjack.
//!
//! The crate maintains one round's authoritative state and enforces
//! casino-accurate legality, hand scoring, and payout. A [`Game`] wraps a
//! plain-value [`GameState`]: construct one fresh or rehydrate a persisted
//! snapshot, [`Game::dispatch`] an [`Action`], and persist the returned
//! state. Rule violations never fail the call; the offending action is
//! rewritten as [`Action::Invalid`] and appended to the round history.
//!
//! # Example
//!
//! ```
//! use twentyone::{Action, Game, Position, Rules, Stage};
//!
//! let mut game = Game::new(Rules::default().with_insurance(false), 42);
//! game.dispatch(Action::Deal {
//!     bet: 10.0,
//!     side_bets: Default::default(),
//! });
//! let state = game.dispatch(Action::Stand {
//!     position: Position::Right,
//! });
//! assert_eq!(state.stage, Stage::Done);
//! ```

pub mod actions;
pub mod card;
pub mod error;
pub mod game;
pub mod hand;
pub mod rules;
pub mod side_bets;

// Re-export main types
pub use actions::{Action, HistoryItem, Position};
pub use card::{Card, Color, DECK_SIZE, Suit};
pub use error::CardParseError;
pub use game::{Game, GameState, HandInfo, Prizes, Stage, dispatch, is_action_allowed};
pub use hand::{AvailableActions, Hand, HandValue};
pub use rules::{DoublePolicy, Rules};
pub use side_bets::{AvailableSideBets, InsuranceOutcome, SideBetStakes, SideBetsInfo};
