//! Game engine: dispatch entry, action validation, and the reducer work list.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::actions::{Action, Position};
use crate::hand::Hand;
use crate::rules::Rules;

mod dealer;
mod reduce;
pub mod state;

pub use dealer::{Prizes, get_prize, get_prizes};
pub use state::{GameState, HandInfo, Stage};

/// A blackjack round engine.
///
/// `Game` wraps a [`GameState`] value; [`Game::dispatch`] is the only
/// mutation path. The state is a plain serializable value with no shared
/// resources, so the intended pattern per request is: rehydrate, dispatch
/// once, persist the returned snapshot.
pub struct Game {
    state: GameState,
}

impl Game {
    /// Creates a game at stage `ready` with a freshly shuffled shoe.
    ///
    /// # Example
    ///
    /// ```
    /// use twentyone::{Game, Rules, Stage};
    ///
    /// let game = Game::new(Rules::default(), 42);
    /// assert_eq!(game.state().stage, Stage::Ready);
    /// assert_eq!(game.state().deck.len(), 52);
    /// ```
    #[must_use]
    pub fn new(rules: Rules, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self {
            state: GameState::fresh(rules, &mut rng),
        }
    }

    /// Rehydrates a game from a previously returned state snapshot.
    #[must_use]
    pub const fn from_state(state: GameState) -> Self {
        Self { state }
    }

    /// Returns the current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Consumes the game, returning the state for persistence.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Applies `action` and returns the new externally stable state.
    pub fn dispatch(&mut self, action: Action) -> &GameState {
        self.state = dispatch(&self.state, action);
        &self.state
    }
}

/// Applies `action` to `state`, returning the next externally stable state.
///
/// This never fails for a reachable state: an illegal request is rewritten as
/// [`Action::Invalid`], appended to history, and the gameplay state is left
/// unchanged. Chained automatic transitions (blackjack auto-showdown, the
/// dealer draw loop) are drained from an internal work list before returning,
/// so the returned stage is always stable.
#[must_use]
pub fn dispatch(state: &GameState, action: Action) -> GameState {
    let mut next = state.clone();
    let action = validate(&next, action);
    debug!(action = action.name(), stage = %next.stage, "dispatch");

    let mut queue = VecDeque::new();
    reduce::apply(&mut next, action, &mut queue);
    while let Some(followup) = queue.pop_front() {
        reduce::apply_followup(&mut next, followup, &mut queue);
    }
    next
}

/// Stage legality table: which action kinds may even be requested right now.
///
/// `RESTORE` is legal from any stage; `done` accepts a fresh `DEAL`.
#[must_use]
pub const fn is_action_allowed(action: &Action, stage: Stage) -> bool {
    if matches!(action, Action::Restore) {
        return true;
    }
    match stage {
        Stage::Ready | Stage::Done => matches!(action, Action::Deal { .. }),
        Stage::PlayerTurnRight => matches!(
            action,
            Action::Stand { .. }
                | Action::Insurance { .. }
                | Action::Surrender
                | Action::Split
                | Action::Hit { .. }
                | Action::Double { .. }
        ),
        Stage::PlayerTurnLeft => matches!(
            action,
            Action::Stand { .. } | Action::Hit { .. } | Action::Double { .. }
        ),
        Stage::Showdown => matches!(action, Action::Showdown { .. } | Action::Stand { .. }),
        Stage::DealerTurn => matches!(action, Action::DealerHit { .. }),
    }
}

const fn allowed_on_hand(action: &Action, hand: &Hand) -> bool {
    let actions = hand.available_actions;
    match action {
        Action::Hit { .. } => actions.hit,
        Action::Double { .. } => actions.double,
        Action::Stand { .. } => actions.stand,
        Action::Split => actions.split,
        Action::Insurance { .. } => actions.insurance,
        Action::Surrender => actions.surrender,
        _ => true,
    }
}

/// The legality gate in front of the reducer.
///
/// Returns the action unchanged when it may be applied, or an
/// [`Action::Invalid`] wrapper carrying the rejection reason.
fn validate(state: &GameState, action: Action) -> Action {
    if !is_action_allowed(&action, state.stage) {
        let reason = format!(
            "{} is not allowed when stage is {}",
            action.name(),
            state.stage
        );
        return Action::invalid(action, reason);
    }

    if let Action::Deal { bet, .. } = &action {
        if !bet.is_finite() || *bet < 0.0 {
            return Action::invalid(action, "DEAL requires a non-negative bet");
        }
    }

    // Restore, Deal, Showdown, and DealerHit carry no player position and
    // skip the hand gate.
    let Some(position) = action.position() else {
        return action;
    };

    if position == Position::Left && !state.has_split() {
        return Action::invalid(action, "position left does not exist before a split");
    }
    let Some(hand) = state.hand_info.get(position) else {
        return Action::invalid(action, format!("no hand at position {position}"));
    };
    if hand.closed {
        return Action::invalid(action, format!("{position} hand is closed"));
    }
    if position == Position::Left && state.hand_info.is_open(Position::Right) {
        return Action::invalid(action, "right hand must finish before left can act");
    }
    if !allowed_on_hand(&action, hand) {
        let reason = format!("{} is not allowed on the {position} hand", action.name());
        return Action::invalid(action, reason);
    }

    action
}
