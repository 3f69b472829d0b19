//! Round state types.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::{Action, HistoryItem, Position};
use crate::card::{self, Card};
use crate::hand::{Hand, HandValue};
use crate::rules::Rules;
use crate::side_bets::{AvailableSideBets, SideBetsInfo};

/// Coarse phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Waiting for a deal.
    #[serde(rename = "ready")]
    Ready,
    /// The right (primary) hand is acting.
    #[serde(rename = "player-turn-right")]
    PlayerTurnRight,
    /// The left (split) hand is acting.
    #[serde(rename = "player-turn-left")]
    PlayerTurnLeft,
    /// Player hands are decided; the dealer is about to be revealed.
    #[serde(rename = "showdown")]
    Showdown,
    /// The dealer is drawing.
    #[serde(rename = "dealer-turn")]
    DealerTurn,
    /// The round is settled.
    #[serde(rename = "done")]
    Done,
}

impl Stage {
    /// The player-turn stage for a position.
    #[must_use]
    pub const fn player_turn(position: Position) -> Self {
        match position {
            Position::Right => Self::PlayerTurnRight,
            Position::Left => Self::PlayerTurnLeft,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ready => "ready",
            Self::PlayerTurnRight => "player-turn-right",
            Self::PlayerTurnLeft => "player-turn-left",
            Self::Showdown => "showdown",
            Self::DealerTurn => "dealer-turn",
            Self::Done => "done",
        })
    }
}

/// The two player hand slots.
///
/// Both slots always exist structurally; `left` stays empty until a split
/// creates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandInfo {
    /// The hand created by a split.
    pub left: Option<Hand>,
    /// The primary hand.
    pub right: Option<Hand>,
}

impl HandInfo {
    /// The hand at `position`, if dealt.
    #[must_use]
    pub const fn get(&self, position: Position) -> Option<&Hand> {
        match position {
            Position::Right => self.right.as_ref(),
            Position::Left => self.left.as_ref(),
        }
    }

    /// Replaces the hand at `position`.
    pub fn set(&mut self, position: Position, hand: Hand) {
        match position {
            Position::Right => self.right = Some(hand),
            Position::Left => self.left = Some(hand),
        }
    }

    /// True when the slot holds a hand that is not closed.
    #[must_use]
    pub fn is_open(&self, position: Position) -> bool {
        self.get(position).is_some_and(|hand| !hand.closed)
    }
}

/// Authoritative state of one blackjack round.
///
/// A plain serializable value: rehydrate it, dispatch one action, persist the
/// returned snapshot. Nothing is retained across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Current phase of the round.
    pub stage: Stage,
    /// Cards not yet dealt. Strip this field before exposing state to an
    /// untrusted client; it reveals future cards.
    pub deck: Vec<Card>,
    /// The player's hand slots.
    pub hand_info: HandInfo,
    /// The dealer's visible cards.
    pub dealer_cards: Vec<Card>,
    /// The dealer's concealed second card, reserved at deal time and revealed
    /// at showdown.
    pub dealer_hole_card: Option<Card>,
    /// Value of the dealer's visible cards.
    pub dealer_value: Option<HandValue>,
    /// Whether the revealed dealer hand is a blackjack.
    pub dealer_has_blackjack: bool,
    /// Whether the dealer has busted.
    pub dealer_has_busted: bool,
    /// Main stake locked at deal time.
    pub initial_bet: f64,
    /// Cumulative stake over the round, reduced from history at settlement.
    pub final_bet: f64,
    /// Total winnings across both positions.
    pub final_win: f64,
    /// Winnings on the right hand.
    pub won_on_right: f64,
    /// Winnings on the left hand.
    pub won_on_left: f64,
    /// Append-only log of applied actions.
    pub history: Vec<HistoryItem>,
    /// Side bets the table offers.
    pub available_side_bets: AvailableSideBets,
    /// Side-bet winnings, computed at deal time.
    pub side_bets_info: Option<SideBetsInfo>,
    /// Table rules the round is played under.
    pub rules: Rules,
    /// Count of state mutations applied.
    pub hits: u32,
}

impl GameState {
    /// Fresh `ready` state with a newly shuffled shoe of `rules.decks` decks.
    #[must_use]
    pub fn fresh<R: Rng + ?Sized>(rules: Rules, rng: &mut R) -> Self {
        Self {
            stage: Stage::Ready,
            deck: card::shuffle(&card::new_decks(rules.decks.max(1)), rng),
            hand_info: HandInfo::default(),
            dealer_cards: Vec::new(),
            dealer_hole_card: None,
            dealer_value: None,
            dealer_has_blackjack: false,
            dealer_has_busted: false,
            initial_bet: 0.0,
            final_bet: 0.0,
            final_win: 0.0,
            won_on_right: 0.0,
            won_on_left: 0.0,
            history: Vec::new(),
            available_side_bets: AvailableSideBets::default(),
            side_bets_info: None,
            rules,
            hits: 0,
        }
    }

    /// True once a split has occurred this round.
    #[must_use]
    pub fn has_split(&self) -> bool {
        self.history
            .iter()
            .any(|item| matches!(item.action, Action::Split))
    }
}
