//! Action vocabulary and the round history log.
//!
//! Actions are plain values; building one is just constructing the enum
//! variant. The serialized form is a `type` tag plus an optional `payload`
//! object.

use core::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::side_bets::SideBetStakes;

/// Which of the two player hands an action targets.
///
/// `left` only exists after a split; `right` is the primary hand and always
/// plays first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// The primary hand.
    Right,
    /// The hand created by a split.
    Left,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Right => "right",
            Self::Left => "left",
        })
    }
}

/// A game action submitted to dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    /// Returns the current state without touching it.
    #[serde(rename = "RESTORE")]
    Restore,
    /// Opens a round: deals the player and the dealer, locking the main bet
    /// and any side-bet stakes.
    #[serde(rename = "DEAL", rename_all = "camelCase")]
    Deal {
        /// Main stake for the round.
        bet: f64,
        /// Side-bet stakes, locked at deal time.
        #[serde(default)]
        side_bets: SideBetStakes,
    },
    /// Wagers against a dealer blackjack; a zero bet declines.
    #[serde(rename = "INSURANCE")]
    Insurance {
        /// Insurance stake, capped at half the initial bet.
        bet: f64,
    },
    /// Splits the right hand's pair into two hands.
    #[serde(rename = "SPLIT")]
    Split,
    /// Draws one card onto a hand.
    #[serde(rename = "HIT")]
    Hit {
        /// Target hand.
        position: Position,
    },
    /// Doubles the bet, draws one card, and closes the hand.
    #[serde(rename = "DOUBLE")]
    Double {
        /// Target hand.
        position: Position,
    },
    /// Closes a hand at its current total.
    #[serde(rename = "STAND")]
    Stand {
        /// Target hand.
        position: Position,
    },
    /// Forfeits the right hand for half the bet.
    #[serde(rename = "SURRENDER")]
    Surrender,
    /// Reveals the hole card and runs the dealer to completion.
    #[serde(rename = "SHOWDOWN", rename_all = "camelCase")]
    Showdown {
        /// When set, the dealer only reveals the hole card and draws nothing.
        #[serde(default)]
        dealer_hole_card_only: bool,
    },
    /// Draws one card for the dealer, or consumes the reserved hole card.
    #[serde(rename = "DEALER-HIT", rename_all = "camelCase")]
    DealerHit {
        /// The pre-reserved hole card, when this hit reveals it.
        #[serde(default)]
        dealer_hole_card: Option<Card>,
    },
    /// A rejected action, kept in history with the reason it was refused.
    #[serde(rename = "INVALID")]
    Invalid {
        /// The offending action.
        action: Box<Action>,
        /// Human-readable rejection reason.
        reason: String,
    },
}

impl Action {
    /// Wraps a rejected action together with the rejection reason.
    #[must_use]
    pub fn invalid(action: Self, reason: impl Into<String>) -> Self {
        Self::Invalid {
            action: Box::new(action),
            reason: reason.into(),
        }
    }

    /// The wire name of the action, used in rejection reasons.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Restore => "RESTORE",
            Self::Deal { .. } => "DEAL",
            Self::Insurance { .. } => "INSURANCE",
            Self::Split => "SPLIT",
            Self::Hit { .. } => "HIT",
            Self::Double { .. } => "DOUBLE",
            Self::Stand { .. } => "STAND",
            Self::Surrender => "SURRENDER",
            Self::Showdown { .. } => "SHOWDOWN",
            Self::DealerHit { .. } => "DEALER-HIT",
            Self::Invalid { .. } => "INVALID",
        }
    }

    /// The player position the action targets, if any.
    ///
    /// Insurance, split, and surrender always target the right hand; they are
    /// only legal before a split creates the left one.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Hit { position } | Self::Double { position } | Self::Stand { position } => {
                Some(*position)
            }
            Self::Insurance { .. } | Self::Split | Self::Surrender => Some(Position::Right),
            _ => None,
        }
    }
}

/// One entry in the round's append-only audit log.
///
/// The log is what later stages consult to learn whether a split occurred and
/// how much stake has accumulated; `value` carries the monetary amount an
/// action committed (deal, split, double, insurance) and is reduced into the
/// final bet at settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// The applied action.
    #[serde(flatten)]
    pub action: Action,
    /// Monetary stake the action committed.
    pub value: f64,
    /// Epoch milliseconds when the action was applied.
    pub ts: u64,
    /// Cards newly revealed by the action, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cards: Option<Vec<Card>>,
}

impl HistoryItem {
    /// Stamps `action` with the current wall-clock time.
    #[must_use]
    pub fn record(action: Action, value: f64, cards: Option<Vec<Card>>) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        Self {
            action,
            value,
            ts,
            cards,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn actions_serialize_with_type_and_payload() {
        assert_eq!(
            serde_json::to_value(Action::Restore).unwrap(),
            json!({ "type": "RESTORE" })
        );
        assert_eq!(
            serde_json::to_value(Action::Hit {
                position: Position::Left
            })
            .unwrap(),
            json!({ "type": "HIT", "payload": { "position": "left" } })
        );
        assert_eq!(
            serde_json::to_value(Action::Deal {
                bet: 10.0,
                side_bets: SideBetStakes::default(),
            })
            .unwrap(),
            json!({
                "type": "DEAL",
                "payload": { "bet": 10.0, "sideBets": { "luckyLucky": 0.0, "perfectPairs": 0.0 } }
            })
        );
    }

    #[test]
    fn dealer_hit_uses_the_hyphenated_tag() {
        let action = Action::DealerHit {
            dealer_hole_card: None,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], json!("DEALER-HIT"));
        let back: Action = serde_json::from_value(value).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn invalid_wraps_the_offending_action() {
        let action = Action::invalid(Action::Split, "SPLIT is not allowed when stage is ready");
        assert_eq!(action.name(), "INVALID");
        let Action::Invalid { action, reason } = action else {
            panic!("expected an invalid action");
        };
        assert_eq!(*action, Action::Split);
        assert!(reason.contains("SPLIT"));
    }
}
