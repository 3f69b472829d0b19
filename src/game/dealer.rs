//! Dealer play and round settlement.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::actions::{Action, HistoryItem};
use crate::card::Card;
use crate::hand::{self, Hand};

use super::reduce::{self, Followup};
use super::state::{GameState, Stage};

/// Begins the dealer reveal.
///
/// The hole card is consumed through an internal dealer hit. When every live
/// position is already busted or holds blackjack, or when only the reveal was
/// requested (surrender), the round settles right after it without further
/// draws.
pub(super) fn showdown(
    state: &mut GameState,
    dealer_hole_card_only: bool,
    queue: &mut VecDeque<Followup>,
) {
    state.history.push(HistoryItem::record(
        Action::Showdown {
            dealer_hole_card_only,
        },
        0.0,
        None,
    ));
    state.hits += 1;
    state.stage = Stage::DealerTurn;

    let decided = |hand: Option<&Hand>| hand.is_none_or(|h| h.is_busted || h.is_blackjack);
    let all_decided = decided(state.hand_info.right.as_ref())
        && (!state.has_split() || decided(state.hand_info.left.as_ref()));

    let hole_card = state.dealer_hole_card;
    queue.push_back(Followup::DealerHit {
        card: hole_card,
        finish_after_reveal: dealer_hole_card_only || all_decided,
    });
}

/// Applies one dealer card and decides whether the dealer keeps drawing.
///
/// `card` carries the reserved hole card on the reveal; otherwise the card is
/// drawn from the shoe. Once the stopping rule fires the stage becomes `done`
/// and the round settles.
pub(super) fn dealer_hit(
    state: &mut GameState,
    card: Option<Card>,
    finish_after_reveal: bool,
    queue: &mut VecDeque<Followup>,
) {
    let drawn = match card {
        Some(card) => card,
        None => reduce::draw(state),
    };
    state.dealer_cards.push(drawn);

    let value = hand::calculate(&state.dealer_cards)
        .expect("the dealer holds at least one card after a hit");
    let blackjack = hand::is_blackjack(&state.dealer_cards);
    let busted = hand::check_for_busted(value);
    state.dealer_value = Some(value);
    state.dealer_has_blackjack = blackjack;
    state.dealer_has_busted = busted;
    trace!(hi = value.hi, lo = value.lo, busted, "dealer hit");

    state.history.push(HistoryItem::record(
        Action::DealerHit {
            dealer_hole_card: card,
        },
        0.0,
        Some(vec![drawn]),
    ));
    state.hits += 1;

    if finish_after_reveal || dealer_must_stand(state, value, busted, blackjack) {
        state.stage = Stage::Done;
        settle(state);
    } else {
        state.stage = Stage::DealerTurn;
        queue.push_back(Followup::DealerHit {
            card: None,
            finish_after_reveal: false,
        });
    }
}

/// The dealer stopping rule.
///
/// Draw below 17; at 17 or more, keep drawing on a soft 17 when the table
/// hits it, and keep drawing while the best live player total is still ahead.
/// A blackjack or a bust stops unconditionally.
fn dealer_must_stand(
    state: &GameState,
    value: hand::HandValue,
    busted: bool,
    blackjack: bool,
) -> bool {
    if blackjack || busted {
        return true;
    }
    if value.hi < 17 {
        return false;
    }
    if !state.rules.stand_on_soft_17 && hand::is_soft_hand(&state.dealer_cards) {
        return false;
    }
    if let Some(target) = best_live_player_total(state) {
        if hand::higher_valid_value(value) < target {
            return false;
        }
    }
    true
}

/// The highest total among player hands the dealer still has to beat.
///
/// Busted, surrendered, and blackjack hands are out of contention: their
/// payout no longer depends on the dealer total.
fn best_live_player_total(state: &GameState) -> Option<u32> {
    [&state.hand_info.right, &state.hand_info.left]
        .into_iter()
        .filter_map(|slot| slot.as_ref())
        .filter(|hand| !hand.is_busted && !hand.has_surrendered && !hand.is_blackjack)
        .map(|hand| hand::higher_valid_value(hand.value))
        .max()
}

/// Settlement figures reduced from a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prizes {
    /// Cumulative stake over the round.
    pub final_bet: f64,
    /// Winnings on the right hand.
    pub won_on_right: f64,
    /// Winnings on the left hand.
    pub won_on_left: f64,
}

/// Computes the payout for one hand against the dealer's final cards.
///
/// An open hand pays nothing: the only hand left open at settlement lost to a
/// revealed dealer blackjack. Blackjack pays 3:2, a surrender refunds half
/// the bet, a win pays even money, and a push returns the bet.
#[must_use]
pub fn get_prize(hand: &Hand, dealer_cards: &[Card]) -> f64 {
    if !hand.closed || hand.is_busted {
        return 0.0;
    }
    if hand.has_surrendered {
        return hand.bet / 2.0;
    }
    let dealer_has_blackjack = hand::is_blackjack(dealer_cards);
    if hand.is_blackjack && !dealer_has_blackjack {
        return hand.bet + hand.bet * 1.5;
    }
    let Some(dealer_value) = hand::calculate(dealer_cards) else {
        return 0.0;
    };
    if hand::check_for_busted(dealer_value) {
        return hand.bet * 2.0;
    }
    let player = hand::higher_valid_value(hand.value);
    let dealer = hand::higher_valid_value(dealer_value);
    if player > dealer {
        hand.bet * 2.0
    } else if player == dealer {
        hand.bet
    } else {
        0.0
    }
}

/// Reduces the history into the cumulative bet and computes both positions'
/// payouts against the dealer's final cards.
#[must_use]
pub fn get_prizes(state: &GameState) -> Prizes {
    let final_bet = state.history.iter().map(|item| item.value).sum();
    let prize = |hand: Option<&Hand>| hand.map_or(0.0, |hand| get_prize(hand, &state.dealer_cards));
    Prizes {
        final_bet,
        won_on_right: prize(state.hand_info.right.as_ref()),
        won_on_left: prize(state.hand_info.left.as_ref()),
    }
}

fn settle(state: &mut GameState) {
    let prizes = get_prizes(state);
    state.final_bet = prizes.final_bet;
    state.won_on_right = prizes.won_on_right;
    state.won_on_left = prizes.won_on_left;
    state.final_win = prizes.won_on_right + prizes.won_on_left;
    debug!(
        final_bet = state.final_bet,
        final_win = state.final_win,
        "round settled"
    );
}
