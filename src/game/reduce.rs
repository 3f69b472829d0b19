//! Per-action reducers.
//!
//! Each reducer mutates the working copy of the round state and may push
//! follow-up pseudo-actions onto the work list; `dispatch` drains the list
//! until the stage is stable. Chained transitions are explicit queue entries
//! rather than recursive dispatch calls, which keeps them auditable and
//! termination bounded by the shoe.

use std::collections::VecDeque;

use tracing::warn;

use crate::actions::{Action, HistoryItem, Position};
use crate::card::{self, Card};
use crate::hand::{self, AvailableActions, Hand};
use crate::side_bets::{self, InsuranceOutcome, SideBetStakes};

use super::dealer;
use super::state::{GameState, Stage};

/// Internally triggered follow-up pseudo-actions.
pub(super) enum Followup {
    /// Close a hand and advance, as triggered by a double.
    Stand {
        /// Hand to close.
        position: Position,
    },
    /// Begin the dealer reveal.
    Showdown {
        /// Reveal the hole card without drawing further.
        dealer_hole_card_only: bool,
    },
    /// Draw one dealer card, or consume the reserved hole card.
    DealerHit {
        /// The reserved hole card when this hit reveals it.
        card: Option<Card>,
        /// Stop unconditionally once this card lands.
        finish_after_reveal: bool,
    },
}

pub(super) fn apply(state: &mut GameState, action: Action, queue: &mut VecDeque<Followup>) {
    match action {
        Action::Restore => {}
        Action::Deal { bet, side_bets } => deal(state, bet, side_bets, queue),
        Action::Insurance { bet } => insurance(state, bet, queue),
        Action::Split => split(state, queue),
        Action::Hit { position } => hit(state, position, queue),
        Action::Double { position } => double(state, position, queue),
        Action::Stand { position } => stand(state, position, queue),
        Action::Surrender => surrender(state, queue),
        Action::Showdown {
            dealer_hole_card_only,
        } => dealer::showdown(state, dealer_hole_card_only, queue),
        Action::DealerHit { dealer_hole_card } => {
            dealer::dealer_hit(state, dealer_hole_card, false, queue);
        }
        // Permissive fallback: rejected or telemetry-only actions land in the
        // history without touching the gameplay state.
        invalid @ Action::Invalid { .. } => {
            state.history.push(HistoryItem::record(invalid, 0.0, None));
            state.hits += 1;
        }
    }
}

pub(super) fn apply_followup(
    state: &mut GameState,
    followup: Followup,
    queue: &mut VecDeque<Followup>,
) {
    match followup {
        Followup::Stand { position } => stand(state, position, queue),
        Followup::Showdown {
            dealer_hole_card_only,
        } => dealer::showdown(state, dealer_hole_card_only, queue),
        Followup::DealerHit {
            card,
            finish_after_reveal,
        } => dealer::dealer_hit(state, card, finish_after_reveal, queue),
    }
}

/// Draws the top card of the shoe.
///
/// A shoe exhausted mid-round is replenished with a freshly shuffled one
/// rather than failing the dispatch; see DESIGN.md for the policy.
pub(super) fn draw(state: &mut GameState) -> Card {
    if let Some(card) = state.deck.pop() {
        return card;
    }
    warn!(decks = state.rules.decks, "shoe exhausted mid-round, building a fresh one");
    state.deck = card::shuffle(
        &card::new_decks(state.rules.decks.max(1)),
        &mut rand::rng(),
    );
    state
        .deck
        .pop()
        .expect("a freshly built shoe holds at least one deck")
}

fn deal(state: &mut GameState, bet: f64, stakes: SideBetStakes, queue: &mut VecDeque<Followup>) {
    if state.stage == Stage::Done {
        // a deal from `done` opens a fresh round on a fresh shoe
        let available = state.available_side_bets;
        *state = GameState::fresh(state.rules, &mut rand::rng());
        state.available_side_bets = available;
    }

    let first = draw(state);
    let second = draw(state);
    let up = draw(state);
    let hole = draw(state);
    let player_cards = vec![first, second];
    let dealer_cards = vec![up];

    let hand = Hand::after_deal(player_cards.clone(), &dealer_cards, bet)
        .expect("the deal produced two cards");
    let mut right = state.rules.enforce(hand, false);

    let dealer_has_blackjack = hand::is_blackjack(&[up, hole]);
    let insurance_pending = up.is_ace() && state.rules.insurance;
    if insurance_pending {
        // suspend the hand, open, until the insurance decision resolves
        right.closed = false;
        right.available_actions = AvailableActions::insurance_only();
    }
    let player_has_blackjack = right.is_blackjack;

    state.initial_bet = bet;
    state.stage = Stage::PlayerTurnRight;
    state.dealer_value = hand::calculate(&dealer_cards);
    state.dealer_cards = dealer_cards;
    state.dealer_hole_card = Some(hole);
    // the hole card stays concealed until showdown or the insurance peek
    state.dealer_has_blackjack = false;
    state.dealer_has_busted = false;
    state.side_bets_info = Some(side_bets::get_side_bets_info(
        state.available_side_bets,
        stakes,
        &player_cards,
        &state.dealer_cards,
    ));
    state.hand_info.right = Some(right);
    state.hand_info.left = None;
    state.history.push(HistoryItem::record(
        Action::Deal {
            bet,
            side_bets: stakes,
        },
        bet,
        Some(vec![first, second, up]),
    ));
    state.hits += 1;

    if !insurance_pending && (player_has_blackjack || dealer_has_blackjack) {
        queue.push_back(Followup::Showdown {
            dealer_hole_card_only: false,
        });
    }
}

fn insurance(state: &mut GameState, bet: f64, queue: &mut VecDeque<Followup>) {
    let hole_card = state.dealer_hole_card;
    let full_dealer: Vec<Card> = state
        .dealer_cards
        .iter()
        .copied()
        .chain(hole_card)
        .collect();
    let dealer_has_blackjack = hand::is_blackjack(&full_dealer);

    let insurance_value = if bet > 0.0 {
        bet.min(state.initial_bet / 2.0)
    } else {
        0.0
    };
    let up_card_is_ace = state.dealer_cards.first().is_some_and(|c| c.is_ace());
    let insurance_prize = if up_card_is_ace && dealer_has_blackjack && insurance_value > 0.0 {
        insurance_value * 3.0
    } else {
        0.0
    };

    let cards = state
        .hand_info
        .right
        .as_ref()
        .map(|hand| hand.cards.clone())
        .unwrap_or_default();
    let hand = Hand::after_insurance(cards, &state.dealer_cards, state.initial_bet)
        .expect("the insured hand holds its dealt cards");
    let mut right = state.rules.enforce(hand, false);
    right.insurance_value = insurance_value;
    // a player blackjack already closed the hand during derivation; a
    // confirmed dealer blackjack closes it here
    right.closed = right.closed || dealer_has_blackjack;
    let closed = right.closed;

    state.dealer_has_blackjack = dealer_has_blackjack;
    if let Some(info) = state.side_bets_info.as_mut() {
        info.insurance = Some(InsuranceOutcome {
            risk: insurance_value,
            win: insurance_prize,
        });
    }
    state.hand_info.right = Some(right);
    state.history.push(HistoryItem::record(
        Action::Insurance {
            bet: insurance_value,
        },
        insurance_value,
        None,
    ));
    state.hits += 1;

    if closed {
        queue.push_back(Followup::Showdown {
            dealer_hole_card_only: false,
        });
    }
}

fn split(state: &mut GameState, queue: &mut VecDeque<Followup>) {
    let right = state
        .hand_info
        .right
        .take()
        .expect("split was validated against an existing hand");
    let (pair_left, pair_right) = (right.cards[0], right.cards[1]);
    let force_showdown = state.rules.showdown_after_ace_split && pair_right.is_ace();

    let drawn_left = draw(state);
    let drawn_right = draw(state);
    let bet = state.initial_bet;

    let mut left = state
        .rules
        .enforce(
            Hand::after_split(vec![pair_left, drawn_left], &state.dealer_cards, bet)
                .expect("the split left hand holds two cards"),
            true,
        );
    let mut new_right = state
        .rules
        .enforce(
            Hand::after_split(vec![pair_right, drawn_right], &state.dealer_cards, bet)
                .expect("the split right hand holds two cards"),
            true,
        );

    if force_showdown {
        left = left.after_stand();
        new_right = new_right.after_stand();
    }

    let stage = if force_showdown {
        Stage::Showdown
    } else if !new_right.closed {
        Stage::PlayerTurnRight
    } else if !left.closed {
        Stage::PlayerTurnLeft
    } else {
        Stage::Showdown
    };

    state.hand_info.left = Some(left);
    state.hand_info.right = Some(new_right);
    state.stage = stage;
    state.history.push(HistoryItem::record(
        Action::Split,
        bet,
        Some(vec![drawn_left, drawn_right]),
    ));
    state.hits += 1;

    if stage == Stage::Showdown {
        queue.push_back(Followup::Showdown {
            dealer_hole_card_only: false,
        });
    }
}

fn hit(state: &mut GameState, position: Position, queue: &mut VecDeque<Followup>) {
    let card = draw(state);
    let has_split = state.has_split();
    let current = state
        .hand_info
        .get(position)
        .expect("hit was validated against an existing hand");
    let mut cards = current.cards.clone();
    cards.push(card);
    let (bet, insurance_value) = (current.bet, current.insurance_value);

    let mut hand = state.rules.enforce(
        Hand::after_hit(cards, &state.dealer_cards, bet, has_split)
            .expect("the hit hand holds its cards"),
        has_split,
    );
    hand.insurance_value = insurance_value;
    let closed = hand.closed;
    state.hand_info.set(position, hand);

    let stage = next_player_stage(state, position, closed, has_split);
    state.stage = stage;
    state.history.push(HistoryItem::record(
        Action::Hit { position },
        0.0,
        Some(vec![card]),
    ));
    state.hits += 1;

    if stage == Stage::Showdown {
        queue.push_back(Followup::Showdown {
            dealer_hole_card_only: false,
        });
    }
}

fn double(state: &mut GameState, position: Position, queue: &mut VecDeque<Followup>) {
    let card = draw(state);
    let has_split = state.has_split();
    let current = state
        .hand_info
        .get(position)
        .expect("double was validated against an existing hand");
    let mut cards = current.cards.clone();
    cards.push(card);
    let (bet, insurance_value) = (current.bet, current.insurance_value);

    let mut hand = Hand::after_double(cards, &state.dealer_cards, bet, has_split)
        .expect("the doubled hand holds its cards");
    hand.insurance_value = insurance_value;
    state.hand_info.set(position, hand);

    state.history.push(HistoryItem::record(
        Action::Double { position },
        state.initial_bet,
        Some(vec![card]),
    ));
    state.hits += 1;

    queue.push_back(Followup::Stand { position });
}

fn stand(state: &mut GameState, position: Position, queue: &mut VecDeque<Followup>) {
    let current = state
        .hand_info
        .get(position)
        .cloned()
        .expect("stand was validated against an existing hand");
    state.hand_info.set(position, current.after_stand());

    let has_split = state.has_split();
    let stage = next_player_stage(state, position, true, has_split);
    state.stage = stage;
    state
        .history
        .push(HistoryItem::record(Action::Stand { position }, 0.0, None));
    state.hits += 1;

    if stage == Stage::Showdown {
        queue.push_back(Followup::Showdown {
            dealer_hole_card_only: false,
        });
    }
}

fn surrender(state: &mut GameState, queue: &mut VecDeque<Followup>) {
    let right = state
        .hand_info
        .right
        .take()
        .expect("surrender was validated against an existing hand");
    state.hand_info.right = Some(right.after_surrender());
    state.stage = Stage::Showdown;
    state
        .history
        .push(HistoryItem::record(Action::Surrender, 0.0, None));
    state.hits += 1;

    // both positions are decided, so only the hole card gets revealed
    queue.push_back(Followup::Showdown {
        dealer_hole_card_only: true,
    });
}

/// Stage after a player action on `position` resolves.
///
/// An open hand keeps its own turn; a closed one passes to the other open
/// position or on to the showdown.
fn next_player_stage(
    state: &GameState,
    position: Position,
    closed: bool,
    has_split: bool,
) -> Stage {
    if !closed {
        return Stage::player_turn(position);
    }
    match position {
        Position::Right if has_split && state.hand_info.is_open(Position::Left) => {
            Stage::PlayerTurnLeft
        }
        _ => Stage::Showdown,
    }
}
