//! Hand evaluation and post-action hand snapshots.
//!
//! The evaluator scores a card sequence twice: `hi` counts each ace as 11
//! where that does not bust the hand, `lo` always counts aces as 1. Hands are
//! immutable snapshots; every player action derives a fresh [`Hand`] through
//! one of the `after_*` constructors, which also compute the capability set
//! for the next action.

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// The two totals of a hand under ace flexibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandValue {
    /// Total with each ace counted as 11 where that does not bust the hand.
    pub hi: u32,
    /// Total with every ace counted as 1.
    pub lo: u32,
}

/// Computes the dual value of `cards`.
///
/// An empty hand has no value. A single-card hand opens soft: a lone ace is
/// 11/11, any other card counts its face value on both totals.
#[must_use]
pub fn calculate(cards: &[Card]) -> Option<HandValue> {
    match cards {
        [] => None,
        [card] => {
            let value = if card.is_ace() { 11 } else { card.value() };
            Some(HandValue { hi: value, lo: value })
        }
        _ => {
            let base: u32 = cards
                .iter()
                .filter(|c| !c.is_ace())
                .map(|c| c.value())
                .sum();
            let mut value = HandValue { hi: base, lo: base };
            for _ in cards.iter().filter(|c| c.is_ace()) {
                value.hi += if value.hi + 11 <= 21 { 11 } else { 1 };
                value.lo += 1;
            }
            Some(value)
        }
    }
}

/// The high total when still valid, otherwise the low total.
#[must_use]
pub const fn higher_valid_value(value: HandValue) -> u32 {
    if value.hi <= 21 { value.hi } else { value.lo }
}

/// True when `cards` is a two-card natural 21.
#[must_use]
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && calculate(cards).is_some_and(|v| v.hi == 21)
}

/// True when the hand holds an ace and totals a soft 17, the rule-relevant
/// threshold for the dealer's stand decision.
#[must_use]
pub fn is_soft_hand(cards: &[Card]) -> bool {
    let mut total = 0u32;
    let mut aces = 0u32;
    for card in cards {
        if card.is_ace() {
            total += if aces == 0 { 11 } else { 1 };
            aces += 1;
        } else {
            total += card.value();
        }
    }
    aces > 0 && total == 17
}

/// True when even the optimal total busts the hand.
#[must_use]
pub const fn check_for_busted(value: HandValue) -> bool {
    value.hi > 21
}

/// Capability set of a hand snapshot: which actions the player may take next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableActions {
    /// Double down.
    pub double: bool,
    /// Split a pair into two hands.
    pub split: bool,
    /// Wager insurance against a dealer blackjack.
    pub insurance: bool,
    /// Draw a card.
    pub hit: bool,
    /// Close the hand at its current total.
    pub stand: bool,
    /// Forfeit the hand for half the bet.
    pub surrender: bool,
}

impl AvailableActions {
    /// All capabilities disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            double: false,
            split: false,
            insurance: false,
            hit: false,
            stand: false,
            surrender: false,
        }
    }

    /// Only the insurance decision, used while it is pending.
    #[must_use]
    pub const fn insurance_only() -> Self {
        Self {
            insurance: true,
            ..Self::none()
        }
    }
}

/// A player hand at one table position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    /// Cards in the hand, in deal order.
    pub cards: Vec<Card>,
    /// Dual value of the cards.
    pub value: HandValue,
    /// Stake riding on the hand.
    pub bet: f64,
    /// Whether the hand is a natural blackjack. Suppressed on split hands.
    pub is_blackjack: bool,
    /// Whether the hand has busted.
    pub is_busted: bool,
    /// Whether the hand was surrendered.
    pub has_surrendered: bool,
    /// Insurance stake taken on this hand, zero when none.
    pub insurance_value: f64,
    /// Whether the hand can take no further cards. Never reverts to `false`
    /// within a round.
    pub closed: bool,
    /// Actions the player may take on this hand, before rule enforcement.
    pub available_actions: AvailableActions,
}

/// Derives the base snapshot shared by the `after_*` constructors.
fn hand_info(cards: Vec<Card>, dealer_cards: &[Card], bet: f64, has_split: bool) -> Option<Hand> {
    let value = calculate(&cards)?;
    let is_bj = is_blackjack(&cards) && !has_split;
    let is_busted = check_for_busted(value);
    let closed = is_busted || is_bj || value.hi == 21;
    let can_split = matches!(&cards[..], [a, b] if a.value() == b.value()) && !closed;
    let can_insure = dealer_cards.first().is_some_and(|c| c.is_ace()) && !closed;
    Some(Hand {
        value,
        bet,
        is_blackjack: is_bj,
        is_busted,
        has_surrendered: false,
        insurance_value: 0.0,
        closed,
        available_actions: AvailableActions {
            double: !closed,
            split: can_split,
            insurance: can_insure,
            hit: !closed,
            stand: !closed,
            surrender: !closed,
        },
        cards,
    })
}

impl Hand {
    /// Snapshot after the opening deal.
    ///
    /// Closed only on a natural blackjack; split and insurance depend on the
    /// card pair and the dealer's up-card.
    #[must_use]
    pub fn after_deal(cards: Vec<Card>, dealer_cards: &[Card], bet: f64) -> Option<Self> {
        hand_info(cards, dealer_cards, bet, false)
    }

    /// Snapshot for one position right after a split.
    ///
    /// A split hand can never hold a natural blackjack; it may double while it
    /// has exactly two cards, and can no longer split, insure, or surrender.
    #[must_use]
    pub fn after_split(cards: Vec<Card>, dealer_cards: &[Card], bet: f64) -> Option<Self> {
        let mut hand = hand_info(cards, dealer_cards, bet, true)?;
        hand.available_actions = AvailableActions {
            double: hand.available_actions.double && hand.cards.len() == 2,
            split: false,
            insurance: false,
            surrender: false,
            ..hand.available_actions
        };
        Some(hand)
    }

    /// Snapshot after drawing a card.
    ///
    /// Doubling stays possible only at exactly two cards, i.e. immediately
    /// after the single-card hand of a fresh split has hit once.
    #[must_use]
    pub fn after_hit(
        cards: Vec<Card>,
        dealer_cards: &[Card],
        bet: f64,
        has_split: bool,
    ) -> Option<Self> {
        let mut hand = hand_info(cards, dealer_cards, bet, has_split)?;
        hand.available_actions = AvailableActions {
            double: hand.cards.len() == 2 && !hand.closed,
            split: false,
            insurance: false,
            surrender: false,
            ..hand.available_actions
        };
        Some(hand)
    }

    /// Snapshot after doubling down: one drawn card, the bet doubled, and the
    /// hand force-closed.
    #[must_use]
    pub fn after_double(
        cards: Vec<Card>,
        dealer_cards: &[Card],
        bet: f64,
        has_split: bool,
    ) -> Option<Self> {
        let mut hand = Self::after_hit(cards, dealer_cards, bet, has_split)?;
        hand.bet = bet * 2.0;
        hand.closed = true;
        hand.available_actions = AvailableActions::none();
        Some(hand)
    }

    /// Snapshot after the insurance decision resolves.
    ///
    /// The hand stays open unless its own total closes it; only further
    /// insurance is disabled. The dealer-blackjack closure is applied by the
    /// dispatcher, which alone knows the hole card.
    #[must_use]
    pub fn after_insurance(cards: Vec<Card>, dealer_cards: &[Card], bet: f64) -> Option<Self> {
        let mut hand = hand_info(cards, dealer_cards, bet, false)?;
        hand.available_actions.insurance = false;
        Some(hand)
    }

    /// Snapshot after standing: force-closed with every action disabled.
    #[must_use]
    pub fn after_stand(mut self) -> Self {
        self.closed = true;
        self.available_actions = AvailableActions::none();
        self
    }

    /// Snapshot after surrendering.
    #[must_use]
    pub fn after_surrender(self) -> Self {
        let mut hand = self.after_stand();
        hand.has_surrendered = true;
        hand
    }
}

#[cfg(test)]
mod tests {
    use crate::card::parse_cards;

    use super::*;

    fn value_of(notation: &str) -> HandValue {
        calculate(&parse_cards(notation).unwrap()).unwrap()
    }

    #[test]
    fn empty_hand_has_no_value() {
        assert_eq!(calculate(&[]), None);
    }

    #[test]
    fn single_card_opens_soft() {
        assert_eq!(value_of("\u{2660}A"), HandValue { hi: 11, lo: 11 });
        assert_eq!(value_of("\u{2660}9"), HandValue { hi: 9, lo: 9 });
    }

    #[test]
    fn aces_score_dual() {
        assert_eq!(value_of("\u{2660}A \u{2665}6"), HandValue { hi: 17, lo: 7 });
        assert_eq!(value_of("\u{2660}A \u{2665}A"), HandValue { hi: 12, lo: 2 });
        assert_eq!(
            value_of("\u{2660}A \u{2665}6 \u{2666}5"),
            HandValue { hi: 12, lo: 12 }
        );
        assert_eq!(value_of("\u{2660}K \u{2665}Q \u{2666}2"), HandValue { hi: 22, lo: 22 });
    }

    #[test]
    fn low_never_exceeds_high() {
        for notation in [
            "\u{2660}A",
            "\u{2660}A \u{2665}6",
            "\u{2660}A \u{2665}A \u{2666}9",
            "\u{2660}K \u{2665}Q \u{2666}2",
            "\u{2660}7 \u{2663}7 \u{2665}7",
        ] {
            let value = value_of(notation);
            assert!(value.lo <= value.hi, "lo > hi for {notation}");
            assert_eq!(check_for_busted(value), value.hi > 21);
        }
    }

    #[test]
    fn blackjack_is_a_two_card_21() {
        assert!(is_blackjack(&parse_cards("\u{2660}A \u{2665}K").unwrap()));
        assert!(!is_blackjack(&parse_cards("\u{2660}7 \u{2665}7 \u{2666}7").unwrap()));
        assert!(!is_blackjack(&parse_cards("\u{2660}10 \u{2665}9").unwrap()));
    }

    #[test]
    fn soft_seventeen_detection() {
        assert!(is_soft_hand(&parse_cards("\u{2660}A \u{2665}6").unwrap()));
        assert!(is_soft_hand(&parse_cards("\u{2660}A \u{2665}A \u{2666}5").unwrap()));
        assert!(!is_soft_hand(&parse_cards("\u{2660}10 \u{2665}7").unwrap()));
        assert!(!is_soft_hand(&parse_cards("\u{2660}A \u{2665}7").unwrap()));
    }

    #[test]
    fn deal_snapshot_capabilities() {
        let dealer = parse_cards("\u{2665}5").unwrap();
        let hand =
            Hand::after_deal(parse_cards("\u{2660}8 \u{2666}8").unwrap(), &dealer, 10.0).unwrap();
        assert!(!hand.closed);
        assert!(hand.available_actions.split);
        assert!(hand.available_actions.double);
        assert!(!hand.available_actions.insurance);

        let ace_up = parse_cards("\u{2665}A").unwrap();
        let hand =
            Hand::after_deal(parse_cards("\u{2660}8 \u{2666}9").unwrap(), &ace_up, 10.0).unwrap();
        assert!(hand.available_actions.insurance);
        assert!(!hand.available_actions.split);

        let natural =
            Hand::after_deal(parse_cards("\u{2660}A \u{2666}K").unwrap(), &dealer, 10.0).unwrap();
        assert!(natural.closed);
        assert!(natural.is_blackjack);
        assert_eq!(natural.available_actions, AvailableActions::none());
    }

    #[test]
    fn split_suppresses_blackjack() {
        let dealer = parse_cards("\u{2665}5").unwrap();
        let hand =
            Hand::after_split(parse_cards("\u{2660}A \u{2666}K").unwrap(), &dealer, 10.0).unwrap();
        assert!(!hand.is_blackjack);
        assert!(hand.closed, "a 21 still closes the hand");
        assert!(!hand.available_actions.surrender);
    }

    #[test]
    fn double_closes_and_doubles_the_bet() {
        let dealer = parse_cards("\u{2665}5").unwrap();
        let hand = Hand::after_double(
            parse_cards("\u{2660}5 \u{2666}4 \u{2663}10").unwrap(),
            &dealer,
            10.0,
            false,
        )
        .unwrap();
        assert!(hand.closed);
        assert_eq!(hand.bet, 20.0);
        assert_eq!(hand.available_actions, AvailableActions::none());
    }

    #[test]
    fn stand_and_surrender_are_terminal() {
        let dealer = parse_cards("\u{2665}5").unwrap();
        let hand =
            Hand::after_deal(parse_cards("\u{2660}10 \u{2666}6").unwrap(), &dealer, 10.0).unwrap();
        let stood = hand.clone().after_stand();
        assert!(stood.closed);
        assert!(!stood.has_surrendered);

        let surrendered = hand.after_surrender();
        assert!(surrendered.closed);
        assert!(surrendered.has_surrendered);
    }
}
