//! Side bets: Lucky Lucky and Perfect Pairs.
//!
//! Side bets are settled eagerly at deal time against the player's pair and
//! the dealer's up-card; their stakes are locked with the deal. The insurance
//! wager is recorded here too once the insurance decision resolves.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::hand::{self, HandValue};

/// Which side bets the table offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSideBets {
    /// Lucky Lucky: player pair plus dealer up-card totalling 19-21.
    pub lucky_lucky: bool,
    /// Perfect Pairs: the player pair shares a rank.
    pub perfect_pairs: bool,
}

impl Default for AvailableSideBets {
    fn default() -> Self {
        Self {
            lucky_lucky: true,
            perfect_pairs: true,
        }
    }
}

/// Stakes placed on side bets at deal time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SideBetStakes {
    /// Stake on Lucky Lucky.
    pub lucky_lucky: f64,
    /// Stake on Perfect Pairs.
    pub perfect_pairs: f64,
}

/// Outcome of the insurance wager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsuranceOutcome {
    /// Stake put at risk.
    pub risk: f64,
    /// Amount won, zero when the dealer had no blackjack.
    pub win: f64,
}

/// Side-bet winnings for the round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideBetsInfo {
    /// Insurance outcome, present once the decision was made.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub insurance: Option<InsuranceOutcome>,
    /// Lucky Lucky winnings.
    pub lucky_lucky: f64,
    /// Perfect Pairs winnings.
    pub perfect_pairs: f64,
}

/// True when every card shares one suit.
#[must_use]
pub fn is_suited(cards: &[Card]) -> bool {
    match cards.split_first() {
        Some((first, rest)) => rest.iter().all(|c| c.suit == first.suit),
        None => false,
    }
}

/// True when the two player cards share a rank.
#[must_use]
pub fn is_perfect_pairs(player_cards: &[Card]) -> bool {
    matches!(player_cards, [a, b] if a.rank == b.rank)
}

/// True when some hi/lo combination of the player pair and the dealer up-card
/// lands on a total of 19 through 21.
#[must_use]
pub fn is_lucky_lucky(player_cards: &[Card], dealer_cards: &[Card]) -> bool {
    let (Some(player), Some(dealer)) = (
        hand::calculate(player_cards),
        hand::calculate(dealer_cards),
    ) else {
        return false;
    };
    [
        player.hi + dealer.hi,
        player.hi + dealer.lo,
        player.lo + dealer.hi,
        player.lo + dealer.lo,
    ]
    .iter()
    .any(|total| (19..=21).contains(total))
}

/// Paytable multiplier for the Lucky Lucky wager.
///
/// The key is the three card values concatenated in player-then-dealer order,
/// so the 6-7-8 tiers only pay when the cards appear in that order.
#[must_use]
pub fn lucky_lucky_multiplier(player_cards: &[Card], dealer_cards: &[Card]) -> f64 {
    let cards: Vec<Card> = player_cards.iter().chain(dealer_cards).copied().collect();
    let Some(value) = hand::calculate(&cards) else {
        return 0.0;
    };
    let key: String = cards.iter().map(|c| c.value().to_string()).collect();
    paytable(&key, is_suited(&cards), value)
}

fn paytable(key: &str, suited: bool, value: HandValue) -> f64 {
    match (key, suited) {
        ("777", true) => 200.0,
        ("678", true) => 100.0,
        ("777", false) => 50.0,
        ("678", false) => 30.0,
        _ if (value.hi == 21 || value.lo == 21) && suited => 10.0,
        _ if value.hi == 21 || value.lo == 21 => 3.0,
        _ if value.hi == 20 || value.lo == 20 => 3.0,
        _ if value.hi == 19 || value.lo == 19 => 2.0,
        _ => 0.0,
    }
}

const PERFECT_PAIRS_MULTIPLIER: f64 = 5.0;

/// Computes side-bet winnings for the dealt cards.
///
/// Stakes are honored only for bets the table offers.
#[must_use]
pub fn get_side_bets_info(
    available: AvailableSideBets,
    stakes: SideBetStakes,
    player_cards: &[Card],
    dealer_cards: &[Card],
) -> SideBetsInfo {
    let mut info = SideBetsInfo {
        insurance: None,
        lucky_lucky: 0.0,
        perfect_pairs: 0.0,
    };
    if available.lucky_lucky && stakes.lucky_lucky > 0.0 {
        info.lucky_lucky = stakes.lucky_lucky * lucky_lucky_multiplier(player_cards, dealer_cards);
    }
    if available.perfect_pairs && stakes.perfect_pairs > 0.0 {
        // TODO: pay the colored/mixed pair tiers once their paytable is settled
        if is_perfect_pairs(player_cards) {
            info.perfect_pairs = stakes.perfect_pairs * PERFECT_PAIRS_MULTIPLIER;
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use crate::card::parse_cards;

    use super::*;

    fn multiplier(player: &str, dealer: &str) -> f64 {
        lucky_lucky_multiplier(
            &parse_cards(player).unwrap(),
            &parse_cards(dealer).unwrap(),
        )
    }

    #[test]
    fn lucky_lucky_paytable_values() {
        assert_eq!(multiplier("\u{2660}7 \u{2660}7", "\u{2660}7"), 200.0);
        assert_eq!(multiplier("\u{2660}7 \u{2660}7", "\u{2665}7"), 50.0);
        assert_eq!(multiplier("\u{2665}6 \u{2665}7", "\u{2665}8"), 100.0);
        assert_eq!(multiplier("\u{2665}6 \u{2660}7", "\u{2666}8"), 30.0);
        // suited 21 that is not 6-7-8 or 7-7-7
        assert_eq!(multiplier("\u{2660}5 \u{2660}6", "\u{2660}K"), 10.0);
        assert_eq!(multiplier("\u{2660}5 \u{2665}6", "\u{2666}K"), 3.0);
        assert_eq!(multiplier("\u{2660}10 \u{2665}4", "\u{2666}6"), 3.0);
        assert_eq!(multiplier("\u{2660}10 \u{2665}4", "\u{2666}5"), 2.0);
        assert_eq!(multiplier("\u{2660}2 \u{2665}3", "\u{2666}4"), 0.0);
    }

    #[test]
    fn lucky_lucky_key_is_order_sensitive() {
        // 7-6 against an 8 totals 21 but is not the 678 key
        assert_eq!(multiplier("\u{2660}7 \u{2665}6", "\u{2666}8"), 3.0);
    }

    #[test]
    fn lucky_lucky_accepts_any_hi_lo_combination() {
        // A+6 against a 2: hi 17 + 2 = 19
        assert!(is_lucky_lucky(
            &parse_cards("\u{2660}A \u{2665}6").unwrap(),
            &parse_cards("\u{2666}2").unwrap()
        ));
        // ace up-card: player 8 + dealer hi 11 = 19
        assert!(is_lucky_lucky(
            &parse_cards("\u{2660}5 \u{2665}3").unwrap(),
            &parse_cards("\u{2666}A").unwrap()
        ));
        assert!(!is_lucky_lucky(
            &parse_cards("\u{2660}2 \u{2665}3").unwrap(),
            &parse_cards("\u{2666}4").unwrap()
        ));
    }

    #[test]
    fn perfect_pairs_matches_rank_not_value() {
        assert!(is_perfect_pairs(&parse_cards("\u{2660}K \u{2665}K").unwrap()));
        // ten and king share the value 10 but not the rank
        assert!(!is_perfect_pairs(
            &parse_cards("\u{2660}10 \u{2665}K").unwrap()
        ));
    }

    #[test]
    fn stakes_scale_the_multiplier() {
        let player = parse_cards("\u{2660}7 \u{2660}7").unwrap();
        let dealer = parse_cards("\u{2660}7").unwrap();
        let stakes = SideBetStakes {
            lucky_lucky: 2.0,
            perfect_pairs: 3.0,
        };
        let info = get_side_bets_info(AvailableSideBets::default(), stakes, &player, &dealer);
        assert_eq!(info.lucky_lucky, 400.0);
        assert_eq!(info.perfect_pairs, 15.0);

        let disabled = AvailableSideBets {
            lucky_lucky: false,
            perfect_pairs: false,
        };
        let info = get_side_bets_info(disabled, stakes, &player, &dealer);
        assert_eq!(info.lucky_lucky, 0.0);
        assert_eq!(info.perfect_pairs, 0.0);
    }
}
