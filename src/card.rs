//! Card types, deck building, and card-notation parsing.

use core::fmt;
use core::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::CardParseError;

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Hearts.
    Hearts,
    /// Diamonds.
    Diamonds,
    /// Clubs.
    Clubs,
    /// Spades.
    Spades,
}

impl Suit {
    /// Returns the color of the suit.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Hearts | Self::Diamonds => Color::Red,
            Self::Clubs | Self::Spades => Color::Black,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Hearts => "\u{2665}",
            Self::Diamonds => "\u{2666}",
            Self::Clubs => "\u{2663}",
            Self::Spades => "\u{2660}",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Card color, derived from the suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Hearts and diamonds.
    Red,
    /// Clubs and spades.
    Black,
}

/// A playing card.
///
/// Cards are positional values, not unique objects; a multi-deck shoe holds
/// the expected duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// The rank of the card (1 = Ace, 11 = Jack, 12 = Queen, 13 = King).
    pub rank: u8,
    /// The suit of the card.
    pub suit: Suit,
}

impl Card {
    /// Creates a new card.
    ///
    /// Note: this function does not validate the rank. Use the [`FromStr`]
    /// parser when the rank comes from untrusted notation.
    #[must_use]
    pub const fn new(rank: u8, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Display text for the rank.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self.rank {
            1 => "A",
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            11 => "J",
            12 => "Q",
            13 => "K",
            _ => "?",
        }
    }

    /// Blackjack numeric value of the card: ace 1, faces 10, else the rank.
    #[must_use]
    pub const fn value(self) -> u32 {
        if self.rank < 10 { self.rank as u32 } else { 10 }
    }

    /// Returns the color of the card.
    #[must_use]
    pub const fn color(self) -> Color {
        self.suit.color()
    }

    /// True when the card is an ace.
    #[must_use]
    pub const fn is_ace(self) -> bool {
        self.rank == 1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.text())
    }
}

/// Suit tokens accepted by the notation parser, longest first so that word
/// forms win over their single-letter abbreviations.
const SUIT_TOKENS: &[(&str, Suit)] = &[
    ("hearts", Suit::Hearts),
    ("diamonds", Suit::Diamonds),
    ("spades", Suit::Spades),
    ("clubs", Suit::Clubs),
    ("heart", Suit::Hearts),
    ("diamond", Suit::Diamonds),
    ("spade", Suit::Spades),
    ("club", Suit::Clubs),
    ("\u{2665}", Suit::Hearts),
    ("\u{2666}", Suit::Diamonds),
    ("\u{2660}", Suit::Spades),
    ("\u{2663}", Suit::Clubs),
    ("h", Suit::Hearts),
    ("d", Suit::Diamonds),
    ("s", Suit::Spades),
    ("c", Suit::Clubs),
];

fn parse_rank(text: &str) -> Option<u8> {
    match text {
        "a" | "1" => Some(1),
        "j" => Some(11),
        "q" => Some(12),
        "k" => Some(13),
        _ => match text.parse::<u8>() {
            Ok(rank) if (2..=10).contains(&rank) => Some(rank),
            _ => None,
        },
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Parses card notation such as `♠A`, `10♥`, `Kd` or `hearts2`.
    ///
    /// The suit may come first or last, as a unicode symbol, a letter, or a
    /// word; the rank is `A`, `2`..`10`, `J`, `Q` or `K` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if token.is_empty() {
            return Err(CardParseError::Empty);
        }

        for (name, suit) in SUIT_TOKENS {
            let rank_text = if let Some(rest) = token.strip_prefix(name) {
                rest
            } else if let Some(rest) = token.strip_suffix(name) {
                rest
            } else {
                continue;
            };
            return parse_rank(rank_text)
                .map(|rank| Self::new(rank, *suit))
                .ok_or_else(|| CardParseError::UnknownRank(s.trim().to_owned()));
        }

        Err(CardParseError::UnknownSuit(s.trim().to_owned()))
    }
}

/// Parses whitespace-separated card notation, e.g. `"♠J ♣9"`.
///
/// # Errors
///
/// Returns a [`CardParseError`] when the input is empty or any token fails to
/// parse. Malformed notation indicates an integration defect, so this fails
/// loudly instead of producing a partial hand.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardParseError> {
    if s.trim().is_empty() {
        return Err(CardParseError::Empty);
    }
    s.split_whitespace().map(Card::from_str).collect()
}

/// Number of cards per deck.
pub const DECK_SIZE: usize = 52;

/// Builds one ordered 52-card deck as the product of four suits and thirteen
/// ranks.
#[must_use]
pub fn new_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for suit in [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades] {
        for rank in 1..=13 {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

/// Builds `n` concatenated decks.
#[must_use]
pub fn new_decks(n: u8) -> Vec<Card> {
    let mut cards = Vec::with_capacity(n as usize * DECK_SIZE);
    for _ in 0..n {
        cards.extend(new_deck());
    }
    cards
}

/// Returns a uniformly shuffled copy of `cards`.
///
/// The input is left untouched; the permutation is an unbiased Fisher-Yates
/// shuffle driven by `rng`.
#[must_use]
pub fn shuffle<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = cards.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn deck_is_the_suit_rank_product() {
        let deck = new_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        assert_eq!(deck.iter().filter(|c| c.suit == Suit::Hearts).count(), 13);
        assert_eq!(deck.iter().filter(|c| c.rank == 1).count(), 4);
        assert_eq!(new_decks(6).len(), 6 * DECK_SIZE);
    }

    #[test]
    fn face_cards_count_ten_and_aces_low() {
        assert_eq!(Card::new(1, Suit::Spades).value(), 1);
        assert_eq!(Card::new(9, Suit::Spades).value(), 9);
        assert_eq!(Card::new(10, Suit::Spades).value(), 10);
        assert_eq!(Card::new(13, Suit::Spades).value(), 10);
        assert_eq!(Card::new(12, Suit::Hearts).text(), "Q");
        assert_eq!(Card::new(5, Suit::Diamonds).color(), Color::Red);
        assert_eq!(Card::new(5, Suit::Clubs).color(), Color::Black);
    }

    #[test]
    fn shuffle_returns_a_permutation_without_mutating_input() {
        let deck = new_deck();
        let before = deck.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let shuffled = shuffle(&deck, &mut rng);

        assert_eq!(deck, before);
        assert_eq!(shuffled.len(), deck.len());
        let mut sorted = shuffled.clone();
        sorted.sort_by_key(|c| (c.suit as u8, c.rank));
        let mut expected = deck;
        expected.sort_by_key(|c| (c.suit as u8, c.rank));
        assert_eq!(sorted, expected);
    }

    #[test]
    fn parses_common_notations() {
        assert_eq!("\u{2660}A".parse::<Card>().unwrap(), Card::new(1, Suit::Spades));
        assert_eq!("10\u{2665}".parse::<Card>().unwrap(), Card::new(10, Suit::Hearts));
        assert_eq!("Kd".parse::<Card>().unwrap(), Card::new(13, Suit::Diamonds));
        assert_eq!("hearts2".parse::<Card>().unwrap(), Card::new(2, Suit::Hearts));
        assert_eq!("c-7".parse::<Card>().unwrap(), Card::new(7, Suit::Clubs));

        let cards = parse_cards("\u{2660}J \u{2663}9").unwrap();
        assert_eq!(cards, vec![Card::new(11, Suit::Spades), Card::new(9, Suit::Clubs)]);
    }

    #[test]
    fn malformed_notation_fails_loudly() {
        assert_eq!("".parse::<Card>().unwrap_err(), CardParseError::Empty);
        assert_eq!(parse_cards("  ").unwrap_err(), CardParseError::Empty);
        assert!(matches!(
            "xyz".parse::<Card>().unwrap_err(),
            CardParseError::UnknownSuit(_)
        ));
        assert!(matches!(
            "\u{2660}14".parse::<Card>().unwrap_err(),
            CardParseError::UnknownRank(_)
        ));
    }
}
