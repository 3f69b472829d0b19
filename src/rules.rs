//! Table rule configuration and enforcement.

use serde::{Deserialize, Serialize};

use crate::hand::{Hand, HandValue};

/// Conditions under which doubling down is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoublePolicy {
    /// Double down allowed on any hand.
    #[default]
    #[serde(rename = "any")]
    Any,
    /// Double down allowed only on 9 or 10.
    #[serde(rename = "9or10")]
    NineOrTen,
    /// Double down allowed only on 9 through 11.
    #[serde(rename = "9or10or11")]
    NineThrough11,
    /// Double down allowed only on 9 through 15.
    #[serde(rename = "9thru15")]
    NineThrough15,
    /// Double down not allowed.
    #[serde(rename = "none")]
    None,
}

impl DoublePolicy {
    /// Whether a hand with the given value may double down.
    #[must_use]
    pub fn allows(self, value: HandValue) -> bool {
        match self {
            Self::Any => true,
            Self::NineOrTen => value.hi == 9 || value.hi == 10,
            Self::NineThrough11 => (9..=11).contains(&value.hi),
            Self::NineThrough15 => (9..=15).contains(&value.hi),
            Self::None => false,
        }
    }
}

/// Table rules for a round.
///
/// Use the builder pattern to customize rules:
///
/// ```
/// use twentyone::{DoublePolicy, Rules};
///
/// let rules = Rules::default()
///     .with_decks(6)
///     .with_double(DoublePolicy::NineThrough11)
///     .with_surrender(false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    /// Number of decks in the shoe.
    pub decks: u8,
    /// Whether the dealer stands on soft 17.
    pub stand_on_soft_17: bool,
    /// Double-down policy.
    pub double: DoublePolicy,
    /// Whether splitting is allowed.
    pub split: bool,
    /// Whether double down is allowed after a split.
    pub double_after_split: bool,
    /// Whether surrender is allowed.
    pub surrender: bool,
    /// Whether insurance is offered when the dealer shows an ace.
    pub insurance: bool,
    /// Whether splitting aces closes both hands and forces the showdown.
    pub showdown_after_ace_split: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            decks: 1,
            stand_on_soft_17: true,
            double: DoublePolicy::Any,
            split: true,
            double_after_split: true,
            surrender: true,
            insurance: true,
            showdown_after_ace_split: true,
        }
    }
}

impl Rules {
    /// Sets the number of decks. Zero is treated as one.
    ///
    /// # Example
    ///
    /// ```
    /// use twentyone::Rules;
    ///
    /// let rules = Rules::default().with_decks(6);
    /// assert_eq!(rules.decks, 6);
    /// ```
    #[must_use]
    pub const fn with_decks(mut self, decks: u8) -> Self {
        self.decks = if decks == 0 { 1 } else { decks };
        self
    }

    /// Sets whether the dealer stands on soft 17.
    ///
    /// # Example
    ///
    /// ```
    /// use twentyone::Rules;
    ///
    /// let rules = Rules::default().with_stand_on_soft_17(false);
    /// assert!(!rules.stand_on_soft_17);
    /// ```
    #[must_use]
    pub const fn with_stand_on_soft_17(mut self, stand: bool) -> Self {
        self.stand_on_soft_17 = stand;
        self
    }

    /// Sets the double-down policy.
    ///
    /// # Example
    ///
    /// ```
    /// use twentyone::{DoublePolicy, Rules};
    ///
    /// let rules = Rules::default().with_double(DoublePolicy::NineOrTen);
    /// assert_eq!(rules.double, DoublePolicy::NineOrTen);
    /// ```
    #[must_use]
    pub const fn with_double(mut self, double: DoublePolicy) -> Self {
        self.double = double;
        self
    }

    /// Sets whether splitting is allowed.
    #[must_use]
    pub const fn with_split(mut self, allowed: bool) -> Self {
        self.split = allowed;
        self
    }

    /// Sets whether double down is allowed after a split.
    #[must_use]
    pub const fn with_double_after_split(mut self, allowed: bool) -> Self {
        self.double_after_split = allowed;
        self
    }

    /// Sets whether surrender is allowed.
    #[must_use]
    pub const fn with_surrender(mut self, allowed: bool) -> Self {
        self.surrender = allowed;
        self
    }

    /// Sets whether insurance is offered.
    ///
    /// # Example
    ///
    /// ```
    /// use twentyone::Rules;
    ///
    /// let rules = Rules::default().with_insurance(false);
    /// assert!(!rules.insurance);
    /// ```
    #[must_use]
    pub const fn with_insurance(mut self, offered: bool) -> Self {
        self.insurance = offered;
        self
    }

    /// Sets whether an ace split forces the showdown.
    #[must_use]
    pub const fn with_showdown_after_ace_split(mut self, forced: bool) -> Self {
        self.showdown_after_ace_split = forced;
        self
    }

    /// Overlays the rules onto a freshly derived hand's capability set.
    ///
    /// `has_split` reflects whether a split has already occurred this round;
    /// it gates doubling when `double_after_split` is off.
    #[must_use]
    pub fn enforce(&self, mut hand: Hand, has_split: bool) -> Hand {
        let value = hand.value;
        let actions = &mut hand.available_actions;
        if !self.double.allows(value) {
            actions.double = false;
        }
        if !self.split {
            actions.split = false;
        }
        if !self.surrender {
            actions.surrender = false;
        }
        if !self.insurance {
            actions.insurance = false;
        }
        if has_split && !self.double_after_split {
            actions.double = false;
        }
        hand
    }
}
