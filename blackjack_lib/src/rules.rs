use crate::error::{BlackjackGameError, Result};
use serde::{Deserialize, Serialize};

/// Payout multiplier for a natural blackjack, expressed as a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u32,
    pub denominator: u32,
}

impl PayoutRatio {
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    pub const SIX_TO_FIVE: Self = Self {
        numerator: 6,
        denominator: 5,
    };
    pub const ONE_TO_ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    /// Winnings for `wager`, rounded down. Saturates at `i64::MAX`, and a zero denominator pays nothing.
    pub fn payout(&self, wager: u32) -> i64 {
        let won = (wager as u64 * self.numerator as u64)
            .checked_div(self.denominator as u64)
            .unwrap_or(0);
        i64::try_from(won).unwrap_or(i64::MAX)
    }
}

impl Default for PayoutRatio {
    fn default() -> Self {
        PayoutRatio::THREE_TO_TWO
    }
}

/// House rules for a table. Every field has a default, so a partial JSON document deserializes fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    /// Number of 52 card decks in the shoe
    pub deck_count: usize,
    /// The dealer keeps drawing while the value of their hand is below this
    pub dealer_stands_on: u32,
    /// Dealer also draws on a soft 17
    pub dealer_hits_soft_17: bool,
    pub allow_surrender: bool,
    pub double_after_split: bool,
    pub blackjack_payout: PayoutRatio,
}

impl TableRules {
    /// Associated method returning a `TableRulesBuilder` with every option unset.
    pub fn new() -> TableRulesBuilder {
        TableRulesBuilder::default()
    }

    /// Checks that the rules describe a playable table.
    pub fn validate(&self) -> Result<()> {
        if self.deck_count == 0 {
            return Err(BlackjackGameError::InvalidConfig(
                "deck_count must be at least 1".to_string(),
            ));
        }
        if !(2..=21).contains(&self.dealer_stands_on) {
            return Err(BlackjackGameError::InvalidConfig(format!(
                "dealer_stands_on must be between 2 and 21, got {}",
                self.dealer_stands_on
            )));
        }
        if self.blackjack_payout.denominator == 0 {
            return Err(BlackjackGameError::InvalidConfig(
                "blackjack payout denominator cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TableRules {
    /// Six decks, dealer stands on all 17s, surrender offered, no double after split, 3:2 blackjack.
    fn default() -> Self {
        TableRules {
            deck_count: 6,
            dealer_stands_on: 17,
            dealer_hits_soft_17: false,
            allow_surrender: true,
            double_after_split: false,
            blackjack_payout: PayoutRatio::THREE_TO_TWO,
        }
    }
}

/// Struct to implement builder pattern for `TableRules`
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRulesBuilder {
    deck_count: Option<usize>,
    dealer_stands_on: Option<u32>,
    dealer_hits_soft_17: Option<bool>,
    allow_surrender: Option<bool>,
    double_after_split: Option<bool>,
    blackjack_payout: Option<PayoutRatio>,
}

impl TableRulesBuilder {
    pub fn deck_count(&mut self, decks: usize) -> &mut Self {
        self.deck_count = Some(decks);
        self
    }

    pub fn dealer_stands_on(&mut self, value: u32) -> &mut Self {
        self.dealer_stands_on = Some(value);
        self
    }

    pub fn dealer_hits_soft_17(&mut self, hits: bool) -> &mut Self {
        self.dealer_hits_soft_17 = Some(hits);
        self
    }

    pub fn allow_surrender(&mut self, allow: bool) -> &mut Self {
        self.allow_surrender = Some(allow);
        self
    }

    pub fn double_after_split(&mut self, allow: bool) -> &mut Self {
        self.double_after_split = Some(allow);
        self
    }

    pub fn blackjack_payout(&mut self, ratio: PayoutRatio) -> &mut Self {
        self.blackjack_payout = Some(ratio);
        self
    }

    /// Method for building a `TableRules` object, options that were never set take their default value.
    pub fn build(&mut self) -> TableRules {
        let defaults = TableRules::default();
        TableRules {
            deck_count: self.deck_count.unwrap_or(defaults.deck_count),
            dealer_stands_on: self.dealer_stands_on.unwrap_or(defaults.dealer_stands_on),
            dealer_hits_soft_17: self
                .dealer_hits_soft_17
                .unwrap_or(defaults.dealer_hits_soft_17),
            allow_surrender: self.allow_surrender.unwrap_or(defaults.allow_surrender),
            double_after_split: self
                .double_after_split
                .unwrap_or(defaults.double_after_split),
            blackjack_payout: self.blackjack_payout.unwrap_or(defaults.blackjack_payout),
        }
    }
}
