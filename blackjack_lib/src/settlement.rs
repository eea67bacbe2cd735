//! Payout arithmetic for the end of a round.

use crate::hand::{Hand, HandStatus};
use crate::rules::PayoutRatio;
use serde::{Deserialize, Serialize};

/// What every player hand is compared against at settlement.
///
/// A value of 0 means the dealer either busted or never played because every player had already lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DealerOutcome {
    value: u32,
    blackjack: bool,
}

impl DealerOutcome {
    /// The dealer skipped their turn.
    pub fn did_not_play() -> Self {
        DealerOutcome::default()
    }

    /// Reads the outcome off the dealer's finished hand.
    pub fn from_hand(hand: &Hand) -> Self {
        if hand.is_bust() {
            return DealerOutcome::did_not_play();
        }
        DealerOutcome {
            value: hand.value(),
            blackjack: hand.is_blackjack(),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_blackjack(&self) -> bool {
        self.blackjack
    }

    /// True if the dealer busted or did not play.
    pub fn is_beaten(&self) -> bool {
        self.value == 0
    }
}

impl From<u32> for DealerOutcome {
    /// Builds an outcome from a bare dealer value. The dealer is never treated as holding a blackjack.
    fn from(value: u32) -> Self {
        DealerOutcome {
            value: if value > 21 { 0 } else { value },
            blackjack: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Win,
    Blackjack,
    Push,
    Loss,
    Bust,
    Surrender,
}

/// The settled result of one hand: how it ended and what it did to the player's standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub outcome: HandOutcome,
    pub wager: u32,
    pub value: u32,
    pub delta: i64,
}

/// Settles a single finished hand against the dealer.
pub fn settle_hand(hand: &Hand, dealer: &DealerOutcome, payout: &PayoutRatio) -> HandResult {
    let wager = hand.wager();
    let value = hand.value();
    let (outcome, delta) = match hand.status() {
        HandStatus::Surrendered => (HandOutcome::Surrender, -((wager / 2) as i64)),
        _ if hand.is_bust() => (HandOutcome::Bust, -(wager as i64)),
        _ if hand.is_blackjack() => {
            if dealer.is_blackjack() {
                (HandOutcome::Push, 0)
            } else {
                (HandOutcome::Blackjack, payout.payout(wager))
            }
        }
        _ if dealer.is_beaten() || value > dealer.value() => (HandOutcome::Win, wager as i64),
        _ if value == dealer.value() => (HandOutcome::Push, 0),
        _ => (HandOutcome::Loss, -(wager as i64)),
    };
    HandResult {
        outcome,
        wager,
        value,
        delta,
    }
}
