use crate::card::Card;
use crate::error::{BlackjackGameError, Operation, Result};
use crate::player::Action;
use crate::rules::TableRules;
use serde::{Deserialize, Serialize};

/// Computes the value of a blackjack hand. Every ace starts at 11 and is downgraded to 1,
/// one at a time, while the total is over 21.
pub fn hand_value(cards: &[Card]) -> u32 {
    let (total, _) = value_and_soft_aces(cards);
    total
}

/// Returns true if at least one ace in `cards` is still counted as 11.
pub fn is_soft(cards: &[Card]) -> bool {
    let (_, soft_aces) = value_and_soft_aces(cards);
    soft_aces > 0
}

fn value_and_soft_aces(cards: &[Card]) -> (u32, u32) {
    let mut total: u32 = cards.iter().map(|c| c.point_value()).sum();
    let mut aces = cards.iter().filter(|c| c.is_ace()).count() as u32;
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    (total, aces)
}

/// Where a hand came from. Split hands cannot be split again and never count as a blackjack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOrigin {
    Dealt,
    Split,
}

/// The play status of a hand. Every status other than `Open` means the hand is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandStatus {
    Open,
    Stood,
    Busted,
    Blackjack,
    Doubled,
    Surrendered,
}

impl HandStatus {
    pub fn is_set(&self) -> bool {
        *self != HandStatus::Open
    }
}

/// One wagered sequence of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
    wager: u32,
    status: HandStatus,
    origin: HandOrigin,
}

impl Hand {
    /// Creates an empty, open hand carrying `wager`.
    pub fn new(wager: u32, origin: HandOrigin) -> Hand {
        Hand {
            cards: Vec::with_capacity(11),
            wager,
            status: HandStatus::Open,
            origin,
        }
    }

    /// Builds an open hand holding `cards`, mostly useful for inspecting hand arithmetic.
    pub fn from_cards(cards: Vec<Card>, wager: u32, origin: HandOrigin) -> Hand {
        Hand {
            cards,
            wager,
            status: HandStatus::Open,
            origin,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card_at(&self, idx: usize) -> Option<&Card> {
        self.cards.get(idx)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn wager(&self) -> u32 {
        self.wager
    }

    pub fn status(&self) -> HandStatus {
        self.status
    }

    pub fn origin(&self) -> HandOrigin {
        self.origin
    }

    pub fn is_set(&self) -> bool {
        self.status.is_set()
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }

    /// A natural: exactly two cards worth 21 on a hand that was dealt, not split.
    pub fn is_blackjack(&self) -> bool {
        self.origin == HandOrigin::Dealt && self.cards.len() == 2 && self.value() == 21
    }

    pub fn is_surrendered(&self) -> bool {
        self.status == HandStatus::Surrendered
    }

    /// True if the hand can no longer win: it busted or was surrendered.
    pub fn has_lost(&self) -> bool {
        matches!(self.status, HandStatus::Busted | HandStatus::Surrendered)
    }

    /// Two open cards of equal point value on a dealt hand. Ten and king may be split.
    pub fn can_split(&self) -> bool {
        !self.is_set()
            && self.origin == HandOrigin::Dealt
            && self.cards.len() == 2
            && self.cards[0].point_value() == self.cards[1].point_value()
    }

    pub fn can_double(&self, rules: &TableRules) -> bool {
        !self.is_set()
            && self.cards.len() == 2
            && (self.origin == HandOrigin::Dealt || rules.double_after_split)
    }

    pub fn can_surrender(&self, rules: &TableRules) -> bool {
        rules.allow_surrender
            && !self.is_set()
            && self.origin == HandOrigin::Dealt
            && self.cards.len() == 2
    }

    /// Appends `card`. A hand that goes over 21 becomes `Busted`.
    pub(crate) fn receive(&mut self, card: Card, operation: impl Into<Operation>) -> Result<()> {
        if self.is_set() {
            return Err(BlackjackGameError::illegal(operation, "hand is already set"));
        }
        self.cards.push(card);
        if self.is_bust() {
            self.status = HandStatus::Busted;
        }
        Ok(())
    }

    pub(crate) fn set_status(&mut self, status: HandStatus) {
        self.status = status;
    }

    /// Fails without touching the wager if the doubled amount does not fit in a `u32`.
    pub(crate) fn double_wager(&mut self) -> Result<()> {
        self.wager = self.wager.checked_mul(2).ok_or_else(|| {
            BlackjackGameError::illegal(Action::Double, "the doubled wager is too large")
        })?;
        Ok(())
    }

    /// Takes the second card out of a two card hand, leaving both halves as split hands.
    pub(crate) fn split_off(&mut self) -> Hand {
        let second = self.cards.split_off(1);
        self.origin = HandOrigin::Split;
        Hand::from_cards(second, self.wager, HandOrigin::Split)
    }
}
