use crate::card::{Card, STANDARD_DECK};
use crate::error::{BlackjackGameError, Result};
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// The drawable pool of one or more 52 card decks.
///
/// A `Shoe` keeps every card it was built with and a cursor to the next card to deal, so drawing never
/// removes anything and `reset` can restore the full set. The engine never reshuffles on its own
/// in the middle of a round, `reset` must be called before the first deal of every round.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    deck_count: usize,
    cursor: usize,
    rng: StdRng,
    stacked: bool,
}

impl Shoe {
    /// Associated function to create a new shuffled `Shoe` made of `deck_count` standard decks.
    /// Returns `BlackjackGameError::InvalidConfig` when `deck_count` is zero.
    pub fn new(deck_count: usize) -> Result<Shoe> {
        Shoe::build(deck_count, StdRng::from_entropy())
    }

    /// Same as `Shoe::new` but every shuffle is driven by a generator seeded with `seed`,
    /// which makes the order of the dealt cards reproducible.
    pub fn with_seed(deck_count: usize, seed: u64) -> Result<Shoe> {
        Shoe::build(deck_count, StdRng::seed_from_u64(seed))
    }

    /// Creates a shoe that deals exactly `cards`, in order and unshuffled.
    /// Useful for replaying a known sequence, `reset` rewinds it to the first card and `shuffle` does nothing.
    pub fn stacked(cards: Vec<Card>) -> Shoe {
        let deck_count = ((cards.len() + 51) / 52).max(1);
        Shoe {
            cards,
            deck_count,
            cursor: 0,
            rng: StdRng::seed_from_u64(0),
            stacked: true,
        }
    }

    fn build(deck_count: usize, rng: StdRng) -> Result<Shoe> {
        if deck_count == 0 {
            return Err(BlackjackGameError::InvalidConfig(
                "a shoe needs at least one deck".to_string(),
            ));
        }
        let mut shoe = Shoe {
            cards: Vec::with_capacity(deck_count * STANDARD_DECK.len()),
            deck_count,
            cursor: 0,
            rng,
            stacked: false,
        };
        shoe.reset();
        Ok(shoe)
    }

    /// Rebuilds the full set of cards for the configured number of decks and shuffles it.
    pub fn reset(&mut self) {
        self.cursor = 0;
        if self.stacked {
            return;
        }
        self.cards.clear();
        for _ in 0..self.deck_count {
            self.cards.extend(STANDARD_DECK.iter().copied());
        }
        self.shuffle();
    }

    /// Shuffles the cards that have not been dealt yet, cards already dealt keep their positions.
    pub fn shuffle(&mut self) {
        if self.stacked {
            return;
        }
        trace!("shuffling {} undealt cards", self.remaining());
        let cursor = self.cursor;
        self.cards[cursor..].shuffle(&mut self.rng);
    }

    /// Deals the next card. Fails with `BlackjackGameError::ShoeExhausted` once every card is dealt.
    pub fn draw_next(&mut self) -> Result<Card> {
        match self.cards.get(self.cursor) {
            Some(&card) => {
                self.cursor += 1;
                Ok(card)
            }
            None => Err(BlackjackGameError::ShoeExhausted {
                dealt: self.cursor,
                total: self.cards.len(),
            }),
        }
    }

    /// Fails with `ShoeExhausted` unless at least `n` cards are left.
    pub(crate) fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(BlackjackGameError::ShoeExhausted {
                dealt: self.cursor,
                total: self.cards.len(),
            });
        }
        Ok(())
    }

    pub fn deck_count(&self) -> usize {
        self.deck_count
    }

    /// Total number of cards in the shoe, dealt or not.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn dealt(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};
    use std::collections::{HashMap, HashSet};

    #[test]
    fn zero_decks_is_invalid() {
        assert!(matches!(
            Shoe::new(0),
            Err(BlackjackGameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn draws_every_card_then_exhausts() {
        for decks in [1, 2, 6] {
            let mut shoe = Shoe::with_seed(decks, 7).unwrap();
            shoe.reset();
            for _ in 0..decks * 52 {
                assert!(shoe.draw_next().is_ok());
            }
            assert_eq!(shoe.remaining(), 0);
            assert_eq!(
                shoe.draw_next(),
                Err(BlackjackGameError::ShoeExhausted {
                    dealt: decks * 52,
                    total: decks * 52
                })
            );
        }
    }

    #[test]
    fn single_deck_never_repeats_a_card() {
        let mut shoe = Shoe::with_seed(1, 42).unwrap();
        let mut seen = HashSet::new();
        while let Ok(card) = shoe.draw_next() {
            assert!(seen.insert(card), "{} dealt twice", card);
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn multi_deck_holds_each_card_deck_count_times() {
        let mut shoe = Shoe::with_seed(4, 3).unwrap();
        let mut counts: HashMap<Card, usize> = HashMap::new();
        while let Ok(card) = shoe.draw_next() {
            *counts.entry(card).or_default() += 1;
        }
        assert_eq!(counts.len(), 52);
        assert!(counts.values().all(|&n| n == 4));
    }

    #[test]
    fn reset_restores_full_shoe() {
        let mut shoe = Shoe::with_seed(2, 11).unwrap();
        for _ in 0..30 {
            shoe.draw_next().unwrap();
        }
        assert_eq!(shoe.dealt(), 30);
        shoe.reset();
        assert_eq!(shoe.dealt(), 0);
        assert_eq!(shoe.remaining(), 104);
        assert_eq!(shoe.len(), 104);
    }

    #[test]
    fn shuffle_keeps_dealt_cards_and_cardinality() {
        let mut shoe = Shoe::with_seed(1, 5).unwrap();
        let first = shoe.draw_next().unwrap();
        shoe.shuffle();
        assert_eq!(shoe.len(), 52);
        assert_eq!(shoe.dealt(), 1);
        let mut rest = HashSet::new();
        while let Ok(card) = shoe.draw_next() {
            rest.insert(card);
        }
        assert_eq!(rest.len(), 51);
        assert!(!rest.contains(&first));
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = Shoe::with_seed(6, 99).unwrap();
        let mut b = Shoe::with_seed(6, 99).unwrap();
        for _ in 0..20 {
            assert_eq!(a.draw_next().unwrap(), b.draw_next().unwrap());
        }
    }

    #[test]
    fn stacked_shoe_deals_in_order() {
        let cards = vec![
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Two, Suit::Hearts),
        ];
        let mut shoe = Shoe::stacked(cards.clone());
        assert_eq!(shoe.deck_count(), 1);
        assert_eq!(shoe.draw_next().unwrap(), cards[0]);
        assert_eq!(shoe.draw_next().unwrap(), cards[1]);
        assert!(shoe.is_empty());
        assert!(shoe.draw_next().is_err());

        shoe.reset();
        assert_eq!(shoe.remaining(), 2);
        assert_eq!(shoe.draw_next().unwrap(), cards[0]);
    }
}
