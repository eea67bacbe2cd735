use crate::card::Card;
use crate::error::{BlackjackGameError, Operation, Result};
use crate::hand::HandStatus;
use crate::player::{Action, Player};
use crate::rules::TableRules;
use crate::settlement::{DealerOutcome, HandResult};
use crate::shoe::Shoe;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TablePhase {
    Idle,
    Betting,
    Playing,
    Settled,
}

/// How a single seat came out of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatReport {
    pub name: String,
    pub in_round: bool,
    pub balance: i64,
    pub standing: i64,
    pub results: Vec<HandResult>,
}

/// Everything that happened at settlement, in seat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u64,
    pub dealer_played: bool,
    pub dealer: DealerOutcome,
    pub seats: Vec<SeatReport>,
}

/// Runs rounds of blackjack for a single table: one shoe, one dealer and any number of seated players.
///
/// A round goes `begin_round`, `place_bet` for each seat that wants in, `close_betting`,
/// `act` until `active_seat` returns `None`, and finally `finish_round`.
#[derive(Debug, Clone)]
pub struct BlackjackTable {
    rules: TableRules,
    shoe: Shoe,
    players: Vec<Player>,
    in_round: Vec<bool>,
    dealer: Player,
    phase: TablePhase,
    rounds_played: u64,
}

impl BlackjackTable {
    /// Associated function to create a new table with a freshly shuffled shoe sized by `rules`.
    pub fn new(rules: TableRules) -> Result<BlackjackTable> {
        rules.validate()?;
        let shoe = Shoe::new(rules.deck_count)?;
        BlackjackTable::with_shoe(rules, shoe)
    }

    /// Creates a table that deals from `shoe`, e.g. a seeded or stacked one.
    pub fn with_shoe(rules: TableRules, shoe: Shoe) -> Result<BlackjackTable> {
        rules.validate()?;
        Ok(BlackjackTable {
            rules,
            shoe,
            players: Vec::new(),
            in_round: Vec::new(),
            dealer: Player::with_rules("Dealer", true, 0, rules),
            phase: TablePhase::Idle,
            rounds_played: 0,
        })
    }

    /// Seats a new player and returns their seat index. Players cannot join mid round.
    pub fn seat_player(&mut self, name: &str, balance: i64) -> Result<usize> {
        if name.trim().is_empty() {
            return Err(BlackjackGameError::InvalidConfig(
                "player name cannot be empty".to_string(),
            ));
        }
        if self.phase == TablePhase::Playing {
            return Err(BlackjackGameError::illegal(
                Operation::Bet,
                "cannot seat a player in the middle of a round",
            ));
        }
        self.players
            .push(Player::with_rules(name, false, balance, self.rules));
        self.in_round.push(false);
        Ok(self.players.len() - 1)
    }

    /// Starts a new round: resets the shoe and opens betting.
    pub fn begin_round(&mut self) -> Result<()> {
        match self.phase {
            TablePhase::Idle | TablePhase::Settled => {}
            _ => {
                return Err(BlackjackGameError::illegal(
                    Operation::Bet,
                    "the current round has not been settled",
                ))
            }
        }
        self.shoe.reset();
        self.in_round.iter_mut().for_each(|b| *b = false);
        self.phase = TablePhase::Betting;
        debug!("round {} begins", self.rounds_played + 1);
        Ok(())
    }

    /// Places a bet for `seat` and deals their opening hand.
    pub fn place_bet(&mut self, seat: usize, amount: u32) -> Result<()> {
        if self.phase != TablePhase::Betting {
            return Err(BlackjackGameError::illegal(Operation::Bet, "betting is closed"));
        }
        check_seat(seat, self.players.len())?;
        self.players[seat].bet(amount, &mut self.shoe)?;
        self.in_round[seat] = true;
        Ok(())
    }

    /// Deals the dealer's hand and starts play. At least one seat must have bet.
    pub fn close_betting(&mut self) -> Result<()> {
        if self.phase != TablePhase::Betting {
            return Err(BlackjackGameError::illegal(Operation::Bet, "betting is closed"));
        }
        if !self.in_round.iter().any(|&b| b) {
            return Err(BlackjackGameError::illegal(
                Operation::Bet,
                "no seat has placed a bet",
            ));
        }
        self.dealer.bet(0, &mut self.shoe)?;
        self.phase = TablePhase::Playing;
        Ok(())
    }

    /// The first seat, in seat order, that still has a hand accepting actions.
    pub fn active_seat(&self) -> Option<usize> {
        if self.phase != TablePhase::Playing {
            return None;
        }
        self.players.iter().position(|p| p.is_playing())
    }

    /// Plays `action` for `seat`. Only the active seat may act.
    pub fn act(&mut self, seat: usize, action: Action) -> Result<HandStatus> {
        check_seat(seat, self.players.len())?;
        if self.active_seat() != Some(seat) {
            return Err(BlackjackGameError::illegal(
                action,
                "it is not this seat's turn",
            ));
        }
        self.players[seat].play(action, &mut self.shoe)
    }

    /// The dealer's face up card once betting is closed.
    pub fn dealer_up_card(&self) -> Option<Card> {
        self.dealer.hand_at(0).and_then(|h| h.card_at(0)).copied()
    }

    /// The dealer only plays out their hand if some seat in the round can still win.
    pub fn dealer_must_play(&self) -> bool {
        self.players
            .iter()
            .zip(self.in_round.iter())
            .any(|(p, &in_round)| in_round && !p.has_lost())
    }

    /// Plays the dealer if needed, settles every seat and closes the round.
    pub fn finish_round(&mut self) -> Result<RoundReport> {
        if self.phase != TablePhase::Playing {
            return Err(BlackjackGameError::illegal(
                Operation::Settle,
                "there is no round in play",
            ));
        }
        if let Some(seat) = self.active_seat() {
            debug!("seat {} is still acting", seat);
            return Err(BlackjackGameError::illegal(
                Operation::Settle,
                "a seat is still acting",
            ));
        }

        let dealer_played = self.dealer_must_play();
        let dealer = if dealer_played {
            self.dealer.play_as_dealer(&mut self.shoe)?;
            self.dealer
                .hand_at(0)
                .map(DealerOutcome::from_hand)
                .unwrap_or_default()
        } else {
            if self.dealer.is_playing() {
                self.dealer.stand()?;
            }
            DealerOutcome::did_not_play()
        };

        for (player, &in_round) in self.players.iter_mut().zip(self.in_round.iter()) {
            if in_round {
                player.game_over(dealer)?;
            }
        }
        self.dealer.game_over(dealer)?;
        self.phase = TablePhase::Settled;
        self.rounds_played += 1;

        let seats = self
            .players
            .iter()
            .zip(self.in_round.iter())
            .map(|(p, &in_round)| SeatReport {
                name: p.name().to_string(),
                in_round,
                balance: p.balance(),
                standing: if in_round { p.standing() } else { 0 },
                results: if in_round {
                    p.last_results().to_vec()
                } else {
                    Vec::new()
                },
            })
            .collect();
        debug!(
            "round {} settled, dealer {}",
            self.rounds_played,
            if dealer_played {
                dealer.value().to_string()
            } else {
                "did not play".to_string()
            }
        );

        Ok(RoundReport {
            round: self.rounds_played,
            dealer_played,
            dealer,
            seats,
        })
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    pub fn seat_count(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn dealer(&self) -> &Player {
        &self.dealer
    }

    pub fn is_in_round(&self, seat: usize) -> bool {
        self.in_round.get(seat).copied().unwrap_or(false)
    }
}

fn check_seat(seat: usize, seats: usize) -> Result<()> {
    if seat >= seats {
        return Err(BlackjackGameError::InvalidConfig(format!(
            "no player at seat {}",
            seat
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};
    use crate::settlement::HandOutcome;

    fn table(ranks: &[Rank]) -> BlackjackTable {
        let cards = ranks.iter().map(|&r| Card::new(r, Suit::Hearts)).collect();
        BlackjackTable::with_shoe(TableRules::default(), Shoe::stacked(cards)).unwrap()
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut t = table(&[]);
        assert!(matches!(
            t.seat_player(" ", 100),
            Err(BlackjackGameError::InvalidConfig(_))
        ));
        assert_eq!(t.seat_player("Ann", 100).unwrap(), 0);
        assert_eq!(t.seat_player("Ben", 100).unwrap(), 1);
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let rules = TableRules::new().deck_count(0).build();
        assert!(BlackjackTable::new(rules).is_err());
    }

    #[test]
    fn full_round_with_dealer_play() {
        // player 10 9, dealer 10 6, dealer draws 5 for 21
        let mut t = table(&[Rank::Ten, Rank::Nine, Rank::Ten, Rank::Six, Rank::Five]);
        let seat = t.seat_player("Ann", 1000).unwrap();
        t.begin_round().unwrap();
        t.place_bet(seat, 100).unwrap();
        t.close_betting().unwrap();
        assert_eq!(t.dealer_up_card(), Some(Card::new(Rank::Ten, Suit::Hearts)));
        assert_eq!(t.active_seat(), Some(seat));

        assert!(t.finish_round().unwrap_err().is_illegal_action());

        assert_eq!(t.act(seat, Action::Stand).unwrap(), HandStatus::Stood);
        assert_eq!(t.active_seat(), None);
        assert!(t.dealer_must_play());

        let report = t.finish_round().unwrap();
        assert!(report.dealer_played);
        assert_eq!(report.dealer.value(), 21);
        assert_eq!(report.seats[0].standing, -100);
        assert_eq!(report.seats[0].balance, 900);
        assert_eq!(report.seats[0].results[0].outcome, HandOutcome::Loss);
        assert_eq!(t.phase(), TablePhase::Settled);
        assert_eq!(t.rounds_played(), 1);
    }

    #[test]
    fn dealer_skipped_when_every_seat_lost() {
        // player 10 6 busts on the king, dealer 10 2 never draws
        let mut t = table(&[Rank::Ten, Rank::Six, Rank::Ten, Rank::Two, Rank::King, Rank::Nine]);
        let seat = t.seat_player("Ann", 1000).unwrap();
        t.begin_round().unwrap();
        t.place_bet(seat, 100).unwrap();
        t.close_betting().unwrap();
        assert_eq!(t.act(seat, Action::Hit).unwrap(), HandStatus::Busted);
        assert!(!t.dealer_must_play());

        let report = t.finish_round().unwrap();
        assert!(!report.dealer_played);
        assert_eq!(t.shoe().remaining(), 1);
        assert_eq!(report.seats[0].standing, -100);
    }

    #[test]
    fn surrendered_seat_does_not_wake_the_dealer() {
        let mut t = table(&[Rank::Ten, Rank::Six, Rank::Ten, Rank::Two, Rank::Four]);
        let seat = t.seat_player("Ann", 1000).unwrap();
        t.begin_round().unwrap();
        t.place_bet(seat, 100).unwrap();
        t.close_betting().unwrap();
        t.act(seat, Action::Surrender).unwrap();
        let report = t.finish_round().unwrap();
        assert!(!report.dealer_played);
        assert_eq!(report.seats[0].balance, 950);
    }

    #[test]
    fn only_the_active_seat_may_act() {
        let mut t = table(&[
            Rank::Ten,
            Rank::Six,
            Rank::Ten,
            Rank::Seven,
            Rank::Ten,
            Rank::Eight,
        ]);
        let ann = t.seat_player("Ann", 100).unwrap();
        let ben = t.seat_player("Ben", 100).unwrap();
        t.begin_round().unwrap();
        t.place_bet(ann, 10).unwrap();
        t.place_bet(ben, 10).unwrap();
        t.close_betting().unwrap();

        assert!(t.act(ben, Action::Stand).unwrap_err().is_illegal_action());
        t.act(ann, Action::Stand).unwrap();
        assert_eq!(t.active_seat(), Some(ben));
        t.act(ben, Action::Stand).unwrap();
        assert_eq!(t.active_seat(), None);

        let report = t.finish_round().unwrap();
        // dealer 18 beats 16 and 17
        assert_eq!(report.dealer.value(), 18);
        assert!(report.seats.iter().all(|s| s.standing == -10));
    }

    #[test]
    fn seats_may_sit_out() {
        let mut t = table(&[Rank::Ten, Rank::Nine, Rank::Ten, Rank::Seven]);
        let ann = t.seat_player("Ann", 100).unwrap();
        let ben = t.seat_player("Ben", 100).unwrap();
        t.begin_round().unwrap();
        t.place_bet(ann, 10).unwrap();
        t.close_betting().unwrap();
        assert!(t.act(ben, Action::Hit).is_err());
        t.act(ann, Action::Stand).unwrap();

        let report = t.finish_round().unwrap();
        assert!(report.seats[0].in_round);
        assert_eq!(report.seats[0].standing, 10);
        assert!(!report.seats[1].in_round);
        assert_eq!(report.seats[1].balance, 100);
        assert!(report.seats[1].results.is_empty());
    }

    #[test]
    fn betting_closes_once() {
        let mut t = table(&[Rank::Ten, Rank::Nine, Rank::Ten, Rank::Seven]);
        let ann = t.seat_player("Ann", 100).unwrap();
        assert!(t.place_bet(ann, 10).is_err());
        t.begin_round().unwrap();
        assert!(t.close_betting().unwrap_err().is_illegal_action());
        t.place_bet(ann, 10).unwrap();
        t.close_betting().unwrap();
        assert!(t.place_bet(ann, 10).is_err());
        assert!(t.begin_round().is_err());
        assert!(t.seat_player("Ben", 100).is_err());
    }

    #[test]
    fn bad_seat_index() {
        let mut t = table(&[]);
        t.begin_round().unwrap();
        assert!(matches!(
            t.place_bet(3, 10),
            Err(BlackjackGameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn balances_carry_between_rounds() {
        // the stacked shoe rewinds every round: player 10 9, dealer 10 7
        let mut t = table(&[Rank::Ten, Rank::Nine, Rank::Ten, Rank::Seven]);
        let ann = t.seat_player("Ann", 100).unwrap();
        for round in 1..=3 {
            t.begin_round().unwrap();
            t.place_bet(ann, 10).unwrap();
            t.close_betting().unwrap();
            t.act(ann, Action::Stand).unwrap();
            let report = t.finish_round().unwrap();
            assert_eq!(report.round, round);
            assert_eq!(report.seats[0].balance, 100 + 10 * round as i64);
        }
    }
}
