use crate::card::Card;
use crate::error::{BlackjackGameError, Operation, Result};
use crate::hand::{Hand, HandOrigin, HandStatus};
use crate::rules::TableRules;
use crate::settlement::{settle_hand, DealerOutcome, HandResult};
use crate::shoe::Shoe;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Most hands a single player can hold in one round, i.e. one split.
pub const MAX_HANDS: usize = 2;

/// The choices a player makes for their current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    Surrender,
    Split,
    Double,
}

impl Action {
    /// The actions a player may choose between while a hand is in play.
    pub const HAND_ACTIONS: [Action; 5] = [
        Action::Hit,
        Action::Stand,
        Action::Surrender,
        Action::Split,
        Action::Double,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Surrender => "surrender",
            Action::Split => "split",
            Action::Double => "double",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    /// Parses one of the hand action commands, `hit`, `stand`, `surrender`, `split` or `double`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Action::HAND_ACTIONS
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown command '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Dealer,
}

/// Where a player is within the current round.
///
/// `Acting(idx)` names the single hand currently accepting actions, the engine moves it forward
/// by itself whenever that hand becomes set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Betting,
    Acting(usize),
    AllHandsSet,
    Settled,
}

/// Returns true if the dealer must draw another card to `hand` under `rules`.
pub fn dealer_should_hit(hand: &Hand, rules: &TableRules) -> bool {
    let value = hand.value();
    value < rules.dealer_stands_on || (rules.dealer_hits_soft_17 && value == 17 && hand.is_soft())
}

/// A seat at the table, either an ordinary player or the dealer.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    role: Role,
    balance: i64,
    standing: i64,
    hands: Vec<Hand>,
    state: PlayerState,
    rules: TableRules,
    last_results: Vec<HandResult>,
}

impl Player {
    /// Associated function to create a new `Player` playing under the default `TableRules`.
    /// A blank name is replaced with `"Unnamed player"`. The balance of a dealer is never used.
    pub fn new(name: impl Into<String>, is_dealer: bool, balance: i64) -> Player {
        Player::with_rules(name, is_dealer, balance, TableRules::default())
    }

    /// Same as `Player::new` but eligibility and payouts follow `rules`.
    pub fn with_rules(
        name: impl Into<String>,
        is_dealer: bool,
        balance: i64,
        rules: TableRules,
    ) -> Player {
        let name = name.into().trim().to_string();
        Player {
            name: if name.is_empty() {
                "Unnamed player".to_string()
            } else {
                name
            },
            role: if is_dealer { Role::Dealer } else { Role::Player },
            balance,
            standing: 0,
            hands: Vec::with_capacity(MAX_HANDS),
            state: PlayerState::Idle,
            rules,
            last_results: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_dealer(&self) -> bool {
        self.role == Role::Dealer
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Net change of the balance during the current (or last settled) round.
    pub fn standing(&self) -> i64 {
        self.standing
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    pub fn hand_at(&self, idx: usize) -> Option<&Hand> {
        self.hands.get(idx)
    }

    pub fn current_hand_index(&self) -> Option<usize> {
        match self.state {
            PlayerState::Acting(idx) => Some(idx),
            _ => None,
        }
    }

    pub fn current_hand(&self) -> Option<&Hand> {
        self.current_hand_index().map(|idx| &self.hands[idx])
    }

    /// Per hand results of the last settled round.
    pub fn last_results(&self) -> &[HandResult] {
        &self.last_results
    }

    /// True while one of the player's hands still accepts actions.
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlayerState::Acting(_))
    }

    /// True if every hand the player owns busted or was surrendered.
    /// A player holding no hands has nothing left to win and counts as lost.
    pub fn has_lost(&self) -> bool {
        self.hands.iter().all(|hand| hand.has_lost())
    }

    pub fn can_split(&self) -> bool {
        self.hands.len() < MAX_HANDS && self.current_hand().map_or(false, |h| h.can_split())
    }

    pub fn can_double(&self) -> bool {
        self.current_hand()
            .map_or(false, |h| h.can_double(&self.rules))
    }

    pub fn can_surrender(&self) -> bool {
        self.current_hand()
            .map_or(false, |h| h.can_surrender(&self.rules))
    }

    /// Places a wager and deals a new hand of two cards from `shoe`.
    /// Only allowed when the player has no hands in progress. Resets the round standing.
    pub fn bet(&mut self, amount: u32, shoe: &mut Shoe) -> Result<()> {
        match self.state {
            PlayerState::Idle | PlayerState::Settled => {}
            PlayerState::Betting if self.hands.is_empty() => {}
            _ => {
                return Err(BlackjackGameError::illegal(
                    Operation::Bet,
                    "a round is already in progress",
                ))
            }
        }

        self.state = PlayerState::Betting;
        self.standing = 0;
        self.last_results.clear();

        let mut hand = Hand::new(amount, HandOrigin::Dealt);
        for _ in 0..2 {
            let card = shoe.draw_next()?;
            hand.receive(card, Operation::Bet)?;
        }
        if hand.is_blackjack() {
            hand.set_status(HandStatus::Blackjack);
        }
        debug!(
            "{} bets {} and is dealt {} ({})",
            self.name,
            amount,
            format_cards(hand.cards()),
            hand.value()
        );

        self.hands.push(hand);
        self.state = PlayerState::Acting(0);
        self.advance();
        Ok(())
    }

    /// Draws one card into the current hand. Returns true if the hand busted.
    pub fn hit(&mut self, shoe: &mut Shoe) -> Result<bool> {
        let hand = self.current_hand_mut(Action::Hit)?;
        let card = shoe.draw_next()?;
        hand.receive(card, Action::Hit)?;
        let busted = hand.is_bust();
        debug!("{} hits {} ({})", self.name, card, self.hand_value_label());
        self.advance();
        Ok(busted)
    }

    /// Ends play on the current hand.
    pub fn stand(&mut self) -> Result<()> {
        let hand = self.current_hand_mut(Action::Stand)?;
        hand.set_status(HandStatus::Stood);
        debug!("{} stands", self.name);
        self.advance();
        Ok(())
    }

    /// Gives up the current hand for half the wager. Only possible on an untouched two card hand.
    pub fn surrender(&mut self) -> Result<()> {
        let rules = self.rules;
        let hand = self.current_hand_mut(Action::Surrender)?;
        if !hand.can_surrender(&rules) {
            warn!("rejected surrender");
            return Err(BlackjackGameError::illegal(
                Action::Surrender,
                "only an untouched two card hand can be surrendered",
            ));
        }
        hand.set_status(HandStatus::Surrendered);
        debug!("{} surrenders", self.name);
        self.advance();
        Ok(())
    }

    /// Splits the current hand into two hands carrying the same wager and deals one more card to each.
    pub fn split(&mut self, shoe: &mut Shoe) -> Result<()> {
        let idx = self
            .current_hand_index()
            .ok_or_else(|| BlackjackGameError::illegal(Action::Split, "no hand in play"))?;
        if !self.can_split() {
            warn!("rejected split");
            return Err(BlackjackGameError::illegal(
                Action::Split,
                "only a two card hand of equal values can be split, once per round",
            ));
        }
        shoe.ensure_remaining(2)?;

        let mut second = self.hands[idx].split_off();
        self.hands[idx].receive(shoe.draw_next()?, Action::Split)?;
        second.receive(shoe.draw_next()?, Action::Split)?;
        self.hands.insert(idx + 1, second);
        debug!(
            "{} splits into {} and {}",
            self.name,
            format_cards(self.hands[idx].cards()),
            format_cards(self.hands[idx + 1].cards())
        );
        self.advance();
        Ok(())
    }

    /// Doubles the wager of the current hand, draws exactly one card and ends play on the hand.
    /// Returns true if the hand busted.
    pub fn double(&mut self, shoe: &mut Shoe) -> Result<bool> {
        let rules = self.rules;
        let hand = self.current_hand_mut(Action::Double)?;
        if !hand.can_double(&rules) {
            warn!("rejected double");
            return Err(BlackjackGameError::illegal(
                Action::Double,
                "only a two card hand can be doubled",
            ));
        }
        shoe.ensure_remaining(1)?;
        hand.double_wager()?;
        let card = shoe.draw_next()?;
        hand.receive(card, Action::Double)?;
        let busted = hand.is_bust();
        if !busted {
            hand.set_status(HandStatus::Doubled);
        }
        debug!("{} doubles and draws {} ({})", self.name, card, self.hand_value_label());
        self.advance();
        Ok(busted)
    }

    /// Plays a single hand action and returns the status of the hand it was applied to.
    pub fn play(&mut self, action: Action, shoe: &mut Shoe) -> Result<HandStatus> {
        let idx = self
            .current_hand_index()
            .ok_or_else(|| BlackjackGameError::illegal(action, "no hand in play"))?;
        match action {
            Action::Hit => self.hit(shoe).map(|_| ())?,
            Action::Stand => self.stand()?,
            Action::Surrender => self.surrender()?,
            Action::Split => self.split(shoe)?,
            Action::Double => self.double(shoe).map(|_| ())?,
        }
        Ok(self.hands[idx].status())
    }

    /// Plays the dealer's hand: draws until the hand reaches the rules' standing value, then stands.
    /// Returns the final value, or 0 if the dealer busted.
    pub fn play_as_dealer(&mut self, shoe: &mut Shoe) -> Result<u32> {
        if !self.is_dealer() {
            return Err(BlackjackGameError::illegal(
                Operation::DealerPlay,
                "only the dealer plays automatically",
            ));
        }
        if self.hands.is_empty() {
            return Err(BlackjackGameError::illegal(
                Operation::DealerPlay,
                "the dealer has not been dealt a hand",
            ));
        }

        let rules = self.rules;
        let hand = &mut self.hands[0];
        while !hand.is_set() {
            if !dealer_should_hit(hand, &rules) {
                hand.set_status(HandStatus::Stood);
                break;
            }
            hand.receive(shoe.draw_next()?, Operation::DealerPlay)?;
        }
        let value = if hand.is_bust() { 0 } else { hand.value() };
        debug!(
            "dealer finishes with {} ({})",
            format_cards(hand.cards()),
            hand.value()
        );

        self.advance();
        Ok(value)
    }

    /// Settles every hand against `dealer`, applies the round standing to the balance and discards all hands.
    /// Returns the standing. For the dealer this only clears the table.
    pub fn game_over(&mut self, dealer: impl Into<DealerOutcome>) -> Result<i64> {
        match self.state {
            PlayerState::Acting(_) => {
                return Err(BlackjackGameError::illegal(
                    Operation::Settle,
                    "hands are still in play",
                ))
            }
            PlayerState::Settled => return Ok(self.standing),
            _ => {}
        }

        let dealer = dealer.into();
        let hands = std::mem::take(&mut self.hands);
        self.state = PlayerState::Settled;
        if self.is_dealer() {
            return Ok(0);
        }

        self.last_results = hands
            .iter()
            .map(|hand| settle_hand(hand, &dealer, &self.rules.blackjack_payout))
            .collect();
        self.standing = self
            .last_results
            .iter()
            .fold(0i64, |total, r| total.saturating_add(r.delta));
        self.balance = self.balance.saturating_add(self.standing);
        debug!(
            "{} settles {} hand(s) for {}, balance {}",
            self.name,
            self.last_results.len(),
            self.standing,
            self.balance
        );
        Ok(self.standing)
    }

    fn current_hand_mut(&mut self, action: Action) -> Result<&mut Hand> {
        match self.state {
            PlayerState::Acting(idx) => Ok(&mut self.hands[idx]),
            _ => Err(BlackjackGameError::illegal(action, "no hand in play")),
        }
    }

    /// Moves the current hand cursor past hands that are set.
    fn advance(&mut self) {
        if let PlayerState::Acting(idx) = self.state {
            if !self.hands[idx].is_set() {
                return;
            }
            self.state = match (idx + 1..self.hands.len()).find(|&i| !self.hands[i].is_set()) {
                Some(next) => PlayerState::Acting(next),
                None => PlayerState::AllHandsSet,
            };
        }
    }

    fn hand_value_label(&self) -> String {
        self.hands
            .iter()
            .map(|h| h.value().to_string())
            .collect::<Vec<String>>()
            .join(", ")
    }
}

fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<21}{}", "name:", self.name)?;
        writeln!(f, "{:<21}{}", "balance:", self.balance)?;
        writeln!(f, "{:<21}{}", "standing:", self.standing)?;
        for (i, hand) in self.hands.iter().enumerate() {
            writeln!(
                f,
                "{:<21}{} ({}, {} points)",
                format!("hand #{}:", i + 1),
                format_cards(hand.cards()),
                if hand.is_set() { "set" } else { "playing" },
                hand.value()
            )?;
        }
        Ok(())
    }
}
