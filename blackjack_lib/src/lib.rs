//! A single table blackjack engine: shoe, hands, players with split/double/surrender,
//! automatic dealer play and settlement.

pub mod card;
pub mod error;
pub mod hand;
pub mod player;
pub mod rules;
pub mod settlement;
pub mod shoe;
pub mod table;

pub use card::{Card, Rank, Suit, STANDARD_DECK};
pub use error::{BlackjackGameError, Operation, Result};
pub use hand::{hand_value, is_soft, Hand, HandOrigin, HandStatus};
pub use player::{dealer_should_hit, Action, Player, PlayerState, Role, MAX_HANDS};
pub use rules::{PayoutRatio, TableRules, TableRulesBuilder};
pub use settlement::{settle_hand, DealerOutcome, HandOutcome, HandResult};
pub use shoe::Shoe;
pub use table::{BlackjackTable, RoundReport, SeatReport, TablePhase};

pub mod prelude {
    pub use super::{
        Action, BlackjackGameError, BlackjackTable, Card, DealerOutcome, Hand, HandOutcome,
        HandStatus, Operation, Player, PlayerState, Rank, RoundReport, Shoe, Suit, TableRules,
    };
}
