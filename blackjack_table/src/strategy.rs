//! Seat policies for the automated seats the runner plays. The engine never consults these, it
//! only checks that the action a policy returns is legal.

use blackjack_lib::{Action, Card, Hand, Player};
use clap::ValueEnum;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

pub mod prelude {
    pub use super::{
        AlwaysStand, BasicStrategy, DealerMimic, DecisionStrategy, StrategyKind, TableState,
    };
}

/// Everything a `DecisionStrategy` gets to look at when deciding how to play the current hand.
pub struct TableState<'a> {
    pub hand: &'a Hand,
    pub dealers_up_card: Card,
}

impl<'a> TableState<'a> {
    /// Builds the state for the current hand of `player`, `None` if the player is not acting.
    pub fn new(player: &'a Player, dealers_up_card: Card) -> Option<TableState<'a>> {
        player.current_hand().map(|hand| TableState {
            hand,
            dealers_up_card,
        })
    }
}

/// Returns the set of actions `player` may legally choose for their current hand.
pub fn available_options(player: &Player) -> HashSet<Action> {
    let mut options = HashSet::new();
    if !player.is_playing() {
        return options;
    }
    options.insert(Action::Hit);
    options.insert(Action::Stand);
    if player.can_split() {
        options.insert(Action::Split);
    }
    if player.can_double() {
        options.insert(Action::Double);
    }
    if player.can_surrender() {
        options.insert(Action::Surrender);
    }
    options
}

/// Trait for the policy that drives an automated seat. The single required method `decide_option()` takes the
/// state of the table and the options that are valid for the current hand, and returns one of those options.
pub trait DecisionStrategy {
    fn decide_option(&self, state: TableState<'_>, options: &HashSet<Action>) -> Action;

    /// Short label used in summaries.
    fn label(&self) -> &'static str;
}

/// Plays the same way the dealer has to: hit below 17, stand otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealerMimic;

impl DecisionStrategy for DealerMimic {
    fn decide_option(&self, state: TableState<'_>, _options: &HashSet<Action>) -> Action {
        if state.hand.value() < 17 {
            Action::Hit
        } else {
            Action::Stand
        }
    }

    fn label(&self) -> &'static str {
        "dealer mimic"
    }
}

/// Never draws a card after the deal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysStand;

impl DecisionStrategy for AlwaysStand {
    fn decide_option(&self, _state: TableState<'_>, _options: &HashSet<Action>) -> Action {
        Action::Stand
    }

    fn label(&self) -> &'static str {
        "always stand"
    }
}

type LookupTable = HashMap<(u32, u32), Action>;

struct LookupTables {
    hard_totals: LookupTable,
    soft_totals: LookupTable,
    pair_totals: HashMap<(u32, u32), bool>,
    surrender: HashMap<(u32, u32), bool>,
}

lazy_static! {
    static ref BASIC_STRATEGY: LookupTables = build_lookup_tables();
}

/// Populates the basic strategy tables, keyed by (player total, dealer up card value) where an ace counts 11.
/// Pairs are keyed by the point value of one card of the pair.
fn build_lookup_tables() -> LookupTables {
    let mut hard_totals = HashMap::new();
    for total in 4..=21 {
        for up in 2..=11 {
            let option = match total {
                9 => match up {
                    3..=6 => Action::Double,
                    _ => Action::Hit,
                },
                10 => match up {
                    2..=9 => Action::Double,
                    _ => Action::Hit,
                },
                11 => match up {
                    2..=10 => Action::Double,
                    _ => Action::Hit,
                },
                12 => match up {
                    4..=6 => Action::Stand,
                    _ => Action::Hit,
                },
                13..=16 => match up {
                    2..=6 => Action::Stand,
                    _ => Action::Hit,
                },
                17..=21 => Action::Stand,
                _ => Action::Hit,
            };
            hard_totals.insert((total, up), option);
        }
    }

    let mut soft_totals = HashMap::new();
    for total in 12..=21 {
        for up in 2..=11 {
            let option = match total {
                13 | 14 => match up {
                    5 | 6 => Action::Double,
                    _ => Action::Hit,
                },
                15 | 16 => match up {
                    4..=6 => Action::Double,
                    _ => Action::Hit,
                },
                17 => match up {
                    3..=6 => Action::Double,
                    _ => Action::Hit,
                },
                18 => match up {
                    3..=6 => Action::Double,
                    2 | 7 | 8 => Action::Stand,
                    _ => Action::Hit,
                },
                19..=21 => Action::Stand,
                _ => Action::Hit,
            };
            soft_totals.insert((total, up), option);
        }
    }

    let mut pair_totals = HashMap::new();
    for card in 2..=11 {
        for up in 2..=11 {
            let split = match card {
                11 | 8 => true,
                9 => matches!(up, 2..=6 | 8 | 9),
                7 | 3 | 2 => (2..=7).contains(&up),
                6 => (2..=6).contains(&up),
                4 => matches!(up, 5 | 6),
                _ => false,
            };
            pair_totals.insert((card, up), split);
        }
    }

    let mut surrender = HashMap::new();
    for total in 4..=21 {
        for up in 2..=11 {
            let give_up = match total {
                16 => (9..=11).contains(&up),
                15 => up == 10,
                _ => false,
            };
            surrender.insert((total, up), give_up);
        }
    }

    LookupTables {
        hard_totals,
        soft_totals,
        pair_totals,
        surrender,
    }
}

/// Seat policy that plays strict basic strategy from fixed lookup tables. It drives runner seats only
/// and is never offered to a human player as advice.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStrategy;

impl BasicStrategy {
    pub fn new() -> BasicStrategy {
        BasicStrategy
    }
}

impl DecisionStrategy for BasicStrategy {
    /// Checks splitting first, then surrender, then the soft or hard totals. A double that is not
    /// available falls back to standing on soft 18 and hitting otherwise.
    fn decide_option(&self, state: TableState<'_>, options: &HashSet<Action>) -> Action {
        let tables = &*BASIC_STRATEGY;
        let up = state.dealers_up_card.point_value();
        let total = state.hand.value();
        let soft = state.hand.is_soft();

        if options.contains(&Action::Split) && state.hand.can_split() {
            if let Some(card) = state.hand.card_at(0) {
                if tables
                    .pair_totals
                    .get(&(card.point_value(), up))
                    .copied()
                    .unwrap_or(false)
                {
                    return Action::Split;
                }
            }
        }

        if options.contains(&Action::Surrender)
            && !soft
            && tables.surrender.get(&(total, up)).copied().unwrap_or(false)
        {
            return Action::Surrender;
        }

        let lookup = if soft {
            &tables.soft_totals
        } else {
            &tables.hard_totals
        };
        let option = lookup.get(&(total, up)).copied().unwrap_or(Action::Stand);
        if options.contains(&option) {
            option
        } else if option == Action::Double && soft && total == 18 {
            Action::Stand
        } else if option == Action::Double {
            Action::Hit
        } else {
            Action::Stand
        }
    }

    fn label(&self) -> &'static str {
        "basic strategy"
    }
}

/// The seat strategies the runner knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    Basic,
    DealerMimic,
    Stand,
}

impl StrategyKind {
    pub fn build(&self) -> Box<dyn DecisionStrategy> {
        match self {
            StrategyKind::Basic => Box::new(BasicStrategy::new()),
            StrategyKind::DealerMimic => Box::new(DealerMimic),
            StrategyKind::Stand => Box::new(AlwaysStand),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.build().label())
    }
}
