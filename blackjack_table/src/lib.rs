pub mod config;
pub mod strategy;
pub mod write;

use blackjack_lib::{Action, BlackjackGameError, BlackjackTable, HandOutcome, RoundReport, Shoe};
use config::SimulatorConfig;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strategy::{available_options, DecisionStrategy, TableState};
use thiserror::Error;

pub mod prelude {
    pub use super::{
        config::{FileConfig, SimulatorConfig, SimulatorConfigBuilder},
        strategy::prelude::*,
        write::OutputFormat,
        SeatSummary, SimulationError, SimulationSummary, TableSimulator,
    };
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("game error: {0}")]
    GameError(#[from] BlackjackGameError),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Starting and final balance of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    pub name: String,
    pub starting_balance: i64,
    pub final_balance: i64,
    pub rounds_played: u32,
}

/// Simple struct for recording all of the interesting data points accumulated during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub label: String,
    pub seed: u64,
    pub rounds_played: u32,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub player_blackjacks: u32,
    pub busts: u32,
    pub surrenders: u32,
    pub dealer_busts: u32,
    pub dealer_skips: u32,
    pub winnings: i64,
    pub ended_early: bool,
    pub seats: Vec<SeatSummary>,
}

impl SimulationSummary {
    fn new(label: &str, seed: u64) -> Self {
        SimulationSummary {
            label: label.to_string(),
            seed,
            rounds_played: 0,
            wins: 0,
            pushes: 0,
            losses: 0,
            player_blackjacks: 0,
            busts: 0,
            surrenders: 0,
            dealer_busts: 0,
            dealer_skips: 0,
            winnings: 0,
            ended_early: false,
            seats: Vec::new(),
        }
    }

    pub fn total_hands(&self) -> u32 {
        self.wins + self.pushes + self.losses
    }

    /// Folds one settled round into the running totals.
    fn record(&mut self, report: &RoundReport) {
        self.rounds_played += 1;
        if !report.dealer_played {
            self.dealer_skips += 1;
        } else if report.dealer.is_beaten() {
            self.dealer_busts += 1;
        }

        for seat in report.seats.iter().filter(|s| s.in_round) {
            self.winnings += seat.standing;
            for result in seat.results.iter() {
                match result.outcome {
                    HandOutcome::Win => self.wins += 1,
                    HandOutcome::Blackjack => {
                        self.wins += 1;
                        self.player_blackjacks += 1;
                    }
                    HandOutcome::Push => self.pushes += 1,
                    HandOutcome::Loss => self.losses += 1,
                    HandOutcome::Bust => {
                        self.losses += 1;
                        self.busts += 1;
                    }
                    HandOutcome::Surrender => {
                        self.losses += 1;
                        self.surrenders += 1;
                    }
                }
            }
        }
    }
}

fn ratio(n: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 / total as f64
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let total_hands = self.total_hands();
        let body = format!(
            "{}{}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n",
            "strategy: ",
            self.label,
            "seed",
            self.seed,
            "rounds played",
            self.rounds_played,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "winnings",
            self.winnings,
            "number of player blackjacks",
            self.player_blackjacks,
            "number of busts",
            self.busts,
            "number of surrenders",
            self.surrenders,
            "dealer busts",
            self.dealer_busts,
            "rounds the dealer skipped",
            self.dealer_skips,
            "win percentage",
            ratio(self.wins, total_hands),
            "push percentage",
            ratio(self.pushes, total_hands),
            "loss percentage",
            ratio(self.losses, total_hands),
        );
        write!(f, "{}", body)?;
        for seat in self.seats.iter() {
            writeln!(
                f,
                "{:<TEXT_WIDTH$}{:>NUM_WIDTH$}",
                format!("{} (started with {})", seat.name, seat.starting_balance),
                seat.final_balance
            )?;
        }
        if self.ended_early {
            writeln!(f, "ended early: no seat could cover the wager")?;
        }
        Ok(())
    }
}

/// Plays a configured number of rounds at a single table, every seat following the same decision strategy.
/// Balances carry over from one round to the next.
pub struct TableSimulator {
    table: BlackjackTable,
    strategy: Box<dyn DecisionStrategy>,
    config: SimulatorConfig,
    seed: u64,
}

impl TableSimulator {
    /// Creates the table and seats the configured players. Without a configured seed one is drawn at random,
    /// the seed in use always ends up in the summary.
    pub fn new(config: SimulatorConfig) -> Result<TableSimulator, SimulationError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let shoe = Shoe::with_seed(config.rules.deck_count, seed)?;
        TableSimulator::seat_players(config, shoe, seed)
    }

    /// Like `new`, but deals every round from `shoe`. A stacked shoe replays the same cards each round.
    /// The summary reports the configured seed, or 0 when there is none.
    pub fn with_shoe(
        config: SimulatorConfig,
        shoe: Shoe,
    ) -> Result<TableSimulator, SimulationError> {
        config.validate()?;
        let seed = config.seed.unwrap_or(0);
        TableSimulator::seat_players(config, shoe, seed)
    }

    fn seat_players(
        config: SimulatorConfig,
        shoe: Shoe,
        seed: u64,
    ) -> Result<TableSimulator, SimulationError> {
        let mut table = BlackjackTable::with_shoe(config.rules, shoe)?;
        for name in config.players.iter() {
            table.seat_player(name, config.starting_balance)?;
        }
        info!(
            "seated {} player(s), {} deck shoe, seed {}",
            table.seat_count(),
            config.rules.deck_count,
            seed
        );
        Ok(TableSimulator {
            table,
            strategy: config.strategy.build(),
            config,
            seed,
        })
    }

    pub fn table(&self) -> &BlackjackTable {
        &self.table
    }

    /// Plays every configured round, ending early once no seat can afford to bet.
    pub fn run(&mut self) -> Result<SimulationSummary, SimulationError> {
        let mut summary = SimulationSummary::new(self.strategy.label(), self.seed);
        let mut rounds_per_seat = vec![0u32; self.table.seat_count()];

        for _ in 0..self.config.rounds {
            match self.play_round()? {
                Some(report) => {
                    for (count, seat) in rounds_per_seat.iter_mut().zip(report.seats.iter()) {
                        if seat.in_round {
                            *count += 1;
                        }
                    }
                    summary.record(&report);
                }
                None => {
                    summary.ended_early = true;
                    break;
                }
            }
        }

        summary.seats = self
            .table
            .players()
            .iter()
            .zip(rounds_per_seat)
            .map(|(player, rounds_played)| SeatSummary {
                name: player.name().to_string(),
                starting_balance: self.config.starting_balance,
                final_balance: player.balance(),
                rounds_played,
            })
            .collect();
        Ok(summary)
    }

    /// Plays one full round. Returns `None` without dealing when no seat can cover a bet.
    pub fn play_round(&mut self) -> Result<Option<RoundReport>, SimulationError> {
        self.table.begin_round()?;
        let mut any_bet = false;
        for seat in 0..self.table.seat_count() {
            let balance = self.table.player(seat).map_or(0, |p| p.balance());
            if balance <= 0 {
                continue;
            }
            let amount = u32::try_from(balance).map_or(self.config.wager, |b| b.min(self.config.wager));
            self.table.place_bet(seat, amount)?;
            any_bet = true;
        }
        if !any_bet {
            info!("no seat can cover a bet, stopping");
            return Ok(None);
        }
        self.table.close_betting()?;

        while let Some(seat) = self.table.active_seat() {
            let action = self.decide(seat)?;
            match self.table.act(seat, action) {
                Ok(status) => debug!("seat {} plays {}: {:?}", seat, action, status),
                Err(e) if e.is_illegal_action() => {
                    warn!("seat {} tried {}: {}, standing instead", seat, action, e);
                    self.table.act(seat, Action::Stand)?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let report = self.table.finish_round()?;
        if !self.config.silent {
            info!(
                "round {}: dealer {}, {}",
                report.round,
                if report.dealer_played {
                    report.dealer.value().to_string()
                } else {
                    "skipped".to_string()
                },
                report
                    .seats
                    .iter()
                    .map(|s| format!("{} {:+} ({})", s.name, s.standing, s.balance))
                    .collect::<Vec<String>>()
                    .join(", ")
            );
        }
        Ok(Some(report))
    }

    fn decide(&self, seat: usize) -> Result<Action, SimulationError> {
        let player = self
            .table
            .player(seat)
            .ok_or_else(|| SimulationError::ConfigError(format!("no player at seat {}", seat)))?;
        let up_card = self.table.dealer_up_card().ok_or_else(|| {
            SimulationError::ConfigError("the dealer has not been dealt".to_string())
        })?;
        let state = TableState::new(player, up_card).ok_or_else(|| {
            SimulationError::ConfigError(format!("seat {} has no hand in play", seat))
        })?;
        let options = available_options(player);
        Ok(self.strategy.decide_option(state, &options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyKind;

    fn config(seed: u64, strategy: StrategyKind) -> SimulatorConfig {
        SimulatorConfig::new()
            .players(vec!["Ann".to_string(), "Ben".to_string()])
            .rounds(50)
            .seed(seed)
            .strategy(strategy)
            .build()
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let a = TableSimulator::new(config(7, StrategyKind::Basic))
            .unwrap()
            .run()
            .unwrap();
        let b = TableSimulator::new(config(7, StrategyKind::Basic))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, 7);
    }

    #[test]
    fn balances_match_winnings() {
        for strategy in [
            StrategyKind::Basic,
            StrategyKind::DealerMimic,
            StrategyKind::Stand,
        ] {
            let summary = TableSimulator::new(config(42, strategy))
                .unwrap()
                .run()
                .unwrap();
            assert_eq!(summary.rounds_played, 50);
            let net: i64 = summary
                .seats
                .iter()
                .map(|s| s.final_balance - s.starting_balance)
                .sum();
            assert_eq!(net, summary.winnings);
            assert!(summary.total_hands() >= 100);
        }
    }

    #[test]
    fn standing_never_busts() {
        let summary = TableSimulator::new(config(3, StrategyKind::Stand))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(summary.busts, 0);
        assert_eq!(summary.surrenders, 0);
        assert_eq!(summary.dealer_skips, 0);
    }

    #[test]
    fn broke_table_ends_early() {
        let config = SimulatorConfig::new()
            .starting_balance(0)
            .seed(1)
            .build();
        let summary = TableSimulator::new(config).unwrap().run().unwrap();
        assert!(summary.ended_early);
        assert_eq!(summary.rounds_played, 0);
        assert_eq!(summary.seats[0].final_balance, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulatorConfig::new().wager(0).build();
        assert!(matches!(
            TableSimulator::new(config),
            Err(SimulationError::ConfigError(_))
        ));
    }

    #[test]
    fn summary_display() {
        let summary = TableSimulator::new(config(5, StrategyKind::Basic))
            .unwrap()
            .run()
            .unwrap();
        let text = summary.to_string();
        assert!(text.starts_with("strategy: basic strategy"));
        assert!(text.contains("hands won"));
        assert!(text.contains("Ann"));
    }
}
