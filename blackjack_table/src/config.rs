use crate::strategy::StrategyKind;
use crate::SimulationError;
use blackjack_lib::TableRules;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Most seats a single table can hold.
pub const MAX_SEATS: usize = 7;

/// Struct for configuring a `TableSimulator`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub players: Vec<String>,
    pub starting_balance: i64,
    pub rounds: u32,
    pub wager: u32,
    pub seed: Option<u64>,
    pub strategy: StrategyKind,
    pub silent: bool,
    pub rules: TableRules,
}

impl SimulatorConfig {
    /// Associated method for returning a new `SimulatorConfigBuilder` object. Allows the user to choose the
    /// parameters of the run such as who is seated, their starting balance, how many rounds are played and the house rules.
    pub fn new() -> SimulatorConfigBuilder {
        SimulatorConfigBuilder::default()
    }

    /// Checks that the configuration describes a table that can actually be played.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.players.is_empty() || self.players.len() > MAX_SEATS {
            return Err(SimulationError::ConfigError(format!(
                "between 1 and {} players must be seated, got {}",
                MAX_SEATS,
                self.players.len()
            )));
        }
        if self.players.iter().any(|name| name.trim().is_empty()) {
            return Err(SimulationError::ConfigError(
                "player names cannot be empty".to_string(),
            ));
        }
        if self.wager == 0 {
            return Err(SimulationError::ConfigError(
                "wager must be a positive amount".to_string(),
            ));
        }
        self.rules.validate()?;
        Ok(())
    }
}

impl Default for SimulatorConfig {
    /// Returns the standard configuration: one player with 500 betting 5 a round for 100 rounds.
    fn default() -> Self {
        SimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `SimulatorConfig`
#[derive(Debug, Clone, Default)]
pub struct SimulatorConfigBuilder {
    players: Option<Vec<String>>,
    starting_balance: Option<i64>,
    rounds: Option<u32>,
    wager: Option<u32>,
    seed: Option<u64>,
    strategy: Option<StrategyKind>,
    silent: Option<bool>,
    rules: Option<TableRules>,
}

impl SimulatorConfigBuilder {
    /// Method for seating players, one per name.
    pub fn players(&mut self, names: Vec<String>) -> &mut Self {
        self.players = Some(names);
        self
    }

    /// Method for changing the starting balance of every player.
    pub fn starting_balance(&mut self, balance: i64) -> &mut Self {
        self.starting_balance = Some(balance);
        self
    }

    /// Method for setting the number of rounds played.
    pub fn rounds(&mut self, n: u32) -> &mut Self {
        self.rounds = Some(n);
        self
    }

    /// Method for setting the amount every player bets each round.
    pub fn wager(&mut self, wager: u32) -> &mut Self {
        self.wager = Some(wager);
        self
    }

    /// Method for seeding the shoe so the run can be reproduced.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn strategy(&mut self, strategy: StrategyKind) -> &mut Self {
        self.strategy = Some(strategy);
        self
    }

    /// Method for setting a boolean flag, if set to false every settled round is logged.
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = Some(silent);
        self
    }

    pub fn rules(&mut self, rules: TableRules) -> &mut Self {
        self.rules = Some(rules);
        self
    }

    /// Method for building a `SimulatorConfig` object from the given `SimulatorConfigBuilder` object.
    pub fn build(&mut self) -> SimulatorConfig {
        SimulatorConfig {
            players: self
                .players
                .take()
                .unwrap_or_else(|| vec!["Player 1".to_string()]),
            starting_balance: self.starting_balance.unwrap_or(500),
            rounds: self.rounds.unwrap_or(100),
            wager: self.wager.unwrap_or(5),
            seed: self.seed,
            strategy: self.strategy.unwrap_or_default(),
            silent: self.silent.unwrap_or(true),
            rules: self.rules.unwrap_or_default(),
        }
    }
}

/// The JSON config file, every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub players: Option<Vec<String>>,
    pub starting_balance: Option<i64>,
    pub rounds: Option<u32>,
    pub wager: Option<u32>,
    pub seed: Option<u64>,
    pub strategy: Option<StrategyKind>,
    pub silent: Option<bool>,
    pub rules: Option<TableRules>,
}

impl FileConfig {
    /// Reads and parses the config file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<FileConfig, SimulationError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json(json: &str) -> Result<FileConfig, SimulationError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<FileConfig> for SimulatorConfigBuilder {
    fn from(file: FileConfig) -> Self {
        SimulatorConfigBuilder {
            players: file.players,
            starting_balance: file.starting_balance,
            rounds: file.rounds,
            wager: file.wager,
            seed: file.seed,
            strategy: file.strategy,
            silent: file.silent,
            rules: file.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.players, vec!["Player 1".to_string()]);
        assert_eq!(config.starting_balance, 500);
        assert_eq!(config.rounds, 100);
        assert_eq!(config.wager, 5);
        assert_eq!(config.seed, None);
        assert_eq!(config.strategy, StrategyKind::Basic);
        assert!(config.silent);
        assert_eq!(config.rules, TableRules::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let file = FileConfig::from_json(
            r#"{ "rounds": 20, "strategy": "dealer-mimic", "rules": { "deck_count": 2 } }"#,
        )
        .unwrap();
        let config = SimulatorConfigBuilder::from(file).build();
        assert_eq!(config.rounds, 20);
        assert_eq!(config.strategy, StrategyKind::DealerMimic);
        assert_eq!(config.rules.deck_count, 2);
        assert_eq!(config.rules.dealer_stands_on, 17);
        assert_eq!(config.wager, 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            FileConfig::from_json(r#"{ "round": 20 }"#),
            Err(SimulationError::JsonError(_))
        ));
    }

    #[test]
    fn builder_overrides_file_values() {
        let file = FileConfig::from_json(r#"{ "wager": 25, "seed": 3 }"#).unwrap();
        let mut builder = SimulatorConfigBuilder::from(file);
        builder.wager(10);
        let config = builder.build();
        assert_eq!(config.wager, 10);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn validation() {
        assert!(SimulatorConfig::new()
            .players(vec![])
            .build()
            .validate()
            .is_err());
        let crowded = (0..8).map(|i| format!("P{}", i)).collect();
        assert!(SimulatorConfig::new()
            .players(crowded)
            .build()
            .validate()
            .is_err());
        assert!(SimulatorConfig::new().wager(0).build().validate().is_err());
        let no_decks = TableRules::new().deck_count(0).build();
        assert!(matches!(
            SimulatorConfig::new().rules(no_decks).build().validate(),
            Err(SimulationError::GameError(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            FileConfig::from_path("/definitely/not/here.json"),
            Err(SimulationError::IoError(_))
        ));
    }
}
