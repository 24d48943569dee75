use blackjack_edge::{self, Simulation, Summary};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read config file {path}: {source}")]
    ReadConfig { path: String, source: io::Error },
    #[error("cannot parse config file: {0}")]
    ParseConfig(#[from] serde_yaml::Error),
    #[error("invalid rule in config: {0}")]
    Rule(#[from] serde::de::value::Error),
    #[error(transparent)]
    Simulation(#[from] blackjack_edge::Error),
    #[error("cannot write results to {path}: {source}")]
    WriteResults { path: String, source: io::Error },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub edge_simulator: ConfigEdgeSimulator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub dealer_hit_on_soft17: bool,
    pub max_split_hands: u8,
    pub allow_resplit_aces: bool,
    pub allow_das: bool,
    pub allow_late_surrender: bool,
    pub strategy_complexity: String,
    pub counting_system: String,

    pub payout_blackjack: f64,
}

impl Default for ConfigRule {
    fn default() -> Self {
        ConfigRule {
            number_of_decks: 2,
            dealer_hit_on_soft17: false,
            max_split_hands: 4,
            allow_resplit_aces: false,
            allow_das: true,
            allow_late_surrender: true,
            strategy_complexity: String::from("Advanced"),
            counting_system: String::from("HiLo"),
            payout_blackjack: 0.5,
        }
    }
}

impl TryFrom<ConfigRule> for blackjack_edge::Rule {
    type Error = DriverError;

    fn try_from(config_rule: ConfigRule) -> Result<Self, Self::Error> {
        let blackjack_rule = blackjack_edge::Rule {
            number_of_decks: config_rule.number_of_decks,
            dealer_hit_on_soft17: config_rule.dealer_hit_on_soft17,
            max_split_hands: config_rule.max_split_hands,
            allow_resplit_aces: config_rule.allow_resplit_aces,
            allow_das: config_rule.allow_das,
            allow_late_surrender: config_rule.allow_late_surrender,
            strategy_complexity: config_rule.strategy_complexity.parse()?,
            counting_system: config_rule.counting_system.parse()?,
            payout_blackjack: config_rule.payout_blackjack,
        };
        blackjack_rule.validate()?;

        Ok(blackjack_rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEdgeSimulator {
    pub number_of_threads: usize,
    pub number_of_trials: usize,
    pub hands_per_trial: usize,
    pub base_bet: f64,
    pub seed: Option<u64>,
    /// Default `env_logger` filter, `RUST_LOG` still wins.
    pub log_level: String,
}

impl Default for ConfigEdgeSimulator {
    fn default() -> Self {
        ConfigEdgeSimulator {
            number_of_threads: 0,
            number_of_trials: 10000,
            hands_per_trial: 1000,
            base_bet: 100.0,
            seed: None,
            log_level: String::from("info"),
        }
    }
}

impl TryFrom<Config> for Simulation {
    type Error = DriverError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let simulator = config.edge_simulator;
        let simulation = Simulation {
            rule: config.rule.try_into()?,
            number_of_trials: simulator.number_of_trials,
            hands_per_trial: simulator.hands_per_trial,
            base_bet: simulator.base_bet,
            number_of_threads: simulator.number_of_threads,
            seed: simulator.seed,
        };
        simulation.validate()?;

        Ok(simulation)
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &Path) -> Result<Config, DriverError> {
    let file_content = fs::read_to_string(filename).map_err(|source| DriverError::ReadConfig {
        path: filename.display().to_string(),
        source,
    })?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> Result<Config, DriverError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Appends the run summary to `filename`: the average, the standard deviation,
/// then every trial result in trial order, one per line.
pub fn append_results(filename: &Path, summary: &Summary) -> Result<(), DriverError> {
    let to_error = |source: io::Error| DriverError::WriteResults {
        path: filename.display().to_string(),
        source,
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)
        .map_err(to_error)?;
    let mut writer = LineWriter::new(file);

    writeln!(writer, "Average:{}%", summary.average).map_err(to_error)?;
    writeln!(writer, "StdDev:{}%", summary.std_dev).map_err(to_error)?;
    for trial_result in &summary.trial_results {
        writeln!(writer, "{}%", trial_result).map_err(to_error)?;
    }
    writer.flush().map_err(to_error)
}
