mod simulation;

use std::path::PathBuf;

use blackjack_edge::Simulation;
use blackjack_edge_drivers::{parse_config_from_file, Config, DriverError};
use clap::Parser;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_edge.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// Append the average, the standard deviation and every trial result to this file
    output: Option<PathBuf>,

    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Seed for every shuffle of the run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worker threads, 0 for all cores
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    trials: Option<usize>,

    #[arg(long)]
    hands: Option<usize>,
}

/// The default config file is optional, an explicitly given one is not.
fn load_config(args: &CommandLineArgs) -> Result<Config, DriverError> {
    if args.config != DEFAULT_CONFIG_PATH {
        return parse_config_from_file(&PathBuf::from(&args.config));
    }
    match home::home_dir().map(|home_dir| home_dir.join(".blackjack_edge.yml")) {
        Some(config_file_path) if config_file_path.is_file() => parse_config_from_file(&config_file_path),
        _ => Ok(Config::default()),
    }
}

fn main() {
    let args = CommandLineArgs::parse();
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.edge_simulator.log_level.as_str()),
    )
    .init();

    let simulator_config = &mut config.edge_simulator;
    if args.seed.is_some() {
        simulator_config.seed = args.seed;
    }
    if let Some(threads) = args.threads {
        simulator_config.number_of_threads = threads;
    }
    if let Some(trials) = args.trials {
        simulator_config.number_of_trials = trials;
    }
    if let Some(hands) = args.hands {
        simulator_config.hands_per_trial = hands;
    }
    log::debug!("{:#?}", config);

    let result = Simulation::try_from(config)
        .and_then(|simulation| simulation::simulate_and_report(&simulation, args.output.as_deref()));
    if let Err(err) = result {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
