use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::{
    simulation::{shoe::Shoe, LoggingHandler, Simulator},
    strategy::Strategy,
    Error, Rule,
};

/// Inputs of a whole run: many independent trials of `hands_per_trial` rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub rule: Rule,
    pub number_of_trials: usize,
    pub hands_per_trial: usize,
    pub base_bet: f64,
    /// 0 lets rayon use every available core.
    pub number_of_threads: usize,
    /// Fixes every shuffle of the run. A random seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation {
            rule: Rule::default(),
            number_of_trials: 10000,
            hands_per_trial: 1000,
            base_bet: 100.0,
            number_of_threads: 0,
            seed: None,
        }
    }
}

/// Edge estimate of a run. All values are percentages of the base bet.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub average: f64,
    pub std_dev: f64,
    pub trial_results: Vec<f64>,
}

impl Summary {
    pub fn from_trial_results(trial_results: Vec<f64>) -> Self {
        Summary {
            average: mean(&trial_results),
            std_dev: std_dev(&trial_results),
            trial_results,
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N).
pub fn std_dev(values: &[f64]) -> f64 {
    let avg = mean(values);
    let square_diffs: Vec<f64> = values.iter().map(|v| (v - avg) * (v - avg)).collect();
    mean(&square_diffs).sqrt()
}

impl Simulation {
    pub fn validate(&self) -> Result<(), Error> {
        self.rule.validate()?;
        if self.number_of_trials == 0 {
            return Err(Error::InvalidSimulation(String::from(
                "number_of_trials must be positive",
            )));
        }
        if self.hands_per_trial == 0 {
            return Err(Error::InvalidSimulation(String::from(
                "hands_per_trial must be positive",
            )));
        }
        if !self.base_bet.is_finite() || self.base_bet <= 0.0 {
            return Err(Error::InvalidBet(self.base_bet));
        }
        Ok(())
    }

    /// Runs every trial on a rayon pool. Each trial owns its shoe, seeded from
    /// the run seed and the trial index, so results do not depend on the
    /// number of threads.
    pub fn run<T>(&self, strategy: &T) -> Result<Summary, Error>
    where
        T: Strategy + Clone + Send + Sync,
    {
        self.validate()?;
        let master_seed = self.seed.unwrap_or_else(|| StdRng::from_entropy().gen());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.number_of_threads)
            .build()
            .map_err(|err| Error::ThreadPool(err.to_string()))?;

        log::info!(
            "running {} trials of {} hands on {} threads, seed {}",
            self.number_of_trials,
            self.hands_per_trial,
            pool.current_num_threads(),
            master_seed
        );
        let start = Instant::now();

        let trial_results = pool.install(|| {
            (0..self.number_of_trials)
                .into_par_iter()
                .map(|trial_index| {
                    let mut strategy = strategy.clone();
                    self.run_trial(trial_seed(master_seed, trial_index), &mut strategy)
                })
                .collect::<Result<Vec<f64>, Error>>()
        })?;

        log::info!("simulation finished in {:.2?}", start.elapsed());
        Ok(Summary::from_trial_results(trial_results))
    }

    /// Plays `hands_per_trial` rounds on a fresh shoe and returns the net
    /// result as a percentage of the base bet per round.
    pub fn run_trial<T: Strategy>(&self, seed: u64, strategy: &mut T) -> Result<f64, Error> {
        let shoe = Shoe::with_seed(self.rule.number_of_decks, seed);
        let mut simulator = Simulator::new(&self.rule, shoe);
        let mut handler = LoggingHandler;

        let mut running_total = 0.0;
        for _ in 0..self.hands_per_trial {
            running_total += simulator.play_round(self.base_bet, strategy, &mut handler)?;
        }
        log::trace!("trial seed {} running total {}", seed, running_total);

        Ok(100.0 * running_total / self.hands_per_trial as f64 / self.base_bet)
    }
}

pub fn trial_seed(master_seed: u64, trial_index: usize) -> u64 {
    master_seed ^ (trial_index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{strategy::AlwaysStand, BasicStrategy, CountingSystem};

    fn small_simulation(number_of_threads: usize) -> Simulation {
        Simulation {
            number_of_trials: 24,
            hands_per_trial: 60,
            number_of_threads,
            seed: Some(77),
            ..Default::default()
        }
    }

    #[test]
    fn mean_and_population_std_dev() {
        assert_eq!(mean(&[0.0, 0.0]), 0.0);
        assert_eq!(std_dev(&[0.0, 0.0]), 0.0);
        assert_eq!(mean(&[2.0, -2.0]), 0.0);
        assert_eq!(std_dev(&[2.0, -2.0]), 2.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        assert!((std_dev(&[1.0, 2.0, 3.0, 6.0]) - 3.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summary_keeps_trial_order() {
        let summary = Summary::from_trial_results(vec![2.0, -2.0]);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.std_dev, 2.0);
        assert_eq!(summary.trial_results, vec![2.0, -2.0]);
    }

    #[test]
    fn seeded_runs_repeat_regardless_of_threads() {
        let strategy = BasicStrategy::new(&Rule::default());
        let single = small_simulation(1).run(&strategy).unwrap();
        let many = small_simulation(4).run(&strategy).unwrap();
        assert_eq!(single.trial_results.len(), 24);
        assert_eq!(single, many);

        let mut other_seed = small_simulation(2);
        other_seed.seed = Some(78);
        assert_ne!(other_seed.run(&strategy).unwrap(), single);
    }

    #[test]
    fn trial_result_is_percent_of_base_bet_per_round() {
        let simulation = Simulation {
            rule: Rule {
                counting_system: CountingSystem::NoCount,
                ..Default::default()
            },
            hands_per_trial: 40,
            base_bet: 10.0,
            ..small_simulation(1)
        };
        let seed = trial_seed(5, 0);
        let result = simulation.run_trial(seed, &mut AlwaysStand).unwrap();

        let mut simulator = Simulator::new(
            &simulation.rule,
            Shoe::with_seed(simulation.rule.number_of_decks, seed),
        );
        let mut total = 0.0;
        for _ in 0..40 {
            total += simulator.play_round(10.0, &mut AlwaysStand, &mut ()).unwrap();
        }
        assert_eq!(result, 100.0 * total / 40.0 / 10.0);
    }

    #[test]
    fn strategy_errors_stop_the_run() {
        let simulation = small_simulation(2);
        // Splitting every hand is illegal as soon as a hand is not a pair.
        let strategy = |_: &Rule, _: &crate::DecisionQuery| crate::Decision::Split;
        assert!(matches!(
            simulation.run(&strategy),
            Err(Error::IllegalDecision { .. })
        ));
    }

    #[test]
    fn invalid_simulation_is_rejected() {
        let mut simulation = small_simulation(1);
        simulation.number_of_trials = 0;
        assert!(matches!(
            simulation.run(&AlwaysStand),
            Err(Error::InvalidSimulation(_))
        ));

        let mut simulation = small_simulation(1);
        simulation.base_bet = -1.0;
        assert_eq!(simulation.validate(), Err(Error::InvalidBet(-1.0)));

        let mut simulation = small_simulation(1);
        simulation.rule.number_of_decks = 0;
        assert!(matches!(simulation.validate(), Err(Error::InvalidRule(_))));
    }
}
