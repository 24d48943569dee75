use std::path::Path;

use blackjack_edge::{BasicStrategy, Simulation, Summary};
use blackjack_edge_drivers::{append_results, DriverError};

/// Runs the simulation with the basic strategy, prints the edge estimate and,
/// if asked, appends the results to `output`.
///
/// The console summary is printed before the file is touched, so it is there
/// even when writing fails.
pub fn simulate_and_report(
    simulation: &Simulation,
    output: Option<&Path>,
) -> Result<Summary, DriverError> {
    let strategy = BasicStrategy::new(&simulation.rule);
    let summary = simulation.run(&strategy)?;

    println!("Average:{}%", summary.average);
    println!("StdDev:{}%", summary.std_dev);

    if let Some(output) = output {
        append_results(output, &summary)?;
        log::info!(
            "appended {} trial results to {}",
            summary.trial_results.len(),
            output.display()
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_simulation() -> Simulation {
        Simulation {
            number_of_trials: 3,
            hands_per_trial: 20,
            number_of_threads: 1,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn returns_summary_without_output() {
        let summary = simulate_and_report(&small_simulation(), None).unwrap();
        assert_eq!(summary.trial_results.len(), 3);
    }

    #[test]
    fn unwritable_output_fails_after_the_run() {
        let simulation = small_simulation();
        assert!(simulation
            .run(&BasicStrategy::new(&simulation.rule))
            .is_ok());

        let output = std::env::temp_dir();
        let result = simulate_and_report(&simulation, Some(output.as_path()));
        assert!(matches!(result, Err(DriverError::WriteResults { .. })));
    }
}
