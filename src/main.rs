mod cli;
mod logging;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use crate::cli::Cli;
use tentmates::loader::{load_capacities, load_preferences};
use tentmates::{Problem, SearchOutcome};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet)?;
    debug!("Parsed arguments: {:?}", cli);

    let config = cli.search_config().context("Invalid search settings")?;
    let preferences = load_preferences(&cli.prefs)
        .with_context(|| format!("Failed to load preferences from {}", cli.prefs.display()))?;
    let capacities = load_capacities(&cli.tents)
        .with_context(|| format!("Failed to load tents from {}", cli.tents.display()))?;
    let problem = Problem::from_preferences(&preferences, &capacities)?;

    if !config.budget.is_bounded() {
        info!("No restart or time limit set; an unreachable goal will run forever");
    }

    let started = Instant::now();
    let outcome = problem.search(&config)?;
    print_outcome(&problem, &outcome, started.elapsed());
    Ok(())
}

fn print_outcome(problem: &Problem, outcome: &SearchOutcome, elapsed: Duration) {
    let solution = outcome.solution();
    for (tent, members) in problem.tents(&solution.assignment) {
        println!("{}: {}", tent, members.join(", "));
    }
    println!();
    println!("Happiness: {}", solution.value);
    println!("Restarts:  {}", solution.restarts);
    match outcome {
        SearchOutcome::GoalMet(_) => println!("Goal met"),
        SearchOutcome::Exhausted(_) => println!("Goal not met, showing the best assignment found"),
    }
    println!("Elapsed:   {:.3}s", elapsed.as_secs_f64());
}
