#![deny(unused_variables)]
#![deny(unused_imports)]

//! Command-line runner for the maze planners.
//!
//! Usage:
//!   maze-planner --file mazes/hazard_column.txt --method replan
//!   maze-planner --file mazes/hazard_column.txt --method value-iteration --trials 10000

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rust_stochastic_maze::config::PlannerConfig;
use rust_stochastic_maze::executor::{Executor, Strategy, TrialOutcome};
use rust_stochastic_maze::grid_world::{GridWorld, State};
use rust_stochastic_maze::render;
use rust_stochastic_maze::shortest_path::ShortestPathPlanner;
use rust_stochastic_maze::statistics::TrialBatch;
use rust_stochastic_maze::value_iteration::ValueIterationSolver;
use rust_stochastic_maze::{MazeError, Result};

/// Planning strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    /// FF-Replan over hazard-weighted shortest paths
    #[value(alias = "ff")]
    Replan,
    /// Greedy policy from value iteration
    #[value(alias = "vi")]
    ValueIteration,
}

/// Runs FF-Replan or value iteration on a stochastic maze
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maze file: "<rows> <cols>" header followed by the grid rows
    #[arg(short, long)]
    file: PathBuf,

    /// Planning strategy
    #[arg(short, long, value_enum)]
    method: Method,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of trials (overrides the configuration)
    #[arg(short, long)]
    trials: Option<usize>,

    /// Base random seed (overrides the configuration)
    #[arg(long)]
    seed: Option<u64>,

    /// Start cell as ROW,COL (defaults to the grid's S cell)
    #[arg(long, value_parser = parse_state)]
    start: Option<State>,

    /// Print the value iteration policy
    #[arg(long)]
    show_policy: bool,
}

fn parse_state(text: &str) -> std::result::Result<State, String> {
    let (row, col) = text
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {:?}", text))?;
    let row = row.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let col = col.trim().parse::<usize>().map_err(|e| e.to_string())?;
    return Ok(State::new(row, col));
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            PlannerConfig::load(path)?
        }
        None => PlannerConfig::default(),
    };
    if let Some(trials) = args.trials {
        config.trials.count = trials;
    }
    if let Some(seed) = args.seed {
        config.trials.seed = seed;
    }

    let grid = GridWorld::load(&args.file)?;
    let start = args
        .start
        .or_else(|| config.start_state())
        .or_else(|| grid.start())
        .ok_or(MazeError::MissingStart)?;

    println!("=== Stochastic Maze ===");
    println!("Grid: {} rows x {} columns", grid.rows, grid.cols);
    println!("Start: {}", start);
    println!("Method: {:?}", args.method);

    let executor = Executor::new(&grid, config.trials.max_steps);

    match args.method {
        Method::Replan => {
            let strategy = Strategy::Replan(ShortestPathPlanner::new(&grid));
            report(&grid, &executor, &strategy, &start, &config)?;
        }
        Method::ValueIteration => {
            let mut solver = ValueIterationSolver::new(&grid);
            let solve = solver.solve(
                config.solver.discount,
                config.solver.epsilon,
                config.solver.max_iterations,
            )?;
            if let Err(e) = solve.ensure_converged() {
                warn!("{}", e);
                println!("Warning: {}", e);
            }
            println!(
                "Value iteration: {} sweeps, final delta {:e}",
                solve.iterations, solve.delta
            );
            println!("Value at start: {:.4}", solver.value(&start));

            if args.show_policy {
                println!("\n=== Policy ===");
                print!("{}", render::render_policy(&grid, solver.policy()));
            }

            let strategy = Strategy::Policy(solver.policy());
            report(&grid, &executor, &strategy, &start, &config)?;
        }
    }

    return Ok(());
}

/// Runs one trial with its path, or a batch with summary statistics.
fn report(
    grid: &GridWorld,
    executor: &Executor<'_>,
    strategy: &Strategy<'_>,
    start: &State,
    config: &PlannerConfig,
) -> Result<()> {
    if config.trials.count <= 1 {
        let mut rng = StdRng::seed_from_u64(config.trials.seed);
        let outcome = executor.run_trial(strategy, start, &mut rng)?;
        print_trial(grid, &outcome);
    } else {
        let batch = executor.run_trials(strategy, start, config.trials.count, config.trials.seed);
        print_batch(&batch);
    }
    return Ok(());
}

fn print_trial(grid: &GridWorld, outcome: &TrialOutcome) {
    println!("\n=== Trial ===");
    println!("Reward: {}", outcome.reward);
    println!("Steps: {} (replans: {})", outcome.steps, outcome.replans);
    println!("---------------------------------");
    print!("{}", render::render_path(grid, &outcome.path));
    println!("---------------------------------");
}

fn print_batch(batch: &TrialBatch) {
    println!("\n=== Trials ===");
    match batch.statistics() {
        Some(stats) => {
            println!("Successful trials: {} of {}", stats.trials, batch.total());
            println!("Mean reward: {:.4} (std dev {:.4})", stats.mean, stats.std_dev);
            println!(
                "Min / median / max: {} / {} / {}",
                stats.min, stats.median, stats.max
            );
            println!("Mean steps: {:.2}", stats.mean_steps);
        }
        None => println!("No trial reached a goal"),
    }

    for (i, e) in &batch.failures {
        println!("Trial {} failed: {}", i, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("1,2").unwrap(), State::new(1, 2));
        assert_eq!(parse_state(" 3 , 4 ").unwrap(), State::new(3, 4));
        assert!(parse_state("1").is_err());
        assert!(parse_state("-1,2").is_err());
    }

    #[test]
    fn test_args_accept_method_aliases() {
        let args = Args::try_parse_from(["maze-planner", "-f", "maze.txt", "-m", "vi"]).unwrap();
        assert_eq!(args.method, Method::ValueIteration);

        let args = Args::try_parse_from([
            "maze-planner",
            "--file",
            "maze.txt",
            "--method",
            "replan",
            "--start",
            "1,1",
            "--trials",
            "100",
        ])
        .unwrap();
        assert_eq!(args.method, Method::Replan);
        assert_eq!(args.start, Some(State::new(1, 1)));
        assert_eq!(args.trials, Some(100));
    }
}
