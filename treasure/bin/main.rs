use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, ArgAction, Command};
use treasure::{
    config::Scenario, Algorithm, ArtifactSink, FileArtifacts, GridMaze, Knapsack,
    KnapsackResult, NoArtifacts, PathCollector, Point,
};

fn cli() -> Command {
    Command::new("treasure-maze")
        .about("Picks treasures in a maze with a knapsack solver and a greedy path collector")
        .arg(
            arg!(<SCENARIO> "Path to a scenario json file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--algorithm [ALGORITHM] "Knapsack algorithm, recursive or dynamic")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            arg!(--capacity [CAPACITY] "Overrides the capacity from the scenario")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--artifacts [BASE] "Base name for the trace (.txt) and table (.csv) artifacts")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(arg!(--"no-artifacts" "Do not write any artifacts").action(ArgAction::SetTrue))
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let matches = cli().get_matches();

    let path = matches
        .get_one::<PathBuf>("SCENARIO")
        .context("scenario path is required")?;
    let scenario = Scenario::load(path)?;

    let algorithm = match matches.get_one::<String>("algorithm") {
        Some(name) => name.parse::<Algorithm>()?,
        None => scenario.algorithm()?,
    };
    let capacity = matches
        .get_one::<usize>("capacity")
        .copied()
        .unwrap_or(scenario.capacity);
    let artifacts = if matches.get_flag("no-artifacts") {
        None
    } else {
        matches
            .get_one::<PathBuf>("artifacts")
            .cloned()
            .or_else(|| scenario.artifacts_base())
    };

    let maze = scenario.build_maze()?;
    println!("{}", maze);

    let mut knapsack = Knapsack::new(capacity, algorithm);
    let result = match artifacts {
        Some(base) => run_knapsack(&mut knapsack, &maze, &mut FileArtifacts::new(base))?,
        None => run_knapsack(&mut knapsack, &maze, &mut NoArtifacts)?,
    };
    println!(
        "knapsack ({}): value {}, weight {}/{}",
        algorithm, result.value, result.weight, capacity
    );
    println!("  cells: {}", join(&result.cells));

    let mut collector = PathCollector::new(knapsack);
    collector.solve_maze(&maze, scenario.entrance, scenario.exit)?;

    let collected = collector.knapsack();
    println!(
        "greedy collection: value {}, weight {}/{}",
        collected.optimal_value, collected.optimal_weight, capacity
    );
    println!("  cells: {}", join(&collected.optimal_cells));
    println!("path: {}", join(collector.solver_path()));
    println!("cells explored: {}", collector.cells_explored());
    if let Some(reward) = collector.reward() {
        println!("reward: {}", reward);
    }

    Ok(())
}

fn run_knapsack(
    knapsack: &mut Knapsack<Point>,
    maze: &GridMaze,
    sink: &mut impl ArtifactSink,
) -> Result<KnapsackResult<Point>, anyhow::Error> {
    Ok(knapsack.solve(maze, sink)?)
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
