use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use hex_treasure::grid::{Grid, Pos};
use hex_treasure::maps::{self, MapError};
use hex_treasure::pathfinding::{Path, Targets};
use hex_treasure::route::{self, Route};
use hex_treasure::solvers::{
    AutoSolver, HeldKarpSolver, NearestNeighborSolver, PermutationSolver, Solver,
};

#[derive(ValueEnum, Clone)]
enum SolverName {
    /// Permutations up to 10 treasures, Held-Karp up to 16, then greedy.
    Auto,
    /// Exact, tries every visiting order. Up to 10 treasures.
    Permutations,
    /// Exact, dynamic programming over subsets. Up to 16 treasures.
    HeldKarp,
    /// Greedy nearest-neighbor, fast but not exact.
    NearestNeighbor,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Map file to load (.json, or whitespace-separated text). Uses the
    /// built-in map when neither this nor --random-seed is given.
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Generate a random map with this seed instead of loading one.
    #[arg(long, conflicts_with = "map")]
    random_seed: Option<u64>,

    /// Random map rows.
    #[arg(long, default_value_t = 7)]
    rows: usize,

    /// Random map columns.
    #[arg(long, default_value_t = 10)]
    cols: usize,

    /// Random map treasure count.
    #[arg(long, default_value_t = 5)]
    treasures: usize,

    /// Solver implementation used to order the treasures.
    #[arg(short, long, value_enum, default_value_t = SolverName::Auto)]
    solver: SolverName,

    /// Start cell as ROW,COL. Defaults to the map's start tile.
    #[arg(long)]
    from: Option<Cell>,

    /// Only find the cheapest path to this ROW,COL cell.
    #[arg(long)]
    goal: Option<Cell>,

    /// Come back to the start after the last treasure.
    #[arg(long)]
    return_to_start: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy)]
struct Cell(Pos);

impl FromStr for Cell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s.split_once(',')
            .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
        let parse = |v: &str| v.trim().parse::<u16>().map_err(|e| format!("{v:?}: {e}"));
        Ok(Cell(Pos::new(parse(row)?, parse(col)?)))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Path(Path),
    Route(Route),
}

fn new_solver(name: &SolverName) -> Box<dyn Solver> {
    match name {
        SolverName::Auto => Box::new(AutoSolver::default()),
        SolverName::Permutations => Box::new(PermutationSolver::default()),
        SolverName::HeldKarp => Box::new(HeldKarpSolver::default()),
        SolverName::NearestNeighbor => Box::new(NearestNeighborSolver::default()),
    }
}

fn load_grid(cli: &Cli) -> Result<Grid, MapError> {
    match (&cli.map, cli.random_seed) {
        (Some(path), _) => {
            info!("Loading map from {}", path.display());
            maps::load(path)
        },
        (None, Some(seed)) => {
            maps::check_size(cli.rows, cli.cols)?;
            info!("Generating a {}x{} map with seed {seed}", cli.rows, cli.cols);
            Ok(maps::random_grid(cli.rows, cli.cols, cli.treasures, seed))
        },
        (None, None) => {
            info!("Using the built-in map.");
            Ok(maps::default_grid())
        },
    }
}

fn print_path(start: Pos, path: &Path) {
    if !path.is_reachable() {
        println!("No route from {start}.");
        return;
    }
    let steps: Vec<String> = path.steps.iter().map(Pos::to_string).collect();
    println!("Start {start}, {} steps, cost {}", steps.len(), path.cost);
    if !steps.is_empty() {
        println!("  {}", steps.join(" -> "));
    }
}

fn run(cli: Cli) -> Result<(), MapError> {
    let grid = load_grid(&cli)?;
    if !cli.json {
        print!("{grid}");
    }
    let start = match cli.from {
        Some(Cell(pos)) => pos,
        None => grid.start().ok_or(MapError::MissingStart)?,
    };

    let output = if let Some(Cell(goal)) = cli.goal {
        Output::Path(route::shortest_path(&grid, start, goal))
    } else {
        let targets = Targets::from_iter(grid.treasures());
        info!("Planning a route through {} treasures from {start}", targets.len());
        let mut solver = new_solver(&cli.solver);
        match route::plan(solver.as_mut(), &grid, start, &targets, cli.return_to_start) {
            Some(route) => Output::Route(route),
            None => {
                warn!("No order reaches every treasure.");
                Output::Path(Path::unreachable())
            },
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &output {
            Output::Path(path) => print_path(start, path),
            Output::Route(route) => {
                let order: Vec<String> = route.order.iter().map(Pos::to_string).collect();
                println!("Visiting order: {}", order.join(", "));
                print_path(start, &route.to_path());
            },
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Load .env file
    dotenvy::dotenv().ok();
    // Init logger with default value of info
    // This can be overriden with RUST_LOG env var
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        error!("Error while planning with underlying error:");
        error!("  {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hex_treasure").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(" 3, 7".parse::<Cell>().unwrap().0, Pos::new(3, 7));
        assert!("3".parse::<Cell>().is_err());
        assert!("3,-1".parse::<Cell>().is_err());
    }

    #[test]
    fn test_random_map_size_is_checked() {
        let cli = parse_cli(&["--random-seed", "1", "--rows", "70000", "--cols", "2"]);
        assert!(matches!(load_grid(&cli), Err(MapError::TooLarge { rows: 70000, cols: 2 })));
        let cli = parse_cli(&["--random-seed", "1", "--rows", "3", "--cols", "4"]);
        let grid = load_grid(&cli).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (3, 4));
    }

    #[test]
    fn test_run_reports_errors() {
        let cli = parse_cli(&["--random-seed", "1", "--cols", "65536", "--json"]);
        assert!(matches!(run(cli), Err(MapError::TooLarge { .. })));
        let cli = parse_cli(&["--json", "--goal", "0,0"]);
        assert!(run(cli).is_ok());
    }

    #[test]
    fn test_unreachable_path_serializes() {
        let json = serde_json::to_string(&Output::Path(Path::unreachable())).unwrap();
        assert_eq!(json, r#"{"steps":[],"cost":null}"#);
    }
}
