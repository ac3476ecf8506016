//! Jigsaw Puzzle Solver
//!
//! Generates a random jigsaw puzzle and reassembles it from the shapes of the
//! piece sides alone. Solving can be followed step by step on the console or
//! in an interactive viewer.

mod visualization;

use std::io::BufRead;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jigsaw::error::PuzzleError;
use jigsaw::generator::{Generator, GeneratorConfig};
use jigsaw::grid::{self, Grid};
use jigsaw::pieces::Piece;
use jigsaw::solver::SolverKind;
use jigsaw::Solver;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Generates jigsaw puzzles and solves them by edge geometry.
#[derive(Parser)]
#[command(name = "jigsaw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a generated puzzle on the console.
    Solve {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        /// Draw every piece as a 3x3 block showing its sides.
        #[arg(long)]
        detailed: bool,
        /// Print the grid after every step, pausing this long in between.
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
        /// Print the grid after every step and wait for Enter.
        #[arg(long, conflicts_with = "delay_ms")]
        step: bool,
    },
    /// Solve a generated puzzle in an interactive viewer.
    Display {
        #[command(flatten)]
        puzzle: PuzzleArgs,
    },
    /// Infer the grid size from piece counts.
    Dimensions {
        /// Number of pieces with at least one flat side.
        perimeter: usize,
        /// Total number of pieces.
        area: usize,
    },
}

/// The puzzle to generate and how to solve it.
#[derive(Args, Debug, Clone, PartialEq)]
struct PuzzleArgs {
    #[arg(long, default_value_t = 16)]
    width: usize,
    #[arg(long, default_value_t = 16)]
    height: usize,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Turn pieces randomly and solve with the rotation solver.
    #[arg(long)]
    rotate: bool,
}

impl Default for PuzzleArgs {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            seed: 1,
            rotate: false,
        }
    }
}

impl PuzzleArgs {
    fn pieces(&self) -> Result<Vec<Piece>, PuzzleError> {
        let config = if self.rotate {
            GeneratorConfig::rotated()
        } else {
            GeneratorConfig::default()
        };
        Generator::new(self.seed, config).generate(self.width, self.height)
    }

    fn solver_kind(&self) -> SolverKind {
        if self.rotate {
            SolverKind::Rotation
        } else {
            SolverKind::Simple
        }
    }

    /// A solver initialized with a freshly generated puzzle.
    fn solver(&self) -> Result<Box<dyn Solver>, PuzzleError> {
        let mut solver = self.solver_kind().build();
        solver.init(self.pieces()?)?;
        Ok(solver)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(Command::Solve {
            puzzle,
            detailed,
            delay_ms,
            step,
        }) => run_solve(&puzzle, detailed, delay_ms, step),
        Some(Command::Display { puzzle }) => run_display(&puzzle),
        Some(Command::Dimensions { perimeter, area }) => run_dimensions(perimeter, area),
        None => {
            // default: show the default puzzle in the viewer
            run_display(&PuzzleArgs::default())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so rendered puzzles on stdout stay clean.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(grid: &Grid, detailed: bool) -> String {
    if detailed {
        grid::format_solution_detailed(grid)
    } else {
        grid::format_solution(grid)
    }
}

/// Solves the puzzle, printing the grid after each step when asked to.
fn run_solve(
    puzzle: &PuzzleArgs,
    detailed: bool,
    delay_ms: Option<u64>,
    step: bool,
) -> CliResult {
    let mut solver = puzzle.solver()?;
    let stepping = step || delay_ms.is_some();
    let mut stdin = std::io::stdin().lock();

    loop {
        let done = match solver.next_step() {
            Ok(done) => done,
            Err(e) => {
                println!("{}", render(solver.solution(), detailed));
                return Err(e.into());
            }
        };
        if done {
            break;
        }

        if stepping {
            println!("{}\n", render(solver.solution(), detailed));
            match delay_ms {
                Some(ms) => std::thread::sleep(Duration::from_millis(ms)),
                None => {
                    let mut line = String::new();
                    stdin.read_line(&mut line)?;
                }
            }
        }
    }

    println!("{}", render(solver.solution(), detailed));
    Ok(())
}

/// Generates the puzzle and hands it to the viewer.
fn run_display(puzzle: &PuzzleArgs) -> CliResult {
    println!("Controls: Right step, Up run/pause, Down pause, R restart");
    visualization::display(puzzle.pieces()?, puzzle.solver_kind())?;
    Ok(())
}

/// Prints the grid size matching the piece counts.
fn run_dimensions(perimeter: usize, area: usize) -> CliResult {
    let (width, height) = grid::infer_dimensions(perimeter, area)?;
    println!("{}x{}", width, height);
    Ok(())
}
