//! Console front-end for the optimal sliding-tile solver.
//!
//! `quince solve` reads one board from standard input as whitespace-
//! separated labels (`0` is the blank) and prints an optimal move
//! sequence. `quince build` constructs a pattern database for a board
//! side and partition and writes it to disk, where `solve` picks it up.

use std::{
    io::Read as _,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use quince_core::Board;
use quince_solver::{
    CancelToken, Heuristic, Manhattan, Partition, PatternDb, PatternGroup, PdbError, SolveOptions,
    solve,
};

#[derive(Debug, Parser)]
#[command(name = "quince", version, about = "Optimal sliding-tile puzzle solver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a board read from standard input.
    Solve {
        /// Pattern database file; defaults to `pattern_db_<side>.qpdb`.
        #[arg(long)]
        pdb: Option<PathBuf>,
        /// Fall back to the Manhattan heuristic when no database exists.
        #[arg(long)]
        manhattan: bool,
        /// Print the board after every move.
        #[arg(long)]
        show_boards: bool,
    },
    /// Build a pattern database and write it to disk.
    Build {
        /// Board side.
        #[arg(long, default_value_t = 4)]
        side: u8,
        /// Partition: `663`, `555`, `78`, or semicolon-separated label
        /// groups such as `1,2,3;4,5,6,7`. Defaults to the side's
        /// standard split.
        #[arg(long)]
        partition: Option<String>,
        /// Output file; defaults to `pattern_db_<side>.qpdb`.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Number of build workers; defaults to one per core.
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    match Cli::parse().command {
        Command::Solve {
            pdb,
            manhattan,
            show_boards,
        } => run_solve(pdb.as_deref(), manhattan, show_boards),
        Command::Build {
            side,
            partition,
            out,
            workers,
        } => run_build(side, partition.as_deref(), out, workers),
    }
}

fn default_db_path(side: u8) -> PathBuf {
    PathBuf::from(format!("pattern_db_{side}.qpdb"))
}

fn run_solve(pdb: Option<&Path>, manhattan: bool, show_boards: bool) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read standard input")?;
    let board: Board = input.parse().context("invalid board")?;

    println!("Initial board:");
    println!("{board:#}");

    let heuristic = load_heuristic(pdb, &board, manhattan)?;

    let token = CancelToken::new();
    {
        let token = token.clone();
        ctrlc::set_handler(move || token.cancel())
            .context("failed to install the interrupt handler")?;
    }
    let options = SolveOptions {
        cancel: Some(token),
    };

    let start = Instant::now();
    let solution = solve(&board, heuristic.as_ref(), &options)?;
    let elapsed = start.elapsed();

    if solution.moves.is_empty() {
        println!("Board is already solved.");
        return Ok(());
    }

    println!(
        "Solved in {} moves ({} nodes, {} passes, {elapsed:.2?}).",
        solution.moves.len(),
        solution.stats.nodes,
        solution.stats.iterations
    );
    let mut current = board;
    for (step, &direction) in solution.moves.iter().enumerate() {
        let target = current
            .blank_pos()
            .step(direction, current.side())
            .expect("solution moves are legal");
        let tile = current.label_at(target);
        println!("Step {}: {direction} (tile {tile})", step + 1);
        current = current.apply(direction);
        if show_boards {
            println!("{current:#}");
        }
    }
    let transcript: String = solution.moves.iter().map(|m| m.symbol()).collect();
    println!("Move sequence: {transcript}");
    Ok(())
}

/// Loads the database for the board's side, or falls back to Manhattan
/// when the caller explicitly allowed it.
fn load_heuristic(
    path: Option<&Path>,
    board: &Board,
    allow_manhattan: bool,
) -> anyhow::Result<Box<dyn Heuristic>> {
    let side = board.side();
    let path = path.map_or_else(|| default_db_path(side), Path::to_path_buf);
    match PatternDb::load(&path) {
        Ok(db) => {
            db.check_board(board)
                .with_context(|| format!("cannot use {}", path.display()))?;
            Ok(Box::new(db))
        }
        Err(PdbError::Missing { .. }) if allow_manhattan => {
            log::warn!(
                "no pattern database at {}; using the Manhattan heuristic",
                path.display()
            );
            Ok(Box::new(Manhattan::new(side)))
        }
        Err(err @ PdbError::Missing { .. }) => Err(err).with_context(|| {
            format!(
                "build a database with `quince build --side {side}`, \
                 or pass --manhattan to solve without one"
            )
        }),
        Err(err) => Err(err).context("failed to load the pattern database"),
    }
}

fn run_build(
    side: u8,
    partition: Option<&str>,
    out: Option<PathBuf>,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    let partition = parse_partition(side, partition)?;
    let out = out.unwrap_or_else(|| default_db_path(side));

    println!(
        "Building pattern database for side {side} ({} groups)...",
        partition.groups().len()
    );
    let start = Instant::now();
    let db = PatternDb::build(partition, workers)?;
    println!(
        "Built {} entries in {:.2?}.",
        db.entry_count(),
        start.elapsed()
    );
    for (index, group) in db.partition().groups().iter().enumerate() {
        println!("Group {index}: {:?}", group.labels());
    }

    db.save(&out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {}.", out.display());
    Ok(())
}

fn parse_partition(side: u8, text: Option<&str>) -> anyhow::Result<Partition> {
    let Some(text) = text else {
        return Partition::default_for(side).with_context(|| {
            format!("no default partition for side {side}; pass --partition explicitly")
        });
    };
    match text {
        "663" | "555" | "78" => {
            if side != 4 {
                bail!("partition {text} is a 15-puzzle split; side {side} needs explicit groups");
            }
            Ok(match text {
                "663" => Partition::standard_663(),
                "555" => Partition::standard_555(),
                _ => Partition::standard_78(),
            })
        }
        custom => {
            let groups = custom
                .split(';')
                .map(|group| {
                    group
                        .split(',')
                        .map(|label| {
                            label.trim().parse::<u8>().with_context(|| {
                                format!("invalid label {label:?} in partition")
                            })
                        })
                        .collect::<anyhow::Result<Vec<u8>>>()
                        .map(PatternGroup::new)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(Partition::new(side, groups)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_partitions() {
        assert_eq!(
            parse_partition(4, Some("555")).unwrap(),
            Partition::standard_555()
        );
        assert_eq!(
            parse_partition(4, Some("78")).unwrap(),
            Partition::standard_78()
        );
        // Named 15-puzzle splits do not apply to other sides.
        assert!(parse_partition(3, Some("555")).is_err());
    }

    #[test]
    fn test_default_partition() {
        assert_eq!(
            parse_partition(4, None).unwrap(),
            Partition::standard_555()
        );
        assert!(parse_partition(5, None).is_err());
    }

    #[test]
    fn test_custom_partition() {
        let partition = parse_partition(3, Some("1,2,3,4;5,6,7,8")).unwrap();
        assert_eq!(partition.groups().len(), 2);
        assert_eq!(partition.groups()[0].labels(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_custom_partition_errors() {
        // Garbage labels are parse errors.
        assert!(parse_partition(3, Some("1,2,x;5,6,7,8")).is_err());
        // Structurally valid text still has to form a real partition.
        assert!(parse_partition(3, Some("1,2,3;5,6,7,8")).is_err());
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }
}
