use clap::Parser;
use polypack::parse;
use polypack::solver;
use polypack::types::Verdict;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "polypack",
    about = "Counts rectangular regions that can be packed with their required shapes"
)]
struct Cli {
    /// Input file with shape and region definitions
    input: PathBuf,

    /// Search node budget per region (default: unbounded)
    #[arg(long)]
    max_nodes: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error: cannot read {}: {}", cli.input.display(), e);
        std::process::exit(1);
    });

    let (catalog, regions) = parse::parse_input(&text).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut solvable = 0usize;
    let mut unknown = 0usize;
    for region in &regions {
        match solver::evaluate_region_bounded(region, &catalog, cli.max_nodes) {
            Verdict::Solvable => solvable += 1,
            Verdict::Unsolvable => {}
            Verdict::Unknown => unknown += 1,
        }
    }

    if unknown > 0 {
        eprintln!(
            "Warning: {} region{} hit the node budget and {} not counted",
            unknown,
            if unknown == 1 { "" } else { "s" },
            if unknown == 1 { "was" } else { "were" },
        );
    }

    println!("{}", solvable);
}
