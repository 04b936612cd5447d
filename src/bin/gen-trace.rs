//! Emit a synthetic text trace.

use std::io::{ BufWriter, Write };

use clap::Parser;

use arbor::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the random number generator
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of conditional branches to emit
    #[arg(short, long, default_value_t = 100_000)]
    num: usize,

    /// Probability of an unconditional branch before each conditional one
    #[arg(long, default_value_t = 0.1)]
    unconditional_rate: f64,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let mut trace = SyntheticTrace::new(args.seed)
        .branch(Behavior::Biased { taken: 0.9 })
        .branch(Behavior::Loop { trip_count: 8 })
        .branch(Behavior::Alternating)
        .branch(Behavior::Pattern(vec![Outcome::T, Outcome::T, Outcome::N]))
        .branch(Behavior::Correlated { source: 2 })
        .branch(Behavior::Biased { taken: 0.5 })
        .unconditional_rate(args.unconditional_rate);

    let stdout = std::io::stdout();
    let mut w = BufWriter::new(stdout.lock());
    writeln!(w, "# pc target outcome conditional call return direct")?;
    for record in trace.generate(args.num) {
        write_record(&mut w, &record)?;
    }
    w.flush()
}
