//! Evaluate a branch predictor against a text trace.

use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arbor::*;
use arbor::sim::*;
use arbor::stats::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trace file (read from stdin when omitted)
    trace: Option<PathBuf>,

    /// Prediction strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Tage)]
    strategy: Strategy,

    /// Gshare: number of global history bits
    #[arg(long)]
    ghistory: Option<usize>,

    /// Tournament: number of global history bits
    #[arg(long)]
    global_bits: Option<usize>,

    /// Tournament: number of local history table index bits
    #[arg(long)]
    local_index_bits: Option<usize>,

    /// Tournament: width of each local history register
    #[arg(long)]
    local_history_bits: Option<usize>,

    /// TAGE: number of base component index bits
    #[arg(long)]
    tage_base_bits: Option<usize>,

    /// TAGE: number of index bits in each tagged component
    #[arg(long)]
    tage_index_bits: Option<usize>,

    /// TAGE: number of tag bits in each tagged component
    #[arg(long)]
    tage_tag_bits: Option<usize>,

    /// TAGE: number of updates between halving all 'useful' counters
    #[arg(long)]
    tage_aging: Option<usize>,

    /// Print per-branch statistics
    #[arg(short, long)]
    verbose: bool,

    /// Number of low hit-rate branches to print
    #[arg(long, default_value_t = 8)]
    low_rate: usize,
}

/// Apply the command-line overrides to the default configuration of the
/// selected strategy.
fn build_config(args: &Args) -> AnyConfig {
    let mut cfg = args.strategy.default_config();
    match &mut cfg {
        AnyConfig::Static(_) => {},
        AnyConfig::Gshare(c) => {
            if let Some(bits) = args.ghistory { c.history_bits = bits; }
        },
        AnyConfig::Tournament(c) => {
            if let Some(bits) = args.global_bits { c.global_bits = bits; }
            if let Some(bits) = args.local_index_bits {
                c.local_index_bits = bits;
            }
            if let Some(bits) = args.local_history_bits {
                c.local_history_bits = bits;
            }
        },
        AnyConfig::Tage(c) => {
            if let Some(bits) = args.tage_base_bits { c.base.index_bits = bits; }
            for comp in c.comp.iter_mut() {
                if let Some(bits) = args.tage_index_bits { comp.index_bits = bits; }
                if let Some(bits) = args.tage_tag_bits { comp.tag_bits = bits; }
            }
            if let Some(n) = args.tage_aging { c.aging_interval = n; }
        },
    }
    cfg
}

fn print_config(cfg: &AnyConfig) {
    println!("[*] {:?} configuration:", cfg.strategy());
    match cfg {
        AnyConfig::Static(c) => {
            println!("      Always predict {:?}", c.direction);
        },
        AnyConfig::Gshare(c) => {
            println!("      {} entries, {}-bit global history",
                1usize << c.history_bits, c.history_bits);
        },
        AnyConfig::Tournament(c) => {
            println!("      {} global/chooser entries ({}-bit global history)",
                1usize << c.global_bits, c.global_bits);
            println!("      {} local history registers ({} bits each)",
                1usize << c.local_index_bits, c.local_history_bits);
        },
        AnyConfig::Tage(c) => {
            println!("      Entries (in total): {}", c.total_entries());
            println!("        {} entries (base component)",
                1usize << c.base.index_bits);
            for (idx, comp) in c.comp.iter().enumerate() {
                println!("        {} entries (tagged component {}, {}-bit history, {}-bit tag)",
                    1usize << comp.index_bits, idx, comp.history_len,
                    comp.tag_bits
                );
            }
            println!("      Global history register: {} bits", c.history_bits);
        },
    }
    let storage_bits = cfg.storage_bits();
    let storage_kib = storage_bits as f64 / 1024.0 / 8.0;
    println!("      Storage bits: {}b, {:.2}KiB", storage_bits, storage_kib);
}

fn print_report(stats: &BranchStats, args: &Args) {
    println!("[*] Global statistics:");
    println!("      Unique branches: {}", stats.num_unique_branches());
    println!("      Global hit rate: {}/{} ({:.2}% correct) ({} misses)",
        stats.global_hits(), stats.global_brns(),
        stats.hit_rate() * 100.0, stats.global_miss()
    );
    println!("      Average MPKB:    {:.2} miss/kbrn", stats.mpkb());
    if let Some(max) = stats.mpkb_samples.iter().max() {
        println!("      Worst window:    {} miss/kbrn", max);
    }

    if args.verbose {
        println!("[*] Most frequent branches:");
        for (pc, data) in stats.get_common_branches(16) {
            println!("      {:08x} {:8}/{:8} {:.4} {}",
                pc, data.hits, data.occ, data.hit_rate(), data.pattern(32)
            );
        }
    }

    if args.low_rate > 0 {
        println!("[*] Low hit-rate branches:");
        for (pc, data) in stats.get_low_rate_branches(args.low_rate, 100) {
            println!("      {:08x} {:8}/{:8} {:.4}",
                pc, data.hits, data.occ, data.hit_rate()
            );
        }
    }
}

fn print_tage_stats(tage: &TagePredictor) {
    println!("[*] Per-component statistics:");
    println!("      Base component:");
    println!("        {} misses, {} hits",
        tage.stat.base_miss, tage.stat.base_hits
    );
    for comp in tage.components() {
        let id = comp.id;
        println!("      Component[{}] ({}-bit history):",
            id, comp.cfg.history_len
        );
        println!("        {} misses, {} hits, {} useful entries",
            tage.stat.comp_miss[id], tage.stat.comp_hits[id],
            comp.num_useful_entries()
        );
    }
    println!("      {} allocations ({} failed), {} agings",
        tage.stat.alcs, tage.stat.failed_alcs, tage.stat.agings
    );
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let trace = match &args.trace {
        Some(path) => read_trace_file(path)?,
        None => read_trace(BufReader::new(std::io::stdin()))?,
    };
    println!("[*] Loaded {} records", trace.len());

    let cfg = build_config(&args);
    print_config(&cfg);
    let predictor = cfg.build()?;

    let (predictor, stats) = simulate(predictor, &trace);
    print_report(&stats, &args);
    if let Some(tage) = predictor.as_tage() {
        print_tage_stats(tage);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}
