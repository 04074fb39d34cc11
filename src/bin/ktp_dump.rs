// Prints the key/text pairs of one campaign, one line per trace:
//   <index> <group> <key hex> <text hex>
//
//   cargo run --bin ktp_dump -- --kind tvla_ttest_base3 --traces 10 --seed 1
//   cargo run --bin ktp_dump -- --config campaign.json --key-len 32

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};

use ktp::ktp_config::EntropyConfig;
use ktp::ktp_schedule::Group;
use ktp::ktp_target::fixed_key_len;
use ktp::ktp_validate::to_trits;
use ktp::{build_pattern, ConfigError, KeyTextPair, PatternConfig, PatternKind, ValidationError};

/// Generate key/plaintext pairs for a side-channel acquisition campaign
#[derive(Parser, Debug)]
#[command(name = "ktp_dump")]
#[command(version)]
struct Args {
    /// JSON pattern configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pattern: basic, dpa, tvla_ttest, tvla_ttest_base3 (overrides config)
    #[arg(short, long)]
    kind: Option<PatternKind>,

    /// Number of traces to plan and print
    #[arg(short = 'n', long, default_value = "16")]
    traces: usize,

    /// Print this many pairs past the planned budget
    #[arg(long, default_value = "0")]
    extra: usize,

    /// Target key length in bytes
    #[arg(long)]
    key_len: Option<usize>,

    /// ChaCha20 seed for a reproducible campaign (overrides config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Also print plaintexts as ternary digits (tvla_ttest_base3 only)
    #[arg(long)]
    trits: bool,

    /// Log at DEBUG level
    #[arg(short, long)]
    verbose: bool,
}

/// One output line. The trits are computed before anything is written, so a
/// rejected plaintext never leaves a partial line behind.
fn render_pair(
    index: usize,
    group: Option<Group>,
    pair: &KeyTextPair,
    trits: bool,
) -> Result<String, ValidationError> {
    let group = match group {
        Some(g) => format!("{:?}", g).to_lowercase(),
        None => "-".to_string(),
    };
    let mut line = format!("{:>6} {:<6} {} {}", index, group, pair.key_hex(), pair.text_hex());
    if trits {
        let digits: String = to_trits(&pair.text)?.iter().map(|t| char::from(b'0' + t)).collect();
        line.push(' ');
        line.push_str(&digits);
    }
    Ok(line)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let mut cfg: PatternConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PatternConfig::default(),
    };
    if let Some(kind) = args.kind {
        cfg.kind = kind;
    }
    if let Some(seed) = args.seed {
        cfg.entropy = EntropyConfig::Seed(seed);
    }

    if args.trits && cfg.kind != PatternKind::TvlaTTestBase3 {
        let pattern = cfg.kind.as_str();
        return Err(ConfigError::UnusedOverride { pattern, field: "trits" }.into());
    }

    let mut pattern = build_pattern(&cfg)?;
    if let Some(len) = args.key_len {
        pattern.bind_target(fixed_key_len(len));
    }
    pattern.init(args.traces)?;
    info!(kind = %cfg.kind, traces = args.traces, key_len = pattern.key_len(), "campaign");

    for i in 0..args.traces + args.extra {
        let pair = pattern.next_pair()?;
        println!("{}", render_pair(i, pattern.last_group(), &pair, args.trits)?);
    }

    Ok(())
}
