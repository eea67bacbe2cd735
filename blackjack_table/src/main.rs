use blackjack_table::prelude::*;
use blackjack_table::write::write_summary;
use clap::Parser;
use log::error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blackjack_table")]
#[command(about = "Plays rounds of blackjack at a single table and prints a summary")]
struct Args {
    /// JSON config file, flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seat a player, may be repeated
    #[arg(short, long = "player")]
    players: Vec<String>,

    /// Number of rounds to play
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Starting balance of every player
    #[arg(short, long)]
    balance: Option<i64>,

    /// Amount every player bets each round
    #[arg(short, long)]
    wager: Option<u32>,

    /// Number of decks in the shoe
    #[arg(long)]
    decks: Option<usize>,

    /// Seed for the shoe (for reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Dealer draws on a soft 17
    #[arg(long)]
    hit_soft_17: bool,

    /// Do not offer surrender
    #[arg(long)]
    no_surrender: bool,

    /// Allow doubling on split hands
    #[arg(long)]
    double_after_split: bool,

    /// Log every settled round
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn run(args: Args) -> Result<(), SimulationError> {
    let file = match args.config.as_ref() {
        Some(path) => FileConfig::from_path(path)?,
        None => FileConfig::default(),
    };

    let mut rules = file.rules.unwrap_or_default();
    if let Some(decks) = args.decks {
        rules.deck_count = decks;
    }
    if args.hit_soft_17 {
        rules.dealer_hits_soft_17 = true;
    }
    if args.no_surrender {
        rules.allow_surrender = false;
    }
    if args.double_after_split {
        rules.double_after_split = true;
    }

    let mut builder = SimulatorConfigBuilder::from(file);
    builder.rules(rules);
    if !args.players.is_empty() {
        builder.players(args.players);
    }
    if let Some(rounds) = args.rounds {
        builder.rounds(rounds);
    }
    if let Some(balance) = args.balance {
        builder.starting_balance(balance);
    }
    if let Some(wager) = args.wager {
        builder.wager(wager);
    }
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }
    if let Some(strategy) = args.strategy {
        builder.strategy(strategy);
    }
    if args.verbose {
        builder.silent(false);
    }

    let mut simulator = TableSimulator::new(builder.build())?;
    let summary = simulator.run()?;
    write_summary(&summary, args.format, std::io::stdout().lock())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
