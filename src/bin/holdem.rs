use clap::Parser;
use holdem_limit::agents::{ArtificialPlayer, HumanAction, HumanInput, HumanPlayer};
use holdem_limit::config::GameConfig;
use holdem_limit::events::{self, TableEvent};
use holdem_limit::player::Agent;
use holdem_limit::session::{Session, StopReason};
use std::error::Error;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Parser)]
#[command(name = "holdem-limit")]
#[command(about = "Heads-up fixed-limit Hold'em table", version)]
struct Cli {
    /// Stop after this many hands (default: until someone is busted)
    #[arg(long)]
    hands: Option<u64>,
    /// Session seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// TOML table configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Play seat 0 yourself: type f (fold), c (check/call) or r (bet/raise) and Enter
    #[arg(long)]
    human: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if let Err(e) = holdem_limit::logging::init_logging() {
        eprintln!("logging disabled: {e}");
    }

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    let (sink, rx) = events::channel();
    let printer = tokio::spawn(print_events(rx));

    let session = if cli.human {
        let (human, input) = HumanPlayer::new(config.human_timeout());
        tokio::spawn(read_stdin(input));
        let bot = ArtificialPlayer::new(seed, config.think_delay()).with_tie_break(config.tie_break);
        let agents: Vec<Box<dyn Agent>> = vec![Box::new(human), Box::new(bot)];
        Session::new(config, agents)
    } else {
        Session::heads_up_bots(config)
    };
    let mut session = session.with_events(sink);

    let summary = session.play(cli.hands).await;
    drop(session);
    printer.await?;

    println!(
        "seed {seed}: {} hands ({} showdowns, {} uncontested, {} aborted), money {:?}",
        summary.hands_played, summary.showdowns, summary.uncontested, summary.aborted, summary.money
    );
    match summary.stop {
        StopReason::Failed(e) => Err(e.into()),
        StopReason::Busted(p) => {
            println!("player {p} is out");
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn print_events(mut rx: UnboundedReceiver<TableEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            TableEvent::Money { stacks, pot } => println!("  money {stacks:?} pot {pot}"),
            TableEvent::Action { player, verb } => println!("  player {player}: {}", verb.label()),
            TableEvent::Community(cards) if cards.is_empty() => println!("-- new hand --"),
            TableEvent::Community(cards) => {
                let shown: Vec<String> = cards.iter().map(ToString::to_string).collect();
                println!("  board {}", shown.join(" "));
            }
            TableEvent::Payout(payouts) => println!("  payout {payouts:?}"),
            _ => {}
        }
    }
}

async fn read_stdin(input: HumanInput) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let action = match line.trim() {
            "f" => HumanAction::Fold,
            "c" => HumanAction::Call,
            "r" => HumanAction::Raise,
            other => {
                eprintln!("unknown input {other:?}: use f, c or r");
                continue;
            }
        };
        if !input.send(action) {
            break;
        }
    }
}
