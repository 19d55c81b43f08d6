//! Lyra console - interactive terminal player

use clap::Parser;
use lyra_console::{
    config::{ConsoleConfig, Overrides},
    manifest,
    session::{describe, ConsoleCommand, Outcome, Session},
};
use lyra_core::KeyValueStore;
use lyra_playback::PlayMode;
use lyra_storage::{JsonFileStore, MemoryStore};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Lyra terminal player with a simulated audio clock", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./lyra.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Track manifest (JSON array)
    #[arg(short, long, env = "LYRA_MANIFEST")]
    library: Option<PathBuf>,

    /// File holding persisted player state
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Start in this play mode
    #[arg(short, long)]
    mode: Option<PlayMode>,

    /// Fixed shuffle seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Do not read or write player state
    #[arg(long)]
    no_persist: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyra_console=info,lyra_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ConsoleConfig::load(cli.config.as_deref())?.with_overrides(Overrides {
        manifest: cli.library,
        state_file: cli.state,
        play_mode: cli.mode,
        shuffle_seed: cli.seed,
        no_persist: cli.no_persist,
    });
    config.validate()?;

    let library = Arc::new(manifest::load(&config.library.manifest)?);
    let store = open_store(&config);

    let mut session = Session::new(config.playback.clone(), library, store);
    session.restore();
    session.discard_events();

    tracing::info!("Lyra console ready, type 'help' for commands");
    println!("{}", session.status_line());

    run(&mut session, Duration::from_millis(config.tick_ms)).await
}

fn open_store(config: &ConsoleConfig) -> Box<dyn KeyValueStore> {
    if !config.playback.persist {
        return Box::new(MemoryStore::new());
    }

    match JsonFileStore::open(&config.storage.state_file) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(
                path = %config.storage.state_file.display(),
                error = %e,
                "Cannot open state file, preferences will not be saved"
            );
            Box::new(MemoryStore::new())
        }
    }
}

async fn run(session: &mut Session<Box<dyn KeyValueStore>>, tick: Duration) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let outcome = line
                    .parse::<ConsoleCommand>()
                    .and_then(|command| session.execute(command));
                session.discard_events();

                match outcome {
                    Ok(Outcome::Continue(reply)) => println!("{}", reply),
                    Ok(Outcome::Quit) => break,
                    Err(e) => println!("{}", e),
                }
            }
            _ = ticker.tick() => {
                for event in session.tick(tick) {
                    if let Some(text) = describe(&event) {
                        println!("{}", text);
                    }
                }
            }
        }
    }

    tracing::info!("Bye");
    Ok(())
}
