//! The rendezvous server binary.
//!
//! Creates (or reuses) the rendezvous FIFO, admits up to `max-games`
//! concurrent sessions, and runs each accepted connection's game to
//! completion on its own detached worker thread.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use pacman_admission::{create_fifo, listen, Registry};

#[derive(Parser)]
#[command(name = "pacman-server", version, about = "Pac-Man rendezvous server")]
struct Cli {
    /// Directory containing the `*.lvl` files to serve, walked in
    /// lexicographic order for every session.
    levels_dir: PathBuf,

    /// Maximum number of concurrently running game sessions.
    max_games: usize,

    /// Path of the rendezvous FIFO new clients connect through.
    rendezvous_path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "server exited with an error");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if !cli.levels_dir.is_dir() {
        anyhow::bail!("levels directory '{}' does not exist", cli.levels_dir.display());
    }
    if cli.max_games == 0 {
        anyhow::bail!("max_games must be at least 1");
    }

    create_fifo(&cli.rendezvous_path)?;
    let registry = Arc::new(Registry::new(cli.max_games));

    tracing::info!(
        levels_dir = %cli.levels_dir.display(),
        max_games = cli.max_games,
        rendezvous_path = %cli.rendezvous_path.display(),
        "server starting"
    );

    listen(&cli.rendezvous_path, &cli.levels_dir, registry)?;
    Ok(())
}
