use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use othello_board::Player;
use othello_engine::{
    play_game, Ai, BookTrie, EngineConfig, EngineResult, Evaluator, OpeningBook, Weights,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "selfplay", about = "Play the engine against itself")]
struct Args {
    /// YAML engine configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with per-stage weight files w0.txt .. w14.txt
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Opening book text file
    #[arg(long)]
    book: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Midgame search height
    #[arg(long)]
    mid_height: Option<u32>,

    /// Log every move and search
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn engine_config(&self) -> EngineResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(dir) = &self.weights {
            config.weights_dir = Some(dir.clone());
        }
        if let Some(path) = &self.book {
            config.book_path = Some(path.clone());
        }
        if let Some(height) = self.mid_height {
            config.mid_height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = args.engine_config()?;
    let weights = match &config.weights_dir {
        Some(dir) => Weights::load_dir(dir)?,
        None => Weights::zeroed(),
    };
    let evaluator = Evaluator::new(Arc::new(weights));
    let trie = match &config.book_path {
        Some(path) => Some(Arc::new(BookTrie::load(path)?)),
        None => None,
    };
    let new_book = || trie.as_ref().map(|trie| OpeningBook::new(Arc::clone(trie)));

    let (mut black_wins, mut white_wins, mut draws) = (0u32, 0u32, 0u32);
    for index in 0..args.games {
        let start = Instant::now();
        let mut black = Ai::new(Player::Black, config.clone(), evaluator.clone(), new_book());
        let mut white = Ai::new(Player::White, config.clone(), evaluator.clone(), new_book());
        let record = play_game(&mut black, &mut white)?;

        match record.winner() {
            Some(Player::Black) => black_wins += 1,
            Some(Player::White) => white_wins += 1,
            None => draws += 1,
        }
        info!(
            game = index + 1,
            black = record.black,
            white = record.white,
            passes = record.passes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            moves = %record.transcript(),
            "game finished"
        );
    }

    info!(
        games = args.games,
        black_wins, white_wins, draws, "self-play finished"
    );
    Ok(())
}
