use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use enhanced_snake::game::{GameConfig, GameEngine, Variant};
use enhanced_snake::modes::HumanMode;
use enhanced_snake::storage::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "enhanced_snake")]
#[command(version, about = "Snake with levels, obstacles and a persistent high score")]
struct Cli {
    /// Rule set to play
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Grid width; the grid follows the terminal size unless width and height are given
    #[arg(long, requires = "height")]
    width: Option<usize>,

    /// Grid height
    #[arg(long, requires = "width")]
    height: Option<usize>,

    /// JSON file with game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to keep the high score (defaults to the platform data directory)
    #[arg(long, conflicts_with = "no_save")]
    high_score_file: Option<PathBuf>,

    /// Keep the high score in memory only
    #[arg(long)]
    no_save: bool,

    /// Seed for food and obstacle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Log file
    #[arg(long, default_value = "enhanced_snake.log")]
    log_file: PathBuf,

    /// Log debug messages too
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    /// Fixed speed and no levels
    Basic,
    /// Levels, obstacles and increasing speed
    Enhanced,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Basic => Variant::Basic,
            VariantArg::Enhanced => Variant::Enhanced,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the game, so logs go to a file.
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
    WriteLogger::init(level, Config::default(), log_file)
        .context("Failed to initialize logger")?;

    info!("Starting Enhanced Snake");

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config.variant = variant.into();
    }
    let fit_to_terminal = match (cli.width, cli.height) {
        (Some(width), Some(height)) => {
            config.grid_width = width;
            config.grid_height = height;
            false
        }
        _ => true,
    };
    config.validate()?;

    let store: Box<dyn HighScoreStore> = if cli.no_save {
        Box::new(MemoryHighScoreStore::default())
    } else {
        match cli.high_score_file {
            Some(path) => Box::new(FileHighScoreStore::new(path)),
            None => Box::new(FileHighScoreStore::in_data_dir()?),
        }
    };

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    };

    info!(
        "variant {:?}, grid {}x{}{}",
        engine.config().variant,
        engine.config().grid_width,
        engine.config().grid_height,
        if fit_to_terminal { " (fit to terminal)" } else { "" }
    );

    let mut human_mode = HumanMode::new(engine, store, fit_to_terminal);
    human_mode.run().await?;

    info!("Exiting");
    Ok(())
}
