mod app;
mod input;

pub use app::{App, Launch};

use anyhow::{Context, Result, bail};
use chromaspan_session::{ConfigFile, GameKind, ReadingMode};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fonts tried, in order, when `--font` is not given.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Parser, Debug)]
#[command(
    name = "chromaspan",
    version,
    about = "Letter-colour training games and coloured reading"
)]
struct Cli {
    /// TrueType/OpenType font used for all text
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// JSON file of per-game timing overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a game directly, skipping the menu
    Play {
        /// Game slug, see `list`
        game: GameKind,
    },
    /// Show a text file with palette letters coloured
    Read {
        mode: ReadingKind,
        /// Session number; easy uses 1-13, advanced 14-26
        #[arg(long, default_value_t = 1)]
        session: i64,
        file: PathBuf,
    },
    /// Print the available games and their timings
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ReadingKind {
    Easy,
    Advanced,
    Homework,
}

impl ReadingKind {
    fn mode(self, session: i64) -> ReadingMode {
        match self {
            ReadingKind::Easy => ReadingMode::easy(session),
            ReadingKind::Advanced => ReadingMode::advanced(session),
            ReadingKind::Homework => ReadingMode::Homework,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };

    let launch = match cli.command {
        Some(Commands::List) => {
            list_games(&config);
            return Ok(());
        }
        Some(Commands::Play { game }) => Launch::Game(game),
        Some(Commands::Read {
            mode,
            session,
            file,
        }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            Launch::Reading {
                mode: mode.mode(session),
                text,
            }
        }
        None => Launch::Menu,
    };

    let font = load_font(cli.font.as_deref())?;
    let app = App::new(config, font, launch)?;
    app.run()?;

    Ok(())
}

fn list_games(config: &ConfigFile) {
    for kind in GameKind::ALL {
        let c = config.config_for(kind);
        let timeout = c
            .response_timeout_ms
            .map_or_else(|| "none".to_string(), |ms| format!("{ms} ms"));
        println!(
            "{:<20} {:<32} trials {:>3}  display {:>4} ms  timeout {}",
            kind.slug(),
            kind.name(),
            c.trial_count,
            c.display_ms,
            timeout
        );
    }
}

fn load_font(explicit: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(path) = explicit {
        return std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()));
    }
    for candidate in FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(candidate) {
            info!(font = candidate, "using system font");
            return Ok(bytes);
        }
    }
    bail!("no usable font found; pass one with --font PATH")
}
