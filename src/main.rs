use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use emoji_tap::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    leaderboard::{Leaderboard, LeaderboardEntry},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker},
    scoring::TICK_RATE_MS,
    storage::{JsonFileStore, KeyValueStore, MemoryStore, SqliteStore},
    ui::screen,
    util::truncate_name,
};
use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use webbrowser::Browser;

/// fast-paced terminal reaction game: tap the matching emoji before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// seed for the emoji shuffles, for repeatable games
    #[clap(long)]
    seed: Option<u64>,

    /// player name offered when saving a score
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// keep the leaderboard as JSON in this directory instead of the SQLite database
    #[clap(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// print the leaderboard and exit
    #[clap(long)]
    scores: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(name) = cli.name.clone() {
        config.player_name = Some(name);
    }

    let leaderboard = Leaderboard::new(open_store(&cli, &config));

    if cli.scores {
        println!("{}", format_scores(leaderboard.entries()));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut app = App::new(rng, leaderboard, config, Some(Box::new(config_store)));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to a file in the state dir; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

/// Leaderboard backend: JSON files when a data dir is given, SQLite otherwise.
/// Falls back to memory when the database cannot be opened.
fn open_store(cli: &Cli, config: &Config) -> Box<dyn KeyValueStore> {
    if let Some(dir) = cli.data_dir.as_ref().or(config.data_dir.as_ref()) {
        log::info!("leaderboard in {}", dir.display());
        return Box::new(JsonFileStore::new(dir));
    }

    let opened = AppDirs::leaderboard_db_path()
        .ok_or_else(|| "no state directory".to_string())
        .and_then(|path| SqliteStore::open(&path).map_err(|e| e.to_string()));

    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::error!("scores will not be kept, cannot open leaderboard database: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

fn format_scores(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "no scores yet".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            format!(
                "{:>2}. {:<16} {:>6} pts  {:>3}x combo  {}",
                idx + 1,
                truncate_name(&entry.name, 16),
                entry.score,
                entry.max_combo,
                entry.date.format("%Y-%m-%d")
            )
        })
        .join("\n")
}

fn start_tui<B: Backend, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        let size = terminal.size()?;
        app.set_viewport(size.width, size.height);
        app.advance_frame();
        terminal.draw(|f| screen::draw(app, f))?;

        let event = runner.step();
        let now = Instant::now();
        app.poll_timers(now);

        match event {
            GameEvent::Tick => app.on_tick(now),
            GameEvent::Resize => {}
            GameEvent::Key(key) => match app.handle_key(key, now) {
                Control::Continue => {}
                Control::Quit => return Ok(()),
                Control::Share => share(app),
            },
        }
    }
}

fn share(app: &App) {
    if !Browser::is_available() {
        return;
    }
    if let Err(e) = webbrowser::open(&app.share_url()) {
        log::warn!("could not open share link: {e}");
    }
}
