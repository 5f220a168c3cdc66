use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;

use crate::celebration::PowerUpBurst;
use crate::config::{Config, ConfigStore};
use crate::game::Game;
use crate::leaderboard::{validate_player_name, Leaderboard};
use crate::session::Phase;

/// Key that taps each grid cell, in grid order
pub const CELL_KEYS: [char; 16] = [
    '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g',
];

const MAX_NAME_LEN: usize = 16;

pub fn cell_for_key(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    CELL_KEYS.iter().position(|&k| k == c)
}

/// What is on screen right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Start,
    Playing,
    GameOver,
    Leaderboard,
}

/// Leaderboard overlay wins, then game over, then play, else the menu
pub fn route(phase: Phase, show_leaderboard: bool) -> View {
    if show_leaderboard {
        return View::Leaderboard;
    }
    match phase {
        Phase::GameOver => View::GameOver,
        Phase::Playing => View::Playing,
        Phase::Idle => View::Start,
    }
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Share,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    pub input: String,
    pub saved: bool,
    /// Last save attempt had a blank name
    pub rejected: bool,
    pub rank: Option<usize>,
}

impl NameEntry {
    fn prefilled(name: Option<&str>) -> Self {
        Self {
            input: name.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }
}

pub struct App {
    pub game: Game<StdRng>,
    pub leaderboard: Leaderboard,
    pub show_leaderboard: bool,
    pub name_entry: NameEntry,
    pub burst: PowerUpBurst,
    pub config: Config,
    config_store: Option<Box<dyn ConfigStore>>,
    viewport: (u16, u16),
    frame: u64,
}

impl App {
    pub fn new(
        rng: StdRng,
        leaderboard: Leaderboard,
        config: Config,
        config_store: Option<Box<dyn ConfigStore>>,
    ) -> Self {
        Self {
            game: Game::new(rng),
            leaderboard,
            show_leaderboard: false,
            name_entry: NameEntry::prefilled(config.player_name.as_deref()),
            burst: PowerUpBurst::new(),
            config,
            config_store,
            viewport: (80, 24),
            frame: 0,
        }
    }

    pub fn view(&self) -> View {
        route(self.game.phase(), self.show_leaderboard)
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    /// Frames drawn so far; drives the shake animation
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn start_game(&mut self) {
        self.show_leaderboard = false;
        self.burst.stop();
        self.name_entry = NameEntry::prefilled(self.config.player_name.as_deref());
        self.game.start();
    }

    pub fn back_to_menu(&mut self) {
        self.show_leaderboard = false;
        self.burst.stop();
        self.game.reset();
    }

    pub fn on_tick(&mut self, now: Instant) {
        let report = self.game.tick(now);
        if report.game_over_now {
            self.burst.stop();
        }
        self.burst.update();
    }

    pub fn poll_timers(&mut self, now: Instant) {
        self.game.poll_timers(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.view() {
            View::Start => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.start_game(),
                KeyCode::Char('l') => self.show_leaderboard = true,
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            View::Leaderboard => match key.code {
                KeyCode::Enter => self.start_game(),
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => {
                    self.show_leaderboard = false
                }
                _ => {}
            },
            View::Playing => match key.code {
                KeyCode::Char(c) => self.tap_cell_key(c, now),
                KeyCode::Esc => self.back_to_menu(),
                _ => {}
            },
            View::GameOver => return self.handle_game_over_key(key),
        }

        Control::Continue
    }

    fn tap_cell_key(&mut self, c: char, now: Instant) {
        let Some(emoji) = cell_for_key(c)
            .and_then(|idx| self.game.session().emojis().get(idx))
            .cloned()
        else {
            return;
        };

        let report = self.game.tap(&emoji, now);
        if report.power_up_activated {
            let (width, height) = self.viewport;
            self.burst.start(width, height);
        }
    }

    fn handle_game_over_key(&mut self, key: KeyEvent) -> Control {
        if self.name_entry.saved {
            match key.code {
                KeyCode::Enter | KeyCode::Char('r') => self.start_game(),
                KeyCode::Char('l') => self.show_leaderboard = true,
                KeyCode::Char('t') => return Control::Share,
                KeyCode::Esc | KeyCode::Char('q') => self.back_to_menu(),
                _ => {}
            }
            return Control::Continue;
        }

        match key.code {
            KeyCode::Enter => self.save_score(),
            KeyCode::Tab => self.start_game(),
            KeyCode::Esc => self.back_to_menu(),
            KeyCode::Backspace => {
                self.name_entry.input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                if self.name_entry.input.chars().count() < MAX_NAME_LEN {
                    self.name_entry.input.push(c);
                }
                self.name_entry.rejected = false;
            }
            _ => {}
        }
        Control::Continue
    }

    /// Save the finished session under the typed name. Blank names are refused.
    pub fn save_score(&mut self) {
        if self.name_entry.saved || self.game.phase() != Phase::GameOver {
            return;
        }
        let Some(name) = validate_player_name(&self.name_entry.input) else {
            self.name_entry.rejected = true;
            return;
        };

        let session = self.game.session();
        let (score, max_combo) = (session.score(), session.max_combo());
        self.leaderboard.add_entry(&name, score, max_combo);
        log::info!("saved score {score} for {name}");

        self.name_entry.saved = true;
        self.name_entry.rejected = false;
        self.name_entry.rank = self.leaderboard.last_added_rank();

        self.config.player_name = Some(name);
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                log::warn!("could not remember player name: {e}");
            }
        }
    }

    /// Tweet intent for the finished session
    pub fn share_url(&self) -> String {
        let session = self.game.session();
        format!(
            "https://twitter.com/intent/tweet?text=I%20scored%20{}%20points%20with%20a%20{}x%20combo%20(level%20{})%20in%20Emoji%20Tap",
            session.score(),
            session.max_combo(),
            session.level()
        )
    }
}
