use ratatui::Frame;

use crate::{app::App, app::View, ui::leaderboard::render_leaderboard};

/// A UI screen boundary, responsible for rendering one view
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Menu screen - renders through the App widget
pub struct StartScreen;

impl Screen for StartScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Live game screen - renders through the App widget
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct GameOverScreen;

impl Screen for GameOverScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Leaderboard screen - uses dedicated renderer
pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_leaderboard(app, f);
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Start => Box::new(StartScreen),
        View::Playing => Box::new(PlayingScreen),
        View::GameOver => Box::new(GameOverScreen),
        View::Leaderboard => Box::new(LeaderboardScreen),
    }
}

/// Draw whatever the app is currently showing
pub fn draw(app: &App, f: &mut Frame) {
    current_screen(app.view()).render(app, f);
}
