pub mod leaderboard;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::app::{App, View, CELL_KEYS};
use crate::celebration::PowerUpBurst;
use crate::scoring::{POWER_UP_DURATION, PERFECT_TAPS_PER_POWER_UP};
use crate::session::{EmojiSize, Session};
use crate::util::{format_seconds, truncate_name};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const GRID_COLUMNS: usize = 4;

/// Grids bigger than this are drawn with narrow cells
const COMPACT_GRID_CELLS: usize = 12;
/// Border, glyph, border
const MIN_CELL_HEIGHT: u16 = 3;

const TITLE_DECORATION: &str = "😀 🐶 🍎 🚗 ⚽ 💎";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.view() {
            View::Start => render_start(self, area, buf),
            View::Playing => render_playing(self, area, buf),
            View::GameOver => render_game_over(self, area, buf),
            View::Leaderboard => leaderboard::render_table(self, area, buf),
        }

        if self.burst.is_active {
            render_burst_particles(&self.burst, area, buf);
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn legend_style() -> Style {
    Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM)
}

fn render_start(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(1), // decoration
            Constraint::Length(2), // title
            Constraint::Length(4), // rules
            Constraint::Length(2), // best score
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(TITLE_DECORATION)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "EMOJI TAP",
        bold().fg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let rules = vec![
        Line::from("Find the target emoji in the grid and press its key."),
        Line::from("Hits add time and build your combo, misses cost 2 seconds."),
        Line::from(format!(
            "Every {PERFECT_TAPS_PER_POWER_UP} perfect taps in a row earns a power-up: double points, slower clock."
        )),
    ];
    Paragraph::new(rules)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    if let Some(best) = app.leaderboard.entries().first() {
        Paragraph::new(Span::styled(
            format!(
                "Best: {} with {} points",
                truncate_name(&best.name, 16),
                best.score
            ),
            Style::default().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) play / (l)eaderboard / (esc) quit",
        legend_style(),
    ))
    .render(chunks[6], buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // hud
            Constraint::Length(3), // target
            Constraint::Length(1), // time bar
            Constraint::Length(1), // power-up bar
            Constraint::Length(1), // padding
            Constraint::Min(3),    // grid
            Constraint::Length(1), // legend
        ])
        .split(area);

    render_hud(session, chunks[0], buf);
    render_target(session, chunks[1], buf);
    render_time_bar(session, chunks[2], buf);
    render_power_up_bar(session, chunks[3], buf);
    render_grid(session, app.frame(), chunks[5], buf);

    Paragraph::new(Span::styled(
        "(1-9, a-g) tap / (esc) menu",
        legend_style(),
    ))
    .render(chunks[6], buf);
}

fn render_hud(session: &Session, area: Rect, buf: &mut Buffer) {
    let accuracy = session
        .accuracy()
        .map(|acc| format!("{acc}%"))
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled(format!("Score {}", session.score()), bold()),
        Span::raw("   "),
        Span::styled(
            format!("Level {} ({})", session.level(), session.category()),
            bold().fg(Color::Cyan),
        ),
        Span::raw("   "),
        Span::styled(
            format!("Combo {}x", session.combo()),
            bold().fg(Color::Magenta),
        ),
        Span::raw("   "),
        Span::raw(format!("Acc {accuracy}")),
    ]);

    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn feedback_color(last_tap_correct: Option<bool>) -> Color {
    match last_tap_correct {
        Some(true) => Color::Green,
        Some(false) => Color::Red,
        None => Color::Gray,
    }
}

fn render_target(session: &Session, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" target ")
        .border_style(Style::default().fg(feedback_color(session.last_tap_correct())));

    Paragraph::new(Line::from(vec![
        Span::raw("Find: "),
        Span::styled(session.target_emoji().to_string(), bold()),
    ]))
    .alignment(Alignment::Center)
    .block(block)
    .render(area, buf);
}

fn time_color(fraction: f64) -> Color {
    if fraction > 0.5 {
        Color::Green
    } else if fraction > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn render_time_bar(session: &Session, area: Rect, buf: &mut Buffer) {
    let fraction = session.time_fraction().clamp(0.0, 1.0);
    Gauge::default()
        .gauge_style(Style::default().fg(time_color(fraction)))
        .ratio(fraction)
        .label(format!("{}s", format_seconds(session.seconds_left())))
        .render(area, buf);
}

fn render_power_up_bar(session: &Session, area: Rect, buf: &mut Buffer) {
    if session.power_up_active() {
        let left = session.power_up_time_left();
        let ratio = (left.as_secs_f64() / POWER_UP_DURATION.as_secs_f64()).clamp(0.0, 1.0);
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(ratio)
            .label(format!(
                "⚡ POWER UP {}s",
                format_seconds(left.as_secs_f64())
            ))
            .render(area, buf);
        return;
    }

    let needed = PERFECT_TAPS_PER_POWER_UP - session.perfect_taps() % PERFECT_TAPS_PER_POWER_UP;
    Paragraph::new(Span::styled(
        format!("power-up in {needed} perfect taps"),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

/// Width and height of one grid cell holding glyphs `glyph_width` wide
fn cell_size(size: EmojiSize, cells: usize, glyph_width: u16) -> (u16, u16) {
    match size {
        EmojiSize::Large => (glyph_width + 10, 5),
        EmojiSize::Small => (glyph_width + 4, 3),
        EmojiSize::Normal if cells > COMPACT_GRID_CELLS => (glyph_width + 4, 3),
        EmojiSize::Normal => (glyph_width + 7, 3),
    }
}

/// Shrinks tall cells back to the bordered minimum when every row would not fit
fn fit_cell_height(rows: u16, cell_height: u16, available: u16) -> u16 {
    if rows.saturating_mul(cell_height) <= available {
        cell_height
    } else {
        cell_height.min(MIN_CELL_HEIGHT)
    }
}

/// Sideways nudge of the grid, alternating every frame while shaking
fn shake_offset(shaking: bool, frame: u64) -> u16 {
    if shaking {
        (frame % 2) as u16
    } else {
        0
    }
}

fn render_grid(session: &Session, frame: u64, area: Rect, buf: &mut Buffer) {
    let emojis = session.emojis();
    if emojis.is_empty() {
        return;
    }

    let glyph_width = emojis.iter().map(|e| e.width()).max().unwrap_or(2) as u16;
    let (cell_width, cell_height) = cell_size(session.emoji_size(), emojis.len(), glyph_width);
    let columns = GRID_COLUMNS.min(emojis.len());
    let rows = emojis.len().div_ceil(GRID_COLUMNS) as u16;
    let cell_height = fit_cell_height(rows, cell_height, area.height);

    let grid_width = cell_width * columns as u16;
    let left = area.x
        + area.width.saturating_sub(grid_width) / 2
        + shake_offset(session.is_shaking(), frame);

    let border_color = feedback_color(session.last_tap_correct());

    for (idx, emoji) in emojis.iter().enumerate() {
        let row = (idx / GRID_COLUMNS) as u16;
        let col = (idx % GRID_COLUMNS) as u16;
        let cell = Rect::new(
            left + col * cell_width,
            area.y + row * cell_height,
            cell_width,
            cell_height,
        )
        .intersection(area);
        if cell.is_empty() {
            continue;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(CELL_KEYS[idx].to_string(), bold().fg(Color::Yellow)))
            .border_style(Style::default().fg(border_color));

        let padding = cell_height.saturating_sub(3) / 2;
        let mut lines = vec![Line::from(""); padding as usize];
        lines.push(Line::from(emoji.as_str()));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .render(cell, buf);
    }
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();
    let entry = &app.name_entry;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Length(2), // heading
            Constraint::Length(1), // score
            Constraint::Length(1), // stats
            Constraint::Length(1), // padding
            Constraint::Length(3), // name entry
            Constraint::Length(1), // save status
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("GAME OVER", bold().fg(Color::Red)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("{} points", session.score()),
        bold().fg(Color::Yellow),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let accuracy = session
        .accuracy()
        .map(|acc| format!("{acc}%"))
        .unwrap_or_else(|| "-".to_string());
    Paragraph::new(format!(
        "max combo {}x   level {}   {}/{} hits   {} acc",
        session.max_combo(),
        session.level(),
        session.hits(),
        session.total_taps(),
        accuracy
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    let name_style = if entry.saved {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        bold()
    };
    let cursor = if entry.saved { "" } else { "▏" };
    Paragraph::new(Span::styled(format!("{}{cursor}", entry.input), name_style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" your name "))
        .render(chunks[5], buf);

    let (status, color) = if entry.saved {
        match entry.rank {
            Some(rank) => (format!("saved! you placed #{rank}"), Color::Green),
            None => ("saved, but not in the top 10 this time".to_string(), Color::Yellow),
        }
    } else if entry.rejected {
        ("enter a name to save your score".to_string(), Color::Red)
    } else if app.leaderboard.is_high_score(session.score()) {
        ("new high score!".to_string(), Color::Cyan)
    } else {
        (String::new(), Color::Reset)
    };
    Paragraph::new(Span::styled(status, Style::default().fg(color)))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    let legend = match (entry.saved, Browser::is_available()) {
        (false, _) => "(enter) save / (tab) play again / (esc) menu",
        (true, true) => "(r)etry / (l)eaderboard / (t)weet / (esc) menu",
        (true, false) => "(r)etry / (l)eaderboard / (esc) menu",
    };
    Paragraph::new(Span::styled(legend, legend_style())).render(chunks[8], buf);
}

/// Render burst particles on top of whatever screen is showing
fn render_burst_particles(burst: &PowerUpBurst, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for particle in &burst.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let fade = 1.0 - particle.age / particle.max_age;
        let style = if particle.is_text || fade > 0.6 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if fade > 0.3 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::leaderboard::Leaderboard;
    use crate::storage::MemoryStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    fn test_app() -> App {
        App::new(
            StdRng::seed_from_u64(9),
            Leaderboard::new(Box::new(MemoryStore::new())),
            Config::default(),
            None,
        )
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn tap_target(app: &mut App) {
        let session = app.game.session();
        let idx = session
            .emojis()
            .iter()
            .position(|e| e == session.target_emoji())
            .unwrap();
        app.handle_key(
            KeyEvent::new(KeyCode::Char(CELL_KEYS[idx]), KeyModifiers::NONE),
            Instant::now(),
        );
    }

    fn finish(app: &mut App) {
        let now = Instant::now();
        while !app.game.tick(now).game_over_now {}
    }

    #[test]
    fn test_start_screen() {
        let app = test_app();
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("EMOJI TAP"));
        assert!(rendered.contains("(l)eaderboard"));
    }

    #[test]
    fn test_start_screen_shows_best() {
        let mut app = test_app();
        app.leaderboard.add_entry("Ann", 500, 7);
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("Best: Ann with 500 points"));
    }

    #[test]
    fn test_playing_screen_shows_hud_and_labels() {
        let mut app = test_app();
        app.start_game();
        let rendered = render(&app, 80, 30);

        assert!(rendered.contains("Score 0"));
        assert!(rendered.contains("Level 1 (Smiley)"));
        assert!(rendered.contains("30.0s"));
        assert!(rendered.contains(app.game.session().target_emoji()));
        for emoji in app.game.session().emojis() {
            assert!(rendered.contains(emoji.as_str()));
        }
        assert!(rendered.contains("power-up in 5 perfect taps"));
    }

    #[test]
    fn test_playing_screen_full_grid() {
        let mut app = test_app();
        app.start_game();
        for _ in 0..30 {
            tap_target(&mut app);
        }
        assert_eq!(app.game.session().emojis().len(), 16);
        app.burst.stop();
        let rendered = render(&app, 100, 40);
        for emoji in app.game.session().emojis() {
            assert!(rendered.contains(emoji.as_str()));
        }
    }

    #[test]
    fn test_power_up_bar_and_burst() {
        let mut app = test_app();
        app.set_viewport(80, 30);
        app.start_game();
        for _ in 0..5 {
            tap_target(&mut app);
        }
        assert!(app.burst.is_active);
        let rendered = render(&app, 80, 30);
        assert!(rendered.contains("POWER UP"));
    }

    #[test]
    fn test_game_over_screen() {
        let mut app = test_app();
        app.start_game();
        tap_target(&mut app);
        finish(&mut app);

        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("GAME OVER"));
        assert!(rendered.contains("12 points"));
        assert!(rendered.contains("your name"));
        assert!(rendered.contains("new high score!"));
    }

    #[test]
    fn test_game_over_rejected_and_saved() {
        let mut app = test_app();
        app.start_game();
        finish(&mut app);

        app.save_score();
        assert!(render(&app, 80, 24).contains("enter a name"));

        app.name_entry.input = "Ann".into();
        app.save_score();
        assert!(render(&app, 80, 24).contains("saved! you placed #1"));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let mut app = test_app();
        for (w, h) in [(1, 1), (10, 3), (20, 5)] {
            render(&app, w, h);
        }
        app.start_game();
        for (w, h) in [(1, 1), (10, 3), (20, 5)] {
            render(&app, w, h);
        }
        finish(&mut app);
        render(&app, 10, 3);
    }

    #[test]
    fn test_power_up_grid_fits_default_terminal() {
        let mut app = test_app();
        app.start_game();
        // ten straight hits: level 11, full grid, power-up still running
        for _ in 0..10 {
            tap_target(&mut app);
        }
        let session = app.game.session();
        assert_eq!(session.emojis().len(), 16);
        assert!(session.power_up_active());
        assert_eq!(session.emoji_size(), EmojiSize::Large);

        app.burst.stop();
        let rendered = render(&app, 80, 24);
        let missing: Vec<_> = app
            .game
            .session()
            .emojis()
            .iter()
            .filter(|e| !rendered.contains(e.as_str()))
            .collect();
        assert!(missing.is_empty(), "cells not drawn: {missing:?}");
    }

    #[test]
    fn test_fit_cell_height() {
        assert_eq!(fit_cell_height(4, 5, 20), 5);
        assert_eq!(fit_cell_height(4, 5, 14), 3);
        assert_eq!(fit_cell_height(4, 3, 14), 3);
        assert_eq!(fit_cell_height(1, 5, 5), 5);
    }

    #[test]
    fn test_shake_offset_alternates_per_frame() {
        assert_eq!(shake_offset(false, 0), 0);
        assert_eq!(shake_offset(false, 1), 0);
        assert_eq!(shake_offset(true, 0), 0);
        assert_eq!(shake_offset(true, 1), 1);
        assert_eq!(shake_offset(true, 2), 0);
    }

    #[test]
    fn test_shake_moves_between_frames_without_ticks() {
        let mut app = test_app();
        app.start_game();
        let session = app.game.session();
        let idx = session
            .emojis()
            .iter()
            .position(|e| e != session.target_emoji())
            .unwrap();
        app.handle_key(
            KeyEvent::new(KeyCode::Char(CELL_KEYS[idx]), KeyModifiers::NONE),
            Instant::now(),
        );
        assert!(app.game.session().is_shaking());

        let first = render(&app, 80, 30);
        app.advance_frame();
        let second = render(&app, 80, 30);
        assert_ne!(first, second);

        app.game.poll_timers(Instant::now() + Duration::from_secs(1));
        assert!(!app.game.session().is_shaking());
        let still = render(&app, 80, 30);
        app.advance_frame();
        assert_eq!(still, render(&app, 80, 30));
    }

    #[test]
    fn test_cell_size() {
        assert_eq!(cell_size(EmojiSize::Normal, 4, 2), (9, 3));
        assert_eq!(cell_size(EmojiSize::Normal, 16, 2), (6, 3));
        assert_eq!(cell_size(EmojiSize::Small, 4, 2), (6, 3));
        assert_eq!(cell_size(EmojiSize::Large, 4, 2), (12, 5));
    }

    #[test]
    fn test_feedback_color() {
        assert_eq!(feedback_color(Some(true)), Color::Green);
        assert_eq!(feedback_color(Some(false)), Color::Red);
        assert_eq!(feedback_color(None), Color::Gray);
    }
}
