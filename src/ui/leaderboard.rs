use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
    Frame,
};

use crate::app::App;
use crate::leaderboard::LeaderboardEntry;
use crate::util::truncate_name;

const NAME_WIDTH: usize = 16;

pub fn render_leaderboard(app: &App, f: &mut Frame) {
    let area = f.area();
    render_table(app, area, f.buffer_mut());
}

pub(crate) fn render_table(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(3),    // table
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "🏆 LEADERBOARD 🏆",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let entries = app.leaderboard.entries();
    if entries.is_empty() {
        Paragraph::new("No scores yet. Be the first!")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[1], buf);
    } else {
        let highlight = app
            .name_entry
            .saved
            .then(|| app.name_entry.rank)
            .flatten();
        let rows = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| entry_row(idx + 1, entry, highlight == Some(idx + 1)));

        let header = Row::new(vec!["#", "Name", "Score", "Combo", "Date"]).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(NAME_WIDTH as u16 + 1),
                Constraint::Length(8),
                Constraint::Length(7),
                Constraint::Min(16),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) play / (b)ack",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .render(chunks[2], buf);
}

fn medal(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => n.to_string(),
    }
}

fn entry_row(rank: usize, entry: &LeaderboardEntry, highlight: bool) -> Row<'static> {
    let style = if highlight {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(medal(rank)),
        Cell::from(truncate_name(&entry.name, NAME_WIDTH)),
        Cell::from(entry.score.to_string()),
        Cell::from(format!("{}x", entry.max_combo)),
        Cell::from(
            entry
                .date
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        ),
    ])
    .style(style)
}
