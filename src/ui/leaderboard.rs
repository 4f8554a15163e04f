use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use typearena::leaderboard::LeaderboardEntry;

use super::{centered, header, help, page_layout};
use crate::App;

pub struct LeaderboardView<'a>(pub &'a App);

impl Widget for LeaderboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let board = &app.board;
        let (top, body, footer) = page_layout(area);

        header("leaderboard", app).render(top, buf);

        if board.entries.is_empty() {
            let message = if board.loading {
                "loading leaderboard..."
            } else if !app.is_connected() {
                "not connected; press c on the home page"
            } else {
                "no results yet"
            };
            Paragraph::new(Span::styled(
                message,
                Style::default().add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(centered(body.width, 1, body), buf);
        } else {
            let widths = [
                Constraint::Length(6),
                Constraint::Percentage(30),
                Constraint::Percentage(10),
                Constraint::Percentage(10),
                Constraint::Percentage(10),
                Constraint::Percentage(12),
                Constraint::Percentage(12),
                Constraint::Percentage(10),
            ];
            Table::new(board.entries.iter().map(entry_row), widths)
                .header(
                    Row::new(vec![
                        "Rank", "Player", "Won", "Played", "Win %", "Avg WPM", "Avg Acc", "Best",
                    ])
                    .style(
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
                .block(Block::default().borders(Borders::ALL).title("Top typists"))
                .render(body, buf);
        }

        help(&[("r", "refresh"), ("esc", "home")])
            .alignment(Alignment::Center)
            .render(footer, buf);
    }
}

fn rank_style(rank: usize) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match rank {
        1 => bold.fg(Color::Yellow),
        2 => bold.fg(Color::Gray),
        3 => bold.fg(Color::Rgb(205, 127, 50)),
        _ => Style::default(),
    }
}

fn entry_row(entry: &LeaderboardEntry) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("#{}", entry.rank)).style(rank_style(entry.rank)),
        Cell::from(entry.player.clone()),
        Cell::from(entry.games_won.to_string()),
        Cell::from(entry.games_played.to_string()),
        Cell::from(format!("{}%", entry.win_rate())),
        Cell::from(entry.average_wpm.to_string()),
        Cell::from(format!("{}%", entry.average_accuracy)),
        Cell::from(entry.best_wpm.to_string()),
    ])
}
