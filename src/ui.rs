pub mod game;
pub mod home;
pub mod leaderboard;
pub mod lobby;
pub mod screen;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use typearena::session::ConnectionState;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.page).render(app, f);
}

/// Header, body and key-help footer
fn page_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Page title on the left, connection and last error after it
fn header<'a>(title: &'a str, app: &'a App) -> Paragraph<'a> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled(title, bold.fg(Color::Magenta)),
        Span::raw("  "),
    ];
    spans.extend(connection_spans(app));

    let mut lines = vec![Line::from(spans)];
    if let Some(error) = &app.error {
        lines.push(Line::from(Span::styled(
            format!("✗ {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    Paragraph::new(lines)
}

fn connection_spans(app: &App) -> Vec<Span<'_>> {
    match &app.connection {
        ConnectionState::Connected(wallet) => vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::raw(wallet.chain_id.as_str()),
        ],
        ConnectionState::Connecting => vec![Span::styled(
            "○ connecting...",
            Style::default().fg(Color::Yellow),
        )],
        ConnectionState::Disconnected => vec![Span::styled(
            "○ offline",
            Style::default().add_modifier(Modifier::DIM),
        )],
    }
}

/// `(key) action` pairs for the footer
fn help(keys: &[(&str, &str)]) -> Paragraph<'static> {
    let text = keys
        .iter()
        .map(|(key, action)| format!("({key}) {action}"))
        .collect::<Vec<_>>()
        .join("  ");
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
}

/// Rectangle of the given size centered in `area`, clipped to it
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
