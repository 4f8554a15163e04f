use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use typearena::session::ConnectionState;

use super::{centered, header, help, page_layout};
use crate::App;

const TITLE: &str = "TYPE ARENA";
const TAGLINE: &str = "real-time typing races, settled on chain";

pub struct HomeView<'a>(pub &'a App);

impl Widget for HomeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let (top, body, footer) = page_layout(area);

        header("home", app).render(top, buf);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let mut lines = vec![
            Line::from(Span::styled(TITLE, bold.fg(Color::Magenta))),
            Line::from(Span::styled(TAGLINE, dim.add_modifier(Modifier::ITALIC))),
            Line::default(),
            Line::from(vec![
                Span::styled("player  ", dim),
                Span::styled(app.config.player_name.as_str(), bold),
            ]),
            Line::from(vec![
                Span::styled("backend ", dim),
                Span::raw(app.config.backend.to_string()),
            ]),
        ];

        match &app.connection {
            ConnectionState::Connected(wallet) => {
                lines.push(Line::from(vec![
                    Span::styled("chain   ", dim),
                    Span::styled(wallet.chain_id.as_str(), Style::default().fg(Color::Green)),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("owner   ", dim),
                    Span::raw(wallet.owner.as_str()),
                ]));
            }
            ConnectionState::Connecting => {
                lines.push(Line::from(Span::styled(
                    "connecting to chain...",
                    Style::default().fg(Color::Yellow),
                )));
            }
            ConnectionState::Disconnected => {
                lines.push(Line::from(Span::styled(
                    "not connected; press c to connect",
                    dim,
                )));
            }
        }

        let height = lines.len() as u16;
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(centered(body.width, height, body), buf);

        help(&[
            ("l", "lobby"),
            ("b", "leaderboard"),
            ("c", "connect"),
            ("d", "disconnect"),
            ("q", "quit"),
        ])
        .alignment(Alignment::Center)
        .render(footer, buf);
    }
}
