use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Widget},
};
use typearena::room::RoomSettings;

use super::{centered, header, help, page_layout};
use crate::App;

pub struct LobbyView<'a>(pub &'a App);

impl Widget for LobbyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let lobby = &app.lobby;
        let (top, body, footer) = page_layout(area);

        header("lobby", app).render(top, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)].as_ref())
            .split(body);

        let search_style = if lobby.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let cursor = if lobby.searching { "_" } else { "" };
        Paragraph::new(Line::from(vec![
            Span::styled("search: ", search_style),
            Span::raw(format!("{}{cursor}", lobby.query)),
        ]))
        .render(chunks[0], buf);

        let rooms = app.visible_rooms();
        if rooms.is_empty() {
            let message = if lobby.loading {
                "loading rooms..."
            } else if !app.is_connected() {
                "not connected; press c on the home page"
            } else {
                "no open rooms; press c to create one"
            };
            Paragraph::new(Span::styled(
                message,
                Style::default().add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(centered(chunks[1].width, 1, chunks[1]), buf);
        } else {
            let rows = rooms.iter().enumerate().map(|(idx, room)| {
                let style = if idx == lobby.selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(room.short_id()),
                    Cell::from(room.host.clone()),
                    Cell::from(format!("{}/{}", room.player_count, room.max_players)),
                    Cell::from(room.rounds.to_string()),
                    Cell::from(room.status.to_string()),
                ])
                .style(style)
            });

            let widths = [
                Constraint::Percentage(32),
                Constraint::Percentage(28),
                Constraint::Percentage(14),
                Constraint::Percentage(10),
                Constraint::Percentage(16),
            ];
            Table::new(rows, widths)
                .header(
                    Row::new(vec!["Room", "Host", "Players", "Rounds", "Status"]).style(
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
                .block(Block::default().borders(Borders::ALL).title("Open rooms"))
                .render(chunks[1], buf);
        }

        if let Some(form) = &lobby.form {
            render_form(form, body, buf);
        }

        let keys: &[(&str, &str)] = if lobby.searching {
            &[("enter", "done"), ("esc", "done")]
        } else if lobby.form.is_some() {
            &[("p", "players"), ("n", "rounds"), ("enter", "create"), ("esc", "cancel")]
        } else {
            &[
                ("↑/↓", "select"),
                ("j", "join"),
                ("c", "create"),
                ("/", "search"),
                ("r", "refresh"),
                ("esc", "home"),
            ]
        };
        help(keys).alignment(Alignment::Center).render(footer, buf);
    }
}

fn render_form(form: &RoomSettings, area: Rect, buf: &mut Buffer) {
    let popup = centered(36, 6, area);
    Clear.render(popup, buf);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Max players  "),
            Span::styled(format!("[{}]", form.max_players), bold),
            Span::raw("  (p)"),
        ]),
        Line::from(vec![
            Span::raw("Rounds       "),
            Span::styled(format!("[{}]", form.rounds), bold),
            Span::raw("  (n)"),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Create room")
            .title_style(bold.fg(Color::Magenta)),
    )
    .alignment(Alignment::Center)
    .render(popup, buf);
}
