use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};
use std::time::SystemTime;
use typearena::arena::{Arena, CharState, MatchStatus};
use unicode_width::UnicodeWidthStr;

use super::{centered, header, help, page_layout};
use crate::App;

pub struct GameView<'a>(pub &'a App);

impl Widget for GameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let (top, body, footer) = page_layout(area);

        let Some(arena) = &app.arena else {
            header("game", app).render(top, buf);
            return;
        };

        let title = format!(
            "room {}  round {}/{}",
            short_room(arena.room_id()),
            arena.current_round(),
            arena.total_rounds()
        );
        header(&title, app).render(top, buf);

        match arena.status() {
            MatchStatus::Waiting => {
                Paragraph::new(Span::styled(
                    "Press Enter to start",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD | Modifier::ITALIC),
                ))
                .alignment(Alignment::Center)
                .render(centered(body.width, 1, body), buf);
            }
            MatchStatus::Countdown => render_countdown(arena, body, buf),
            MatchStatus::Playing | MatchStatus::Finished => render_round(arena, app.now, body, buf),
        }

        let keys: &[(&str, &str)] = match arena.status() {
            MatchStatus::Waiting => &[("enter", "start"), ("esc", "lobby")],
            MatchStatus::Finished if arena.match_over() => &[("enter", "play again"), ("esc", "lobby")],
            MatchStatus::Finished => &[("enter", "next round"), ("esc", "lobby")],
            _ => &[("esc", "lobby")],
        };
        help(keys).alignment(Alignment::Center).render(footer, buf);
    }
}

fn short_room(id: &str) -> String {
    if id.chars().count() > 24 {
        format!("{}...", id.chars().take(24).collect::<String>())
    } else {
        id.to_string()
    }
}

fn render_countdown(arena: &Arena, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            arena.countdown().to_string(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "get ready",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(centered(area.width, 2, area), buf);
}

fn render_round(arena: &Arena, now: SystemTime, area: Rect, buf: &mut Buffer) {
    let max_chars_per_line = area.width.max(1);
    let mut prompt_lines = 1;
    if arena.prompt().width() > max_chars_per_line as usize {
        // word wrapping can spill one line past the character estimate
        prompt_lines =
            (arena.prompt().width() as f64 / max_chars_per_line as f64).ceil() as u16 + 1;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(prompt_lines),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(4),
            ]
            .as_ref(),
        )
        .split(area);

    stats_bar(arena, now).render(chunks[0], buf);

    Paragraph::new(Line::from(prompt_spans(arena)))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    if arena.status() == MatchStatus::Finished {
        Paragraph::new(banner(arena))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    player_table(arena).render(chunks[5], buf);
}

fn stats_bar(arena: &Arena, now: SystemTime) -> Paragraph<'static> {
    let stats = arena.live_stats(now);
    let label = Style::default().add_modifier(Modifier::DIM);
    let value = Style::default().add_modifier(Modifier::BOLD);

    Paragraph::new(Line::from(vec![
        Span::styled("WPM ", label),
        Span::styled(stats.wpm.to_string(), value.fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("ACC ", label),
        Span::styled(format!("{}%", stats.accuracy), value.fg(Color::Green)),
        Span::raw("   "),
        Span::styled("TIME ", label),
        Span::styled(format!("{}s", arena.elapsed_secs(now)), value.fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
}

fn prompt_spans(arena: &Arena) -> Vec<Span<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);

    let mut spans = arena
        .char_states()
        .into_iter()
        .map(|(c, state)| match state {
            CharState::Correct => Span::styled(c.to_string(), green_bold_style),
            CharState::Incorrect => Span::styled(visible(c), red_bold_style),
            CharState::Current => Span::styled(c.to_string(), underlined_dim_bold_style),
            CharState::Pending => Span::styled(c.to_string(), dim_bold_style),
        })
        .collect::<Vec<_>>();

    // typed past the end of the prompt
    let overflow: String = arena
        .input()
        .chars()
        .skip(arena.prompt().chars().count())
        .map(|c| if c == ' ' { '·' } else { c })
        .collect();
    if !overflow.is_empty() {
        spans.push(Span::styled(overflow, red_bold_style));
    }

    spans
}

/// Misses on a space would otherwise be invisible
fn visible(c: char) -> String {
    match c {
        ' ' => "·".to_owned(),
        c => c.to_string(),
    }
}

fn banner(arena: &Arena) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    if arena.opponent_pending() {
        return vec![Line::from(Span::styled(
            "waiting for opponent...",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))];
    }

    let round = if arena.is_winner() {
        Line::from(Span::styled("You win this round!", bold.fg(Color::Green)))
    } else {
        let leader = arena
            .players()
            .iter()
            .max_by_key(|p| p.score)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        Line::from(Span::styled(format!("{leader} takes the round"), bold.fg(Color::Red)))
    };

    let mut lines = vec![round];
    if let Some(winner) = arena.match_winner() {
        lines.push(Line::from(Span::styled(
            format!("Match winner: {} ({} pts)", winner.name, winner.total_score),
            bold.fg(Color::Magenta),
        )));
    }
    lines
}

fn player_table(arena: &Arena) -> Table<'static> {
    let local_id = arena.local_player().id.clone();
    let rows = arena
        .players()
        .iter()
        .map(|p| {
            let style = if p.id == local_id {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let (wpm, accuracy, score) = if p.finished {
                (
                    p.wpm.to_string(),
                    format!("{}%", p.accuracy),
                    p.score.to_string(),
                )
            } else {
                ("-".to_string(), "-".to_string(), "-".to_string())
            };
            Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(wpm),
                Cell::from(accuracy),
                Cell::from(score),
                Cell::from(p.total_score.to_string()),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();

    Table::new(
        rows,
        [
            Constraint::Percentage(36),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
        ],
    )
    .header(
        Row::new(vec!["Player", "WPM", "Accuracy", "Score", "Total"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(Block::default().borders(Borders::ALL).title("Players"))
}
