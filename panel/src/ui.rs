//! Terminal rendering. Consumes the shared state plus the typed card
//! view-model; every frame rebuilds the whole card region from the current
//! snapshot, so stale and fresh fields can never mix within one card.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::notice::NoticeKind;
use crate::state::{Catalog, DashboardState};
use crate::view::{build_cards, BotCard};

pub fn draw(f: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(chunks[1]);

    render_launch_panel(f, body[0], state);
    render_cards(f, body[1], state);
    render_notice(f, chunks[2], state);

    if let Some(bot_id) = &state.confirm_stop {
        render_confirm_modal(f, bot_id);
    }
}

fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let link = if state.connected {
        Span::styled("link OK", Style::default().fg(Color::Green))
    } else {
        Span::styled("link down", Style::default().fg(Color::Red))
    };
    let updated = state
        .last_updated
        .as_deref()
        .map(|t| format!(" · updated {t}"))
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled("Bot Fleet Panel", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        link,
        Span::styled(updated, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_launch_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let dataset_line = match &state.datasets {
        Catalog::Loading => Line::from(Span::styled(
            "loading datasets...",
            Style::default().fg(Color::DarkGray),
        )),
        Catalog::Empty => Line::from(Span::styled(
            "no datasets found",
            Style::default().fg(Color::DarkGray),
        )),
        Catalog::Failed => Line::from(Span::styled(
            "failed to load datasets",
            Style::default().fg(Color::Red),
        )),
        Catalog::Ready(names) => {
            let name = names
                .get(state.dataset_index)
                .map(String::as_str)
                .unwrap_or("?");
            Line::from(vec![
                Span::raw("< "),
                Span::styled(name, Style::default().fg(Color::Cyan)),
                Span::raw(" >"),
                Span::styled(
                    format!("  {}/{}", state.dataset_index + 1, names.len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
    };

    let launch_line = if state.launch_busy {
        Line::from(Span::styled(
            "[ Starting... ]",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            "[ Enter: Launch bot ]",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    };

    let text = vec![
        Line::from(vec![
            Span::raw("Bot id: "),
            Span::styled(
                format!("{}_", state.bot_id_input),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(""),
        Line::from(Span::raw("Dataset (Tab to cycle):")),
        dataset_line,
        Line::from(""),
        launch_line,
        Line::from(""),
        Line::from(Span::styled(
            "Up/Down select bot",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Del stop selected bot",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Launch"))
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn render_cards(f: &mut Frame, area: Rect, state: &DashboardState) {
    let cards = build_cards(&state.bots);
    let block = Block::default().borders(Borders::ALL).title("Bots");

    if cards.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No active bots.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, card) in cards.iter().enumerate() {
        let selected = i == state.selected_card;
        lines.extend(card_lines(card, selected));
    }

    let body = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn card_lines(card: &BotCard, selected: bool) -> Vec<Line<'_>> {
    let status_style = if card.running {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let marker = if selected { "> " } else { "  " };
    let title_style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(card.bot_id.as_str(), title_style),
            Span::raw("  "),
            Span::styled(card.status_label, status_style),
        ]),
        Line::from(vec![
            Span::raw("  portfolio "),
            Span::styled(card.portfolio.as_str(), Style::default().fg(Color::Cyan)),
            Span::raw("  last "),
            Span::styled(card.last_price.as_str(), Style::default().fg(Color::Cyan)),
            Span::raw("  cash "),
            Span::styled(card.cash.as_str(), Style::default().fg(Color::Cyan)),
            Span::raw("  pos "),
            Span::styled(card.position.as_str(), Style::default().fg(Color::Cyan)),
        ]),
    ];

    if card.logs.is_empty() {
        lines.push(Line::from(Span::styled(
            "    waiting for logs...",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for log in &card.logs {
            lines.push(Line::from(Span::styled(
                format!("    {log}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines.push(Line::from(""));
    lines
}

fn render_notice(f: &mut Frame, area: Rect, state: &DashboardState) {
    if let Some(notice) = state.notices.current() {
        let style = match notice.kind {
            NoticeKind::Error => Style::default().fg(Color::Red),
            NoticeKind::Success => Style::default().fg(Color::Green),
            NoticeKind::Info => Style::default(),
        };
        f.render_widget(
            Paragraph::new(Span::styled(notice.text.as_str(), style)),
            area,
        );
    }
}

fn render_confirm_modal(f: &mut Frame, bot_id: &str) {
    let area = centered_rect(44, 5, f.area());
    let text = vec![
        Line::from(format!("Stop bot {bot_id}?")),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Red)),
            Span::raw(" stop   "),
            Span::styled("[n]", Style::default().fg(Color::Green)),
            Span::raw(" keep running"),
        ]),
    ];
    let modal = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Confirm"));
    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
