use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use routiner::session::Outcome;
use routiner::util::format_human;

use crate::app::{App, SETTINGS_ROWS};
use crate::ui::{bold, centered, dim, highlight};

const LOGO: &str = "routiner";

pub fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let count = app.routines.len();
    let summary = match count {
        0 => "no routines yet".to_string(),
        1 => "1 routine".to_string(),
        n => format!("{n} routines"),
    };

    let menu = [
        ("r", "Routines"),
        ("n", "New routine"),
        ("s", "Settings"),
        ("h", "History"),
        ("q", "Quit"),
    ];
    let mut lines = vec![
        Line::from(Span::styled(LOGO, bold().fg(Color::Cyan))),
        Line::from(Span::styled(summary, dim())),
        Line::default(),
    ];
    lines.extend(menu.iter().map(|(key, label)| {
        Line::from(vec![
            Span::styled(format!("({key}) "), bold().fg(Color::Yellow)),
            Span::raw(*label),
        ])
    }));

    let box_area = centered(32, lines.len() as u16 + 2, area);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(box_area, buf);
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

pub fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let draft = &app.draft_settings;
    let rows: [(&str, String); SETTINGS_ROWS] = [
        ("Show breaks", on_off(draft.show_breaks).to_string()),
        ("Auto-start breaks", on_off(draft.auto_start_breaks).to_string()),
        (
            "Auto-start exercises",
            on_off(draft.auto_start_exercises).to_string(),
        ),
        ("Break duration", format_human(draft.break_duration)),
    ];

    let mut lines = vec![Line::default()];
    for (i, (label, value)) in rows.into_iter().enumerate() {
        let style = if i == app.settings_cursor {
            highlight()
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:<22}"), style),
            Span::styled(format!("{value:>8}"), bold()),
        ]));
    }
    if *draft != app.settings {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "unsaved changes",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    let box_area = centered(40, lines.len() as u16 + 2, area);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Settings ", bold())),
        )
        .render(box_area, buf);
}

pub fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" History ", bold()));

    if app.history_rows.is_empty() {
        Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled("No workouts recorded yet.", dim())),
        ])
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let rows = app
        .history_rows
        .iter()
        .skip(app.history_scroll)
        .take(visible)
        .map(|record| {
            let outcome_style = match record.outcome {
                Outcome::Finished => Style::default().fg(Color::Green),
                Outcome::Abandoned => Style::default().fg(Color::Red),
            };
            Row::new(vec![
                Cell::from(record.started_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(record.routine_name.clone()),
                Cell::from(record.outcome.to_string()).style(outcome_style),
                Cell::from(format!("{}/{}", record.completed, record.total)),
                Cell::from(record.skipped.to_string()),
                Cell::from(format_human(record.duration_secs())),
            ])
        });

    let header = Row::new(vec!["Started", "Routine", "Outcome", "Done", "Skipped", "Time"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block)
    .render(area, buf);
}
