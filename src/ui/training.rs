use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use routiner::celebration::Celebration;
use routiner::exercise::Exercise;
use routiner::timer::Clock;
use routiner::training::TrainingSession;
use routiner::util::{format_human, format_remaining};

use crate::ui::{bold, dim, truncate};

const CONFETTI_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::LightBlue,
];

pub fn render_training<C: Clock + Clone>(
    session: &TrainingSession<C>,
    area: Rect,
    buf: &mut Buffer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let position = session
        .current_index()
        .map_or(0, |idx| idx + 1)
        .min(session.total());
    let title = Line::from(vec![
        Span::styled(
            truncate(session.routine_name(), area.width.saturating_sub(20) as usize),
            bold().fg(Color::Cyan),
        ),
        Span::styled(
            format!("  exercise {}/{}", position, session.total()),
            dim(),
        ),
    ]);
    Paragraph::new(title)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
        .render(chunks[0], buf);

    let body = if session.is_in_break() {
        break_lines(session)
    } else {
        exercise_lines(session)
    };
    let pad = chunks[1].height.saturating_sub(body.len() as u16) / 2;
    let mut lines = vec![Line::default(); pad as usize];
    lines.extend(body);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(session.progress() as u16)
        .label(format!(
            "{}% ({}/{})",
            session.progress(),
            session.completed(),
            session.total()
        ))
        .render(chunks[2], buf);
}

fn timer_style(running: bool) -> Style {
    if running {
        bold().fg(Color::Green)
    } else {
        bold().fg(Color::Yellow)
    }
}

fn exercise_lines<C: Clock + Clone>(session: &TrainingSession<C>) -> Vec<Line<'static>> {
    let Some(exercise) = session.current_exercise() else {
        return vec![];
    };

    let mut lines = vec![
        Line::from(Span::styled(
            exercise.name().to_string(),
            bold().add_modifier(Modifier::UNDERLINED),
        )),
        Line::default(),
    ];

    match exercise {
        Exercise::Timed { .. } => {
            let timer = session.exercise_timer();
            lines.push(Line::from(Span::styled(
                format_remaining(timer.remaining_secs()),
                timer_style(timer.is_running()),
            )));
            if !timer.is_running() {
                lines.push(Line::from(Span::styled("paused", dim())));
            }
        }
        Exercise::RepCount { .. } => {
            lines.push(Line::from(Span::styled(
                exercise.target_label(),
                bold().fg(Color::Magenta),
            )));
            lines.push(Line::from(Span::styled(
                "press (f) when done",
                dim().add_modifier(Modifier::ITALIC),
            )));
        }
    }
    lines
}

fn break_lines<C: Clock + Clone>(session: &TrainingSession<C>) -> Vec<Line<'static>> {
    let timer = session.break_timer();
    let mut lines = vec![
        Line::from(Span::styled("BREAK", bold().fg(Color::LightBlue))),
        Line::default(),
        Line::from(Span::styled(
            format_remaining(timer.remaining_secs()),
            timer_style(timer.is_running()),
        )),
    ];
    if let Some(next) = session.upcoming_exercise() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("next: ", dim()),
            Span::raw(format!("{} ({})", next.name(), next.target_label())),
        ]));
    }
    lines
}

pub fn render_finished<C: Clock + Clone>(
    session: &TrainingSession<C>,
    celebration: &Celebration,
    area: Rect,
    buf: &mut Buffer,
) {
    let elapsed = (Local::now() - session.started_at()).num_seconds().max(0) as u64;
    let mut summary = format!("{} of {} exercises", session.completed(), session.total());
    if session.skipped() > 0 {
        summary.push_str(&format!(", {} skipped", session.skipped()));
    }

    let lines = vec![
        Line::from(Span::styled("CONGRATS", bold().fg(Color::Green))),
        Line::default(),
        Line::from(vec![
            Span::raw("You finished "),
            Span::styled(session.routine_name().to_string(), bold()),
        ]),
        Line::from(Span::styled(summary, dim())),
        Line::from(Span::styled(format!("in {}", format_human(elapsed)), dim())),
    ];
    let pad = area.height.saturating_sub(lines.len() as u16) / 2;
    let mut padded = vec![Line::default(); pad as usize];
    padded.extend(lines);
    Paragraph::new(padded)
        .alignment(Alignment::Center)
        .render(area, buf);

    if celebration.is_active {
        for particle in &celebration.particles {
            if particle.x < 0.0 || particle.y < 0.0 {
                continue;
            }
            let (x, y) = (area.x + particle.x as u16, area.y + particle.y as u16);
            if x >= area.right() || y >= area.bottom() {
                continue;
            }
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(particle.symbol).set_style(
                    Style::default()
                        .fg(CONFETTI_COLORS[particle.color_index % CONFETTI_COLORS.len()])
                        .add_modifier(Modifier::BOLD),
                );
            }
        }
    }
}
