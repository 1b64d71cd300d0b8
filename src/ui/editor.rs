use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Widget},
};

use routiner::util::format_human;

use crate::app::{App, ExerciseForm, ExerciseKind, FormField};
use crate::ui::{bold, centered, dim, highlight, truncate};

/// Keeps the selected row inside a window of `visible` rows
fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        0
    } else {
        selected.saturating_sub(visible - 1)
    }
}

pub fn render_routines(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Routines ", bold()));

    if app.routines.is_empty() {
        Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled("No routines yet.", dim())),
            Line::from(Span::styled("Press (n) to create one.", dim())),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(app.selected_routine, visible);
    let name_width = area.width.saturating_sub(46).max(8) as usize;

    let rows = app
        .routines
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, routine)| {
            let last = match app.last_trained.get(&routine.name) {
                Some(record) => format!(
                    "{} ({})",
                    record.started_at.format("%Y-%m-%d %H:%M"),
                    record.outcome
                ),
                None => "never".to_string(),
            };
            let row = Row::new(vec![
                Cell::from(truncate(&routine.name, name_width)),
                Cell::from(routine.len().to_string()),
                Cell::from(format_human(routine.timed_secs())),
                Cell::from(last),
            ]);
            if i == app.selected_routine {
                row.style(highlight())
            } else {
                row
            }
        });

    let header = Row::new(vec!["Name", "Exercises", "Timed", "Last trained"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    Table::new(
        rows,
        [
            Constraint::Min(8),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(28),
        ],
    )
    .header(header)
    .block(block)
    .render(area, buf);
}

pub fn render_routine_view(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(routine) = app.selected_routine() else {
        return;
    };

    let title = format!(
        " {} · {} exercises · {} timed ",
        truncate(&routine.name, area.width.saturating_sub(40) as usize),
        routine.len(),
        format_human(routine.timed_secs())
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, bold().fg(Color::Cyan)));

    if routine.is_empty() {
        Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled("This routine has no exercises.", dim())),
            Line::from(Span::styled("Press (a) to add one.", dim())),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(app.selected_exercise, visible);
    let rows = routine
        .exercises
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, exercise)| {
            let kind = if exercise.is_timed() {
                ExerciseKind::Timed
            } else {
                ExerciseKind::Reps
            };
            let row = Row::new(vec![
                Cell::from(format!("{}.", i + 1)),
                Cell::from(exercise.name().to_string()),
                Cell::from(kind.to_string()),
                Cell::from(exercise.target_label()),
            ]);
            if i == app.selected_exercise {
                row.style(highlight())
            } else {
                row
            }
        });

    let header = Row::new(vec!["#", "Exercise", "Type", "Target"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(12),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block)
    .render(area, buf);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let value_style = if focused {
        highlight()
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{label:>7}: "), bold()),
        Span::styled(value, value_style),
    ])
}

pub fn render_form(form: &ExerciseForm, area: Rect, buf: &mut Buffer) {
    let popup = centered(50, 9, area);
    let title = if form.editing.is_some() {
        " Edit exercise "
    } else {
        " Add exercise "
    };

    let (value_label, hint) = match form.kind {
        ExerciseKind::Timed => ("Length", "HH:MM:SS"),
        ExerciseKind::Reps => ("Reps", "whole number"),
    };
    let cursor = |field: FormField, text: &str| {
        if form.focus == field {
            format!("{text}_")
        } else {
            text.to_string()
        }
    };

    let lines = vec![
        field_line(
            "Name",
            cursor(FormField::Name, &form.name),
            form.focus == FormField::Name,
        ),
        field_line(
            "Type",
            format!("< {} >", form.kind),
            form.focus == FormField::Kind,
        ),
        field_line(
            value_label,
            cursor(FormField::Value, &form.value),
            form.focus == FormField::Value,
        ),
        Line::default(),
        Line::from(Span::styled(format!("{value_label} as {hint}"), dim())),
        Line::from(Span::styled(
            "(tab) next field (enter) save (esc) cancel",
            dim().add_modifier(Modifier::ITALIC),
        )),
    ];

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .render(popup, buf);
}

pub fn render_name_prompt(name: &str, area: Rect, buf: &mut Buffer) {
    let popup = centered(44, 5, area);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(vec![Span::styled("Name: ", bold()), Span::raw(format!("{name}_"))]),
        Line::from(Span::styled(
            "(enter) create (esc) cancel",
            dim().add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" New routine "))
    .render(popup, buf);
}

pub fn render_confirm_delete(name: &str, area: Rect, buf: &mut Buffer) {
    let popup = centered(44, 4, area);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(truncate(name, 24), bold().fg(Color::Red)),
            Span::raw("?"),
        ]),
        Line::from(Span::styled("(y)es / any other key cancels", dim())),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Confirm "))
    .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppState, Mode};
    use crate::ui::test_support::{app_with, render, sample_routine};
    use routiner::exercise::Exercise;

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 0);
    }

    #[test]
    fn test_routine_list_rows() {
        let (mut app, _dir) = app_with(vec![sample_routine()]);
        app.state = AppState::Routines;
        let text = render(&app, 100, 20);
        assert!(text.contains("Morning Workout"));
        assert!(text.contains("1min"));
        assert!(text.contains("never"));
    }

    #[test]
    fn test_empty_routine_list_hint() {
        let (mut app, _dir) = app_with(vec![]);
        app.state = AppState::Routines;
        assert!(render(&app, 80, 20).contains("No routines yet."));
    }

    #[test]
    fn test_routine_view_lists_exercises() {
        let (mut app, _dir) = app_with(vec![sample_routine()]);
        app.state = AppState::RoutineView;
        let text = render(&app, 80, 20);
        assert!(text.contains("Plank"));
        assert!(text.contains("Duration"));
        assert!(text.contains("15 times"));
    }

    #[test]
    fn test_form_overlay() {
        let (mut app, _dir) = app_with(vec![sample_routine()]);
        app.state = AppState::RoutineView;
        app.mode = Mode::EditingExercise(ExerciseForm::edit(1, &Exercise::reps("Push-ups", 15)));
        let text = render(&app, 80, 24);
        assert!(text.contains("Edit exercise"));
        assert!(text.contains("< Repetitions >"));
        assert!(text.contains("Push-ups_"));
    }

    #[test]
    fn test_name_prompt_overlay() {
        let (mut app, _dir) = app_with(vec![]);
        app.mode = Mode::NamingRoutine("Eve".to_string());
        assert!(render(&app, 80, 24).contains("Name: Eve_"));
    }
}
