pub mod editor;
pub mod panels;
pub mod screen;
pub mod training;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Mode};

const HORIZONTAL_MARGIN: u16 = 2;

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub(crate) fn highlight() -> Style {
    Style::default().fg(Color::Black).bg(Color::Cyan)
}

/// Cuts `text` to at most `max_width` terminal columns, marking the cut with `…`
pub(crate) fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// A `width` x `height` box in the middle of `area`, clamped to it
pub(crate) fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let screen = screen::current_screen(&self.state);
        screen.render(self, chunks[0], buf);

        let footer = match &self.status {
            Some(status) => Span::styled(
                truncate(status, chunks[1].width as usize),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(
                truncate(screen.help(self), chunks[1].width as usize),
                dim().add_modifier(Modifier::ITALIC),
            ),
        };
        Paragraph::new(footer).render(chunks[1], buf);

        match &self.mode {
            Mode::Normal => {}
            Mode::NamingRoutine(name) => editor::render_name_prompt(name, area, buf),
            Mode::EditingExercise(form) => editor::render_form(form, area, buf),
            Mode::ConfirmDelete => {
                if let Some(routine) = self.selected_routine() {
                    editor::render_confirm_delete(&routine.name, area, buf);
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
    use tempfile::TempDir;

    use crate::app::App;
    use routiner::config::FileConfigStore;
    use routiner::exercise::{Exercise, Routine};
    use routiner::history::HistoryDb;
    use routiner::sound::Silent;
    use routiner::store::{FileRoutineStore, RoutineStore};

    pub fn app_with(routines: Vec<Routine>) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRoutineStore::with_path(dir.path().join("routines.json"));
        store.save(&routines).unwrap();
        let app = App::new(
            Box::new(store),
            Box::new(FileConfigStore::with_path(dir.path().join("config.json"))),
            Some(HistoryDb::open_in_memory().unwrap()),
            Box::new(Silent),
        );
        (app, dir)
    }

    pub fn sample_routine() -> Routine {
        Routine::with_exercises(
            "Morning Workout",
            vec![Exercise::timed("Plank", 60), Exercise::reps("Push-ups", 15)],
        )
        .unwrap()
    }

    pub fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long routine name", 8), "a long …");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_centered_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(50, 50, area), area);
    }

    #[test]
    fn test_status_replaces_help_line() {
        let (mut app, _dir) = app_with(vec![]);
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("(q)uit"));

        app.status = Some("Settings saved".to_string());
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("Settings saved"));
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let (app, _dir) = app_with(vec![sample_routine()]);
        render(&app, 3, 2);
        render(&app, 1, 1);
    }
}
