use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};
use crate::ui::{editor, panels, training};

/// A UI Screen boundary: renders one app state and names its keys
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
    /// Key hints for the footer
    fn help(&self, app: &App) -> &'static str;
}

pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        panels::render_home(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "(r)outines (n)ew routine (s)ettings (h)istory (q)uit"
    }
}

pub struct RoutinesScreen;

impl Screen for RoutinesScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        editor::render_routines(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "↑/↓ select (enter) open (t)rain (n)ew (d)elete (esc) back"
    }
}

pub struct RoutineViewScreen;

impl Screen for RoutineViewScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        editor::render_routine_view(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "(a)dd (e)dit (d)elete K/J up/down T/B top/bottom (t)rain (esc) back"
    }
}

pub struct TrainingScreen;

impl Screen for TrainingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(session) = &app.session {
            training::render_training(session, area, buf);
        }
    }

    fn help(&self, app: &App) -> &'static str {
        match &app.session {
            Some(session) if session.is_in_break() => {
                "(space) start/stop (r)eset (s)kip break (esc) abandon"
            }
            _ => "(space) start/stop (r)eset (f)inished (s)kip (esc) abandon",
        }
    }
}

pub struct FinishedScreen;

impl Screen for FinishedScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(session) = &app.session {
            training::render_finished(session, &app.celebration, area, buf);
        }
    }

    fn help(&self, _app: &App) -> &'static str {
        "(enter) back to routine"
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        panels::render_settings(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "↑/↓ select (space) toggle ←/→ ±1s -/+ ±10s (s)ave (R)eset (esc) cancel"
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        panels::render_history(app, area, buf);
    }

    fn help(&self, _app: &App) -> &'static str {
        "↑/↓ scroll (esc) back"
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Home => Box::new(HomeScreen),
        AppState::Routines => Box::new(RoutinesScreen),
        AppState::RoutineView => Box::new(RoutineViewScreen),
        AppState::Training => Box::new(TrainingScreen),
        AppState::Finished => Box::new(FinishedScreen),
        AppState::Settings => Box::new(SettingsScreen),
        AppState::History => Box::new(HistoryScreen),
    }
}
