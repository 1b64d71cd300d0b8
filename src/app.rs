use std::collections::HashMap;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use routiner::celebration::Celebration;
use routiner::config::{ConfigStore, Settings};
use routiner::error::{Error, Result};
use routiner::events::SessionEvent;
use routiner::exercise::{Exercise, Routine};
use routiner::history::{HistoryDb, WorkoutRecord};
use routiner::session::SessionConfig;
use routiner::sound::{play_for_events, SoundSink};
use routiner::store::{find_routine, RoutineStore};
use routiner::training::TrainingSession;
use routiner::util::{format_clock, parse_clock};

const HISTORY_LIMIT: usize = 50;
pub const SETTINGS_ROWS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Routines,
    RoutineView,
    Training,
    Finished,
    Settings,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ExerciseKind {
    #[strum(serialize = "Duration")]
    Timed,
    #[strum(serialize = "Repetitions")]
    Reps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Kind,
    Value,
}

/// Add/edit form for one exercise of the open routine
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseForm {
    /// Index being replaced, `None` when adding
    pub editing: Option<usize>,
    pub name: String,
    pub kind: ExerciseKind,
    pub value: String,
    pub focus: FormField,
}

impl ExerciseForm {
    pub fn blank() -> Self {
        Self {
            editing: None,
            name: String::new(),
            kind: ExerciseKind::Timed,
            value: Self::default_value(ExerciseKind::Timed),
            focus: FormField::Name,
        }
    }

    pub fn edit(idx: usize, exercise: &Exercise) -> Self {
        let (kind, value) = match exercise {
            Exercise::Timed { duration_secs, .. } => {
                (ExerciseKind::Timed, format_clock(*duration_secs))
            }
            Exercise::RepCount { repetitions, .. } => (ExerciseKind::Reps, repetitions.to_string()),
        };
        Self {
            editing: Some(idx),
            name: exercise.name().to_string(),
            kind,
            value,
            focus: FormField::Name,
        }
    }

    fn default_value(kind: ExerciseKind) -> String {
        match kind {
            ExerciseKind::Timed => "00:00:30".to_string(),
            ExerciseKind::Reps => "10".to_string(),
        }
    }

    fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            ExerciseKind::Timed => ExerciseKind::Reps,
            ExerciseKind::Reps => ExerciseKind::Timed,
        };
        self.value = Self::default_value(self.kind);
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Kind,
            FormField::Kind => FormField::Value,
            FormField::Value => FormField::Name,
        };
    }

    fn prev_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Value,
            FormField::Kind => FormField::Name,
            FormField::Value => FormField::Kind,
        };
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Value => Some(&mut self.value),
            FormField::Kind => None,
        }
    }

    pub fn to_exercise(&self) -> Result<Exercise> {
        let name = self.name.trim();
        let exercise = match self.kind {
            ExerciseKind::Timed => Exercise::timed(name, parse_clock(&self.value)?),
            ExerciseKind::Reps => {
                let reps = self
                    .value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidRepetitions(self.value.clone()))?;
                Exercise::reps(name, reps)
            }
        };
        exercise.validate()?;
        Ok(exercise)
    }
}

/// Input overlay on top of the current screen
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    NamingRoutine(String),
    EditingExercise(ExerciseForm),
    ConfirmDelete,
}

pub struct App {
    pub state: AppState,
    pub mode: Mode,
    pub routines: Vec<Routine>,
    pub selected_routine: usize,
    pub selected_exercise: usize,
    pub settings: Settings,
    /// Settings screen edits, applied on save
    pub draft_settings: Settings,
    pub settings_cursor: usize,
    pub session: Option<TrainingSession>,
    pub celebration: Celebration,
    pub history_rows: Vec<WorkoutRecord>,
    pub history_scroll: usize,
    pub last_trained: HashMap<String, WorkoutRecord>,
    pub status: Option<String>,
    pub should_quit: bool,
    viewport: (u16, u16),
    routine_store: Box<dyn RoutineStore>,
    config_store: Box<dyn ConfigStore>,
    history: Option<HistoryDb>,
    sound: Box<dyn SoundSink>,
}

impl App {
    pub fn new(
        routine_store: Box<dyn RoutineStore>,
        config_store: Box<dyn ConfigStore>,
        history: Option<HistoryDb>,
        sound: Box<dyn SoundSink>,
    ) -> Self {
        let settings = config_store.load();
        let mut app = Self {
            state: AppState::Home,
            mode: Mode::Normal,
            routines: Vec::new(),
            selected_routine: 0,
            selected_exercise: 0,
            draft_settings: settings.clone(),
            settings,
            settings_cursor: 0,
            session: None,
            celebration: Celebration::new(),
            history_rows: Vec::new(),
            history_scroll: 0,
            last_trained: HashMap::new(),
            status: None,
            should_quit: false,
            viewport: (80, 24),
            routine_store,
            config_store,
            history,
            sound,
        };
        app.load_routines();
        app
    }

    pub fn load_routines(&mut self) {
        match self.routine_store.load() {
            Ok(routines) => self.routines = routines,
            Err(e) => {
                log::warn!("could not load routines: {e}");
                self.status = Some(format!("Could not load routines: {e}"));
                self.routines = Vec::new();
            }
        }
        self.selected_routine = 0;
        self.refresh_last_trained();
    }

    fn refresh_last_trained(&mut self) {
        let Some(db) = &self.history else {
            return;
        };
        self.last_trained.clear();
        for routine in &self.routines {
            match db.last_for(&routine.name) {
                Ok(Some(record)) => {
                    self.last_trained.insert(routine.name.clone(), record);
                }
                Ok(None) => {}
                Err(e) => log::warn!("could not read history for '{}': {e}", routine.name),
            }
        }
    }

    fn persist_routines(&mut self) {
        if let Err(e) = self.routine_store.save(&self.routines) {
            log::error!("could not save routines: {e}");
            self.status = Some(format!("Could not save routines: {e}"));
        }
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    pub fn selected_routine(&self) -> Option<&Routine> {
        self.routines.get(self.selected_routine)
    }

    fn selected_routine_mut(&mut self) -> Option<&mut Routine> {
        self.routines.get_mut(self.selected_routine)
    }

    /// Advances the running session and animation. Returns whether a redraw is due.
    pub fn on_tick(&mut self) -> bool {
        if let Some(session) = self.session.as_mut() {
            if self.state == AppState::Training {
                let events = session.on_tick();
                self.apply_session_events(events);
            }
        }
        if self.celebration.is_active {
            self.celebration.update();
            return true;
        }
        matches!(self.state, AppState::Training)
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            if self.state == AppState::Training {
                self.abandon_session();
            }
            self.should_quit = true;
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => {}
            Mode::NamingRoutine(buffer) => {
                self.on_naming_key(key, buffer);
                return;
            }
            Mode::EditingExercise(form) => {
                self.on_form_key(key, form);
                return;
            }
            Mode::ConfirmDelete => {
                if key.code == KeyCode::Char('y') {
                    self.delete_selected_routine();
                }
                return;
            }
        }

        self.status = None;
        match self.state {
            AppState::Home => self.on_home_key(key),
            AppState::Routines => self.on_routines_key(key),
            AppState::RoutineView => self.on_routine_view_key(key),
            AppState::Training => self.on_training_key(key),
            AppState::Finished => self.on_finished_key(key),
            AppState::Settings => self.on_settings_key(key),
            AppState::History => self.on_history_key(key),
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => self.state = AppState::Routines,
            KeyCode::Char('n') => self.mode = Mode::NamingRoutine(String::new()),
            KeyCode::Char('s') => {
                self.draft_settings = self.settings.clone();
                self.settings_cursor = 0;
                self.state = AppState::Settings;
            }
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn on_routines_key(&mut self, key: KeyEvent) {
        let count = self.routines.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_routine = self.selected_routine.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_routine + 1 < count {
                    self.selected_routine += 1;
                }
            }
            KeyCode::Enter => {
                if count > 0 {
                    self.selected_exercise = 0;
                    self.state = AppState::RoutineView;
                }
            }
            KeyCode::Char('n') => self.mode = Mode::NamingRoutine(String::new()),
            KeyCode::Char('d') if count > 0 => self.mode = Mode::ConfirmDelete,
            KeyCode::Char('t') => self.start_training(),
            KeyCode::Esc => self.state = AppState::Home,
            _ => {}
        }
    }

    fn on_routine_view_key(&mut self, key: KeyEvent) {
        let idx = self.selected_exercise;
        let len = self.selected_routine().map_or(0, Routine::len);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_exercise = idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if idx + 1 < len {
                    self.selected_exercise += 1;
                }
            }
            KeyCode::Char('a') => self.mode = Mode::EditingExercise(ExerciseForm::blank()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(exercise) = self.selected_routine().and_then(|r| r.exercises.get(idx)) {
                    self.mode = Mode::EditingExercise(ExerciseForm::edit(idx, exercise));
                }
            }
            KeyCode::Char('d') => {
                let removed = self
                    .selected_routine_mut()
                    .and_then(|r| r.remove_exercise(idx));
                if removed.is_some() {
                    self.selected_exercise = idx.min(len.saturating_sub(2));
                    self.persist_routines();
                }
            }
            KeyCode::Char('K') => self.reorder(idx, idx.saturating_sub(1), Routine::move_up),
            KeyCode::Char('J') => self.reorder(idx, idx + 1, Routine::move_down),
            KeyCode::Char('T') => self.reorder(idx, 0, Routine::move_to_top),
            KeyCode::Char('B') => self.reorder(idx, len.saturating_sub(1), Routine::move_to_bottom),
            KeyCode::Char('t') => self.start_training(),
            KeyCode::Esc => self.state = AppState::Routines,
            _ => {}
        }
    }

    fn reorder(&mut self, idx: usize, new_idx: usize, op: fn(&mut Routine, usize) -> bool) {
        let moved = self.selected_routine_mut().is_some_and(|r| op(r, idx));
        if moved {
            self.selected_exercise = new_idx;
            self.persist_routines();
        }
    }

    fn on_training_key(&mut self, key: KeyEvent) {
        let Some(session) = self.session.as_mut() else {
            self.state = AppState::RoutineView;
            return;
        };
        let events = match key.code {
            KeyCode::Char(' ') => session.toggle_timer(),
            KeyCode::Char('r') => {
                session.reset_timer();
                Vec::new()
            }
            KeyCode::Char('f') => session.finish_exercise(),
            KeyCode::Char('s') => session.skip(),
            KeyCode::Esc => {
                self.abandon_session();
                return;
            }
            _ => Vec::new(),
        };
        self.apply_session_events(events);
    }

    fn on_finished_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
            self.session = None;
            self.celebration = Celebration::new();
            self.state = AppState::RoutineView;
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        let draft = &mut self.draft_settings;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_cursor = self.settings_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_cursor = (self.settings_cursor + 1).min(SETTINGS_ROWS - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => match self.settings_cursor {
                0 => draft.show_breaks = !draft.show_breaks,
                1 => draft.auto_start_breaks = !draft.auto_start_breaks,
                2 => draft.auto_start_exercises = !draft.auto_start_exercises,
                _ => {}
            },
            KeyCode::Left if self.settings_cursor == 3 => draft.adjust_break_duration(-1),
            KeyCode::Right if self.settings_cursor == 3 => draft.adjust_break_duration(1),
            KeyCode::Char('-') => draft.adjust_break_duration(-10),
            KeyCode::Char('+') | KeyCode::Char('=') => draft.adjust_break_duration(10),
            KeyCode::Char('R') => draft.reset_to_defaults(),
            KeyCode::Char('s') => self.save_settings(),
            KeyCode::Esc => {
                self.draft_settings = self.settings.clone();
                self.state = AppState::Home;
            }
            _ => {}
        }
    }

    fn save_settings(&mut self) {
        match self.config_store.save(&self.draft_settings) {
            Ok(()) => {
                self.settings = self.draft_settings.clone();
                self.status = Some("Settings saved".to_string());
                self.state = AppState::Home;
            }
            Err(e) => {
                log::error!("could not save settings: {e}");
                self.status = Some(format!("Could not save settings: {e}"));
            }
        }
    }

    fn open_history(&mut self) {
        self.history_scroll = 0;
        self.history_rows = match &self.history {
            Some(db) => db.recent(HISTORY_LIMIT).unwrap_or_else(|e| {
                log::warn!("could not read history: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.state = AppState::History;
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.history_scroll + 1 < self.history_rows.len() {
                    self.history_scroll += 1;
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::Home,
            _ => {}
        }
    }

    fn on_naming_key(&mut self, key: KeyEvent, mut buffer: String) {
        match key.code {
            KeyCode::Char(c) => {
                buffer.push(c);
                self.mode = Mode::NamingRoutine(buffer);
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = Mode::NamingRoutine(buffer);
            }
            KeyCode::Enter => {
                if let Err(e) = self.create_routine(&buffer) {
                    self.status = Some(e.to_string());
                    self.mode = Mode::NamingRoutine(buffer);
                }
            }
            KeyCode::Esc => {}
            _ => self.mode = Mode::NamingRoutine(buffer),
        }
    }

    pub fn create_routine(&mut self, name: &str) -> Result<()> {
        let routine = Routine::new(name.trim())?;
        if find_routine(&self.routines, &routine.name).is_some() {
            return Err(Error::DuplicateRoutine(routine.name));
        }
        log::info!("created routine '{}'", routine.name);
        self.routines.push(routine);
        self.selected_routine = self.routines.len() - 1;
        self.selected_exercise = 0;
        self.state = AppState::RoutineView;
        self.status = None;
        self.persist_routines();
        Ok(())
    }

    fn delete_selected_routine(&mut self) {
        if self.selected_routine >= self.routines.len() {
            return;
        }
        let removed = self.routines.remove(self.selected_routine);
        log::info!("deleted routine '{}'", removed.name);
        self.selected_routine = self
            .selected_routine
            .min(self.routines.len().saturating_sub(1));
        self.persist_routines();
    }

    fn on_form_key(&mut self, key: KeyEvent, mut form: ExerciseForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                match form.to_exercise() {
                    Ok(exercise) => self.save_exercise(form.editing, exercise),
                    Err(e) => {
                        self.status = Some(e.to_string());
                        self.mode = Mode::EditingExercise(form);
                    }
                }
                return;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                if form.focus == FormField::Kind =>
            {
                form.toggle_kind()
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.focused_text() {
                    text.push(c);
                }
            }
            _ => {}
        }
        self.mode = Mode::EditingExercise(form);
    }

    fn save_exercise(&mut self, editing: Option<usize>, exercise: Exercise) {
        let Some(routine) = self.selected_routine_mut() else {
            return;
        };
        match editing {
            Some(idx) => {
                routine.replace_exercise(idx, exercise);
            }
            None => {
                routine.add_exercise(exercise);
                self.selected_exercise = routine.len() - 1;
            }
        }
        self.status = None;
        self.persist_routines();
    }

    pub fn start_routine_named(&mut self, name: &str) -> Result<()> {
        let idx = self
            .routines
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::UnknownRoutine(name.to_string()))?;
        self.selected_routine = idx;
        self.selected_exercise = 0;
        self.state = AppState::RoutineView;
        self.start_training();
        Ok(())
    }

    /// Starts a session on the selected routine with the saved settings
    pub fn start_training(&mut self) {
        let Some(routine) = self.selected_routine().cloned() else {
            return;
        };
        match TrainingSession::start(routine, SessionConfig::from(&self.settings)) {
            Ok((session, events)) => {
                self.session = Some(session);
                self.state = AppState::Training;
                self.apply_session_events(events);
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn apply_session_events(&mut self, events: Vec<SessionEvent>) {
        if events.is_empty() {
            return;
        }
        play_for_events(self.sound.as_ref(), &events);
        let finished = events
            .iter()
            .any(|e| matches!(e, SessionEvent::SessionFinished { .. }));
        if finished {
            self.record_session();
            let (width, height) = self.viewport;
            self.celebration.start(width, height);
            self.state = AppState::Finished;
        }
    }

    fn abandon_session(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.abandon();
            self.record_session();
        }
        self.session = None;
        self.state = AppState::RoutineView;
    }

    fn record_session(&mut self) {
        let (Some(db), Some(session)) = (&self.history, &self.session) else {
            return;
        };
        let record = WorkoutRecord::from_session(session, Local::now());
        match db.record(&record) {
            Ok(()) => {
                self.last_trained.insert(record.routine_name.clone(), record);
            }
            Err(e) => log::error!("could not record workout: {e}"),
        }
    }
}
