mod app;
mod ui;

use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
};

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use simplelog::{ConfigBuilder, WriteLogger};

use routiner::{
    app_dirs::AppDirs,
    config::FileConfigStore,
    history::HistoryDb,
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    sound::{Silent, SoundSink, SystemSound, TerminalBell},
    store::{FileRoutineStore, RoutineStore},
};

use crate::app::App;

/// workout routine tracker with guided training sessions
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal workout routine tracker: build routines of timed and repetition exercises, then train through them with countdowns, breaks and progress tracking."
)]
pub struct Cli {
    /// routines file to use instead of the default location
    #[clap(long)]
    routines: Option<PathBuf>,

    /// settings file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// workout history database to use instead of the default location
    #[clap(long)]
    history: Option<PathBuf>,

    /// start training the named routine right away
    #[clap(short = 'r', long)]
    routine: Option<String>,

    /// how timer starts and ends are announced
    #[clap(long, value_enum, default_value_t = SoundChoice::System)]
    sound: SoundChoice,

    /// milliseconds between screen refreshes
    #[clap(long, default_value_t = 16)]
    tick_rate_ms: u64,

    /// log verbosity written to the log file
    #[clap(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// write the workout history as CSV to this file and exit
    #[clap(long, value_name = "FILE")]
    export_history: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SoundChoice {
    System,
    Bell,
    Off,
}

impl SoundChoice {
    fn sink(&self) -> Box<dyn SoundSink> {
        match self {
            SoundChoice::System => Box::new(SystemSound),
            SoundChoice::Bell => Box::new(TerminalBell),
            SoundChoice::Off => Box::new(Silent),
        }
    }
}

impl Cli {
    fn routine_store(&self) -> FileRoutineStore {
        self.routines
            .as_ref()
            .map(FileRoutineStore::with_path)
            .unwrap_or_default()
    }

    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }

    fn history_path(&self) -> PathBuf {
        self.history.clone().unwrap_or_else(AppDirs::history_path)
    }
}

fn init_logging(level: LevelFilter) -> io::Result<()> {
    let path = AppDirs::log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    // a second init (tests) keeps the first logger
    let _ = WriteLogger::init(level, config, file);
    Ok(())
}

fn open_history(cli: &Cli) -> Option<HistoryDb> {
    match HistoryDb::open(cli.history_path()) {
        Ok(db) => Some(db),
        Err(e) => {
            log::error!("history disabled: {e}");
            None
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level) {
        eprintln!("logging disabled: {e}");
    }
    log::info!("routiner {} starting", env!("CARGO_PKG_VERSION"));

    if let Some(out) = &cli.export_history {
        let db = HistoryDb::open(cli.history_path())?;
        let written = db.export_csv(out)?;
        println!("exported {written} workouts to {}", out.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = cli.routine_store();
    if let Some(name) = &cli.routine {
        let routines = store.load()?;
        if routiner::store::find_routine(&routines, name).is_none() {
            return Err(routiner::Error::UnknownRoutine(name.clone()).into());
        }
    }

    let mut app = App::new(
        Box::new(store),
        Box::new(cli.config_store()),
        open_history(&cli),
        cli.sound.sink(),
    );
    if let Some(name) = &cli.routine {
        app.start_routine_named(name)?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::from_millis(cli.tick_rate_ms),
    );
    let result = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("exiting with error: {e}");
    }
    log::info!("routiner exiting");
    result
}

fn run<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    app.set_viewport(size.width, size.height);
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit {
        let redraw = match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.set_viewport(size.width, size.height);
                true
            }
            AppEvent::Key(key) => {
                app.on_key(key);
                true
            }
        };
        if redraw && !app.should_quit {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use routiner::runtime::TestEventSource;
    use std::sync::mpsc;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["routiner"]);

        assert_eq!(cli.routines, None);
        assert_eq!(cli.config, None);
        assert_eq!(cli.routine, None);
        assert_eq!(cli.sound, SoundChoice::System);
        assert_eq!(cli.tick_rate_ms, 16);
        assert_eq!(cli.log_level, LevelFilter::Info);
        assert_eq!(cli.export_history, None);
    }

    #[test]
    fn test_cli_paths_and_routine() {
        let cli = Cli::parse_from([
            "routiner",
            "--routines",
            "/tmp/r.json",
            "--config",
            "/tmp/c.json",
            "--history",
            "/tmp/h.db",
            "-r",
            "Morning",
        ]);
        assert_eq!(cli.routine_store().path(), std::path::Path::new("/tmp/r.json"));
        assert_eq!(cli.config_store().path(), std::path::Path::new("/tmp/c.json"));
        assert_eq!(cli.history_path(), PathBuf::from("/tmp/h.db"));
        assert_eq!(cli.routine.as_deref(), Some("Morning"));
    }

    #[test]
    fn test_cli_sound_and_log_level() {
        let cli = Cli::parse_from(["routiner", "--sound", "bell", "--log-level", "debug"]);
        assert_eq!(cli.sound, SoundChoice::Bell);
        assert_eq!(cli.log_level, LevelFilter::Debug);

        let cli = Cli::parse_from(["routiner", "--sound", "off"]);
        assert_eq!(cli.sound, SoundChoice::Off);
        assert!(Cli::try_parse_from(["routiner", "--sound", "loud"]).is_err());
    }

    #[test]
    fn test_sound_choice_display() {
        assert_eq!(SoundChoice::System.to_string(), "system");
        assert_eq!(SoundChoice::Bell.to_string(), "bell");
        assert_eq!(SoundChoice::Off.to_string(), "off");
    }

    #[test]
    fn test_default_paths_used_without_flags() {
        let cli = Cli::parse_from(["routiner"]);
        assert_eq!(cli.routine_store().path(), AppDirs::routines_path());
        assert_eq!(cli.history_path(), AppDirs::history_path());
    }

    #[test]
    fn test_run_loop_quits_on_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            Box::new(FileRoutineStore::with_path(dir.path().join("routines.json"))),
            Box::new(FileConfigStore::with_path(dir.path().join("config.json"))),
            Some(HistoryDb::open_in_memory().unwrap()),
            Box::new(Silent),
        );

        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE)))
            .unwrap();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
            .unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)))
            .unwrap();

        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::from_millis(1));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        run(&mut terminal, &mut app, &runner).unwrap();
        assert!(app.should_quit);
    }
}
