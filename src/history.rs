use chrono::{DateTime, Local};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::session::Outcome;
use crate::timer::Clock;
use crate::training::TrainingSession;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS workouts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        routine_name TEXT NOT NULL,
        outcome TEXT NOT NULL,
        completed INTEGER NOT NULL,
        total INTEGER NOT NULL,
        skipped INTEGER NOT NULL,
        started_at TEXT NOT NULL,
        ended_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_workouts_routine ON workouts(routine_name);
    CREATE INDEX IF NOT EXISTS idx_workouts_started ON workouts(started_at);
"#;

/// One finished or abandoned training session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutRecord {
    pub routine_name: String,
    pub outcome: Outcome,
    pub completed: usize,
    pub total: usize,
    pub skipped: usize,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
}

impl WorkoutRecord {
    pub fn from_session<C: Clock + Clone>(
        session: &TrainingSession<C>,
        ended_at: DateTime<Local>,
    ) -> Self {
        Self {
            routine_name: session.routine_name().to_string(),
            outcome: session.outcome(),
            completed: session.completed(),
            total: session.total(),
            skipped: session.skipped(),
            started_at: session.started_at(),
            ended_at,
        }
    }

    /// Wall time spent in the session, in whole seconds
    pub fn duration_secs(&self) -> u64 {
        (self.ended_at - self.started_at).num_seconds().max(0) as u64
    }
}

/// Workout log backed by SQLite
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Opens (and creates if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(HistoryDb { conn })
    }

    pub fn record(&self, record: &WorkoutRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO workouts
            (routine_name, outcome, completed, total, skipped, started_at, ended_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.routine_name,
                record.outcome.to_string(),
                record.completed as i64,
                record.total as i64,
                record.skipped as i64,
                record.started_at.to_rfc3339(),
                record.ended_at.to_rfc3339(),
            ],
        )?;
        log::debug!(
            "recorded {} workout of '{}'",
            record.outcome,
            record.routine_name
        );
        Ok(())
    }

    /// Most recent workouts first
    pub fn recent(&self, limit: usize) -> Result<Vec<WorkoutRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT routine_name, outcome, completed, total, skipped, started_at, ended_at
            FROM workouts
            ORDER BY started_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], read_record)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    /// The latest workout of the named routine, if there is one
    pub fn last_for(&self, routine_name: &str) -> Result<Option<WorkoutRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT routine_name, outcome, completed, total, skipped, started_at, ended_at
            FROM workouts
            WHERE routine_name = ?1
            ORDER BY started_at DESC, id DESC
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map([routine_name], read_record)?;
        Ok(rows.next().transpose()?)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Writes every workout, oldest first, as CSV with a header row.
    /// Returns the number of workouts written.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut records = self.recent(usize::MAX >> 1)?;
        records.reverse();

        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        log::info!(
            "exported {} workouts to {}",
            records.len(),
            path.as_ref().display()
        );
        Ok(records.len())
    }
}

fn read_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Local>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn read_record(row: &Row) -> rusqlite::Result<WorkoutRecord> {
    let outcome: String = row.get(1)?;
    let outcome = outcome
        .parse::<Outcome>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(WorkoutRecord {
        routine_name: row.get(0)?,
        outcome,
        completed: row.get::<_, i64>(2)? as usize,
        total: row.get::<_, i64>(3)? as usize,
        skipped: row.get::<_, i64>(4)? as usize,
        started_at: read_timestamp(row, 5)?,
        ended_at: read_timestamp(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::exercise::{Exercise, Routine};
    use crate::session::SessionConfig;
    use crate::timer::ManualClock;
    use chrono::Duration;
    use tempfile::tempdir;

    fn record(name: &str, outcome: Outcome, minutes_ago: i64) -> WorkoutRecord {
        let started_at = Local::now() - Duration::minutes(minutes_ago);
        WorkoutRecord {
            routine_name: name.to_string(),
            outcome,
            completed: 3,
            total: 4,
            skipped: 1,
            started_at,
            ended_at: started_at + Duration::minutes(5),
        }
    }

    #[test]
    fn test_record_and_read_back() {
        let db = HistoryDb::open_in_memory().unwrap();
        let rec = record("Morning", Outcome::Abandoned, 10);
        db.record(&rec).unwrap();

        let recent = db.recent(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].routine_name, "Morning");
        assert_eq!(recent[0].outcome, Outcome::Abandoned);
        assert_eq!(recent[0].completed, 3);
        assert_eq!(recent[0].skipped, 1);
        assert_eq!(recent[0].started_at.timestamp(), rec.started_at.timestamp());
        assert_eq!(recent[0].duration_secs(), 300);
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record(&record("Old", Outcome::Finished, 300)).unwrap();
        db.record(&record("New", Outcome::Finished, 1)).unwrap();
        db.record(&record("Mid", Outcome::Finished, 60)).unwrap();

        let names: Vec<_> = db
            .recent(2)
            .unwrap()
            .into_iter()
            .map(|r| r.routine_name)
            .collect();
        assert_eq!(names, vec!["New", "Mid"]);
        assert_eq!(db.count().unwrap(), 3);
    }

    #[test]
    fn test_last_for_routine() {
        let db = HistoryDb::open_in_memory().unwrap();
        assert!(db.last_for("Morning").unwrap().is_none());

        db.record(&record("Morning", Outcome::Abandoned, 120)).unwrap();
        db.record(&record("Morning", Outcome::Finished, 30)).unwrap();
        db.record(&record("Evening", Outcome::Abandoned, 5)).unwrap();

        let last = db.last_for("Morning").unwrap().unwrap();
        assert_eq!(last.outcome, Outcome::Finished);
    }

    #[test]
    fn test_unknown_outcome_row_is_an_error() {
        let db = HistoryDb::open_in_memory().unwrap();
        let now = Local::now().to_rfc3339();
        db.conn
            .execute(
                "INSERT INTO workouts (routine_name, outcome, completed, total, skipped, started_at, ended_at)
                 VALUES ('Morning', 'quit', 1, 2, 0, ?1, ?1)",
                params![now],
            )
            .unwrap();

        let err = db.recent(10).unwrap_err();
        assert!(matches!(
            err,
            Error::Sqlite(rusqlite::Error::FromSqlConversionFailure(1, Type::Text, _))
        ));
    }

    #[test]
    fn test_record_from_finished_session() {
        let routine = Routine::with_exercises("Quick", vec![Exercise::reps("Dips", 8)]).unwrap();
        let (mut session, _) =
            TrainingSession::start_with_clock(routine, SessionConfig::default(), ManualClock::new())
                .unwrap();
        session.finish_exercise();

        let rec = WorkoutRecord::from_session(&session, Local::now());
        assert_eq!(rec.routine_name, "Quick");
        assert_eq!(rec.outcome, Outcome::Finished);
        assert_eq!((rec.completed, rec.total, rec.skipped), (1, 1, 0));
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("history.db");
        {
            let db = HistoryDb::open(&path).unwrap();
            db.record(&record("Morning", Outcome::Finished, 1)).unwrap();
        }
        let db = HistoryDb::open(&path).unwrap();
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("history.csv");
        let db = HistoryDb::open_in_memory().unwrap();
        db.record(&record("Second", Outcome::Abandoned, 1)).unwrap();
        db.record(&record("First", Outcome::Finished, 90)).unwrap();

        assert_eq!(db.export_csv(&out).unwrap(), 2);

        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("routine_name,outcome,completed,total,skipped"));
        assert!(lines[1].starts_with("First,finished,3,4,1,"));
        assert!(lines[2].starts_with("Second,abandoned,"));
    }
}
