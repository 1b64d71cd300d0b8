use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Error, Result};

/// Preferences a training session runs with. Taken once when the session
/// starts; later settings changes do not reach a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub show_breaks: bool,
    pub auto_start_breaks: bool,
    pub auto_start_exercises: bool,
    pub break_duration_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::from(&Settings::default())
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            show_breaks: settings.show_breaks,
            auto_start_breaks: settings.auto_start_breaks,
            auto_start_exercises: settings.auto_start_exercises,
            break_duration_secs: settings.break_duration,
        }
    }
}

/// Where a training session is in its exercise/break cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    /// Exercise on screen, timer idle or no timer at all (rep exercises)
    AwaitingExercise,
    RunningExercise,
    AwaitingBreak,
    RunningBreak,
    Finished,
}

impl Phase {
    pub fn is_break(&self) -> bool {
        matches!(self, Phase::AwaitingBreak | Phase::RunningBreak)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Phase::RunningExercise | Phase::RunningBreak)
    }
}

/// How a session ended, as recorded in the workout history
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Finished,
    Abandoned,
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "finished" => Ok(Outcome::Finished),
            "abandoned" => Ok(Outcome::Abandoned),
            other => Err(Error::UnknownOutcome(other.to_string())),
        }
    }
}
