//! The training session state machine.
//!
//! A session walks a routine's exercises once, front to back. Timed exercises
//! run an exercise countdown, repetition exercises wait for the user to say
//! they are done. After each completed exercise the session either finishes,
//! inserts a break, or moves straight on, depending on its [`SessionConfig`].
//!
//! ```text
//! AwaitingExercise <-> RunningExercise
//!        |                   |
//!        +---- completed ----+--> Finished (last exercise)
//!        |                   |
//!        v                   v
//!  AwaitingBreak   <->  RunningBreak --> next exercise
//! ```

use chrono::{DateTime, Local};

use crate::error::{Error, Result};
use crate::events::SessionEvent;
use crate::exercise::{Exercise, Routine};
use crate::progress::progress_percent;
use crate::session::{Outcome, Phase, SessionConfig};
use crate::timer::{Clock, CountdownTimer, SystemClock, TimerEvent};

#[derive(Debug)]
pub struct TrainingSession<C: Clock + Clone = SystemClock> {
    routine: Routine,
    config: SessionConfig,
    next_index: usize,
    current: Option<usize>,
    completed: usize,
    skipped: usize,
    phase: Phase,
    abandoned: bool,
    exercise_timer: CountdownTimer<C>,
    break_timer: CountdownTimer<C>,
    started_at: DateTime<Local>,
}

impl TrainingSession<SystemClock> {
    /// Starts a session on the wall clock. See [`TrainingSession::start_with_clock`].
    pub fn start(routine: Routine, config: SessionConfig) -> Result<(Self, Vec<SessionEvent>)> {
        Self::start_with_clock(routine, config, SystemClock)
    }
}

impl<C: Clock + Clone> TrainingSession<C> {
    /// Takes a snapshot of `routine` and shows its first exercise.
    /// Fails with [`Error::EmptyRoutine`] when there is nothing to train.
    pub fn start_with_clock(
        routine: Routine,
        config: SessionConfig,
        clock: C,
    ) -> Result<(Self, Vec<SessionEvent>)> {
        if routine.is_empty() {
            return Err(Error::EmptyRoutine);
        }

        log::info!(
            "starting session '{}' with {} exercises",
            routine.name,
            routine.len()
        );

        let break_secs = config.break_duration_secs as f64;
        let mut session = Self {
            routine,
            config,
            next_index: 0,
            current: None,
            completed: 0,
            skipped: 0,
            phase: Phase::AwaitingExercise,
            abandoned: false,
            exercise_timer: CountdownTimer::new(0.0, clock.clone()),
            break_timer: CountdownTimer::new(break_secs, clock),
            started_at: Local::now(),
        };

        let mut events = vec![SessionEvent::ProgressUpdated(0)];
        session.show_next_exercise(&mut events);
        Ok((session, events))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn routine_name(&self) -> &str {
        &self.routine.name
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_break(&self) -> bool {
        self.phase.is_break()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_finished() {
            Outcome::Finished
        } else {
            Outcome::Abandoned
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn total(&self) -> usize {
        self.routine.len()
    }

    pub fn progress(&self) -> u8 {
        progress_percent(self.completed, self.total())
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The exercise on screen, or the one just completed while in a break
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.current.and_then(|idx| self.routine.exercises.get(idx))
    }

    /// The exercise that comes after the current one
    pub fn upcoming_exercise(&self) -> Option<&Exercise> {
        self.routine.exercises.get(self.next_index)
    }

    pub fn exercise_timer(&self) -> &CountdownTimer<C> {
        &self.exercise_timer
    }

    pub fn break_timer(&self) -> &CountdownTimer<C> {
        &self.break_timer
    }

    /// The timer the current phase is driven by, if any
    pub fn active_timer(&self) -> Option<&CountdownTimer<C>> {
        match self.phase {
            Phase::AwaitingBreak | Phase::RunningBreak => Some(&self.break_timer),
            Phase::AwaitingExercise | Phase::RunningExercise
                if self.current_exercise().is_some_and(Exercise::is_timed) =>
            {
                Some(&self.exercise_timer)
            }
            _ => None,
        }
    }

    fn accepts_input(&self) -> bool {
        !self.abandoned && self.phase != Phase::Finished
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advances whichever timer is running. Completes the exercise or ends
    /// the break when its countdown runs out.
    pub fn on_tick(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_input() {
            return vec![];
        }

        let mut events = vec![];
        match self.phase {
            Phase::RunningExercise => {
                let ended = push_timer_events(&mut events, self.exercise_timer.on_tick());
                if ended {
                    self.complete_current(false, &mut events);
                }
            }
            Phase::RunningBreak => {
                let ended = push_timer_events(&mut events, self.break_timer.on_tick());
                if ended {
                    self.choose_next_action(&mut events);
                }
            }
            _ => {}
        }
        events
    }

    /// Manual completion of a repetition exercise
    pub fn finish_exercise(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_input() || self.is_in_break() {
            return vec![];
        }
        if !matches!(self.current_exercise(), Some(Exercise::RepCount { .. })) {
            return vec![];
        }

        let mut events = vec![];
        self.complete_current(false, &mut events);
        events
    }

    /// Outside a break: counts the current exercise as done without waiting
    /// for it. During a break: cuts the break short.
    pub fn skip(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_input() {
            return vec![];
        }

        let mut events = vec![];
        if self.is_in_break() {
            log::debug!("skipping break");
            self.break_timer.stop();
            self.leave_break(&mut events);
        } else {
            log::debug!("skipping exercise {:?}", self.current);
            self.complete_current(true, &mut events);
        }
        events
    }

    /// Starts the current phase's timer if it is waiting
    pub fn start_timer(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_input() {
            return vec![];
        }

        let mut events = vec![];
        match self.phase {
            Phase::AwaitingExercise if self.active_timer().is_some() => {
                push_timer_events(&mut events, self.exercise_timer.start());
                self.phase = Phase::RunningExercise;
            }
            Phase::AwaitingBreak => {
                push_timer_events(&mut events, self.break_timer.start());
                self.phase = Phase::RunningBreak;
            }
            _ => {}
        }
        events
    }

    /// Pauses the current phase's timer if it is running
    pub fn stop_timer(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_input() {
            return vec![];
        }

        let mut events = vec![];
        match self.phase {
            Phase::RunningExercise => {
                push_timer_events(&mut events, self.exercise_timer.stop());
                self.phase = Phase::AwaitingExercise;
            }
            Phase::RunningBreak => {
                push_timer_events(&mut events, self.break_timer.stop());
                self.phase = Phase::AwaitingBreak;
            }
            _ => {}
        }
        events
    }

    pub fn toggle_timer(&mut self) -> Vec<SessionEvent> {
        if self.phase.is_running() {
            self.stop_timer()
        } else {
            self.start_timer()
        }
    }

    /// Rewinds the current phase's timer to its full length and leaves it idle
    pub fn reset_timer(&mut self) {
        if !self.accepts_input() {
            return;
        }

        match self.phase {
            Phase::AwaitingBreak | Phase::RunningBreak => {
                self.break_timer.reset(None);
                self.phase = Phase::AwaitingBreak;
            }
            Phase::AwaitingExercise | Phase::RunningExercise if self.active_timer().is_some() => {
                self.exercise_timer.reset(None);
                self.phase = Phase::AwaitingExercise;
            }
            _ => {}
        }
    }

    /// Stops every timer so no later tick can move the session. Used when
    /// the user walks away from a session before it finishes.
    pub fn abandon(&mut self) {
        if self.abandoned {
            return;
        }
        self.exercise_timer.stop();
        self.break_timer.stop();
        self.abandoned = true;
        if !self.is_finished() {
            log::info!(
                "session '{}' abandoned at {}/{}",
                self.routine.name,
                self.completed,
                self.total()
            );
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn complete_current(&mut self, skipped: bool, events: &mut Vec<SessionEvent>) {
        if self.completed >= self.total() {
            return;
        }
        self.completed += 1;
        if skipped {
            self.skipped += 1;
        }
        self.exercise_timer.stop();
        self.choose_next_action(events);
    }

    fn choose_next_action(&mut self, events: &mut Vec<SessionEvent>) {
        if self.completed >= self.total() {
            self.finish(events);
        } else if self.config.show_breaks {
            if self.is_in_break() {
                self.leave_break(events);
            } else {
                self.begin_break(events);
            }
        } else {
            events.push(SessionEvent::ProgressUpdated(self.progress()));
            self.show_next_exercise(events);
        }
    }

    fn begin_break(&mut self, events: &mut Vec<SessionEvent>) {
        events.push(SessionEvent::ProgressUpdated(self.progress()));

        let duration_secs = self.config.break_duration_secs;
        self.break_timer.reset(Some(duration_secs as f64));
        self.phase = Phase::AwaitingBreak;
        events.push(SessionEvent::BreakStarted { duration_secs });

        if self.config.auto_start_breaks {
            push_timer_events(events, self.break_timer.start());
            self.phase = Phase::RunningBreak;
        }
    }

    fn leave_break(&mut self, events: &mut Vec<SessionEvent>) {
        events.push(SessionEvent::BreakEnded);
        self.show_next_exercise(events);
    }

    fn show_next_exercise(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(exercise) = self.routine.exercises.get(self.next_index).cloned() else {
            // every shown exercise is completed before the next one is pulled
            self.finish(events);
            return;
        };

        let index = self.next_index;
        self.next_index += 1;
        self.current = Some(index);
        self.phase = Phase::AwaitingExercise;
        log::debug!("showing exercise {} '{}'", index, exercise.name());

        let auto_start = match &exercise {
            Exercise::Timed { duration_secs, .. } => {
                self.exercise_timer.reset(Some(*duration_secs as f64));
                self.config.auto_start_exercises
            }
            Exercise::RepCount { .. } => {
                self.exercise_timer.reset(Some(0.0));
                false
            }
        };

        events.push(SessionEvent::ExerciseChanged { exercise, index });

        if auto_start {
            push_timer_events(events, self.exercise_timer.start());
            self.phase = Phase::RunningExercise;
        }
    }

    fn finish(&mut self, events: &mut Vec<SessionEvent>) {
        self.exercise_timer.stop();
        self.break_timer.stop();
        self.phase = Phase::Finished;
        log::info!(
            "session '{}' finished ({} skipped)",
            self.routine.name,
            self.skipped
        );
        events.push(SessionEvent::ProgressUpdated(100));
        events.push(SessionEvent::SessionFinished {
            routine_name: self.routine.name.clone(),
        });
    }
}

/// Translates timer events into session events. Returns whether the timer ended.
fn push_timer_events(events: &mut Vec<SessionEvent>, timer_events: Vec<TimerEvent>) -> bool {
    let mut ended = false;
    for event in timer_events {
        events.push(match event {
            TimerEvent::Started => SessionEvent::TimerStarted,
            TimerEvent::Tick { remaining } => SessionEvent::TimerTick(remaining),
            TimerEvent::Stopped { remaining } => SessionEvent::TimerStopped(remaining),
            TimerEvent::Ended => {
                ended = true;
                SessionEvent::TimerEnded
            }
        });
    }
    ended
}
