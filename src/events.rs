use crate::exercise::Exercise;

/// What a training session tells the presentation layer. Every session
/// operation returns the events it produced, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The active timer (exercise or break) began counting down
    TimerStarted,
    TimerTick(f64),
    TimerStopped(f64),
    /// The active timer counted all the way down
    TimerEnded,
    ExerciseChanged { exercise: Exercise, index: usize },
    BreakStarted { duration_secs: u64 },
    BreakEnded,
    ProgressUpdated(u8),
    /// Emitted once; the session accepts no further transitions
    SessionFinished { routine_name: String },
}

impl SessionEvent {
    /// Whether the screen needs a redraw beyond the regular tick
    pub fn changes_screen(&self) -> bool {
        !matches!(self, SessionEvent::TimerTick(_))
    }
}
