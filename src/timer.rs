//! Resumable countdown driven by external ticks.
//!
//! The timer has no thread of its own. The runtime calls [`CountdownTimer::on_tick`]
//! at a fixed rate and the timer recomputes its remaining time from the wall
//! clock, so missed or late ticks never drift the countdown.
//!
//! Every `start`, `stop` and `reset` bumps a generation counter. A scheduled
//! tick that carries an older [`TickToken`] is ignored, which keeps a tick
//! that was queued before a stop from touching the timer afterwards.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time, so a
/// session and both of its timers can be advanced together from a test.
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimerEvent {
    Started,
    /// Display update, emitted on every tick while running
    Tick { remaining: f64 },
    Stopped { remaining: f64 },
    /// Fired once per run that counts all the way down
    Ended,
}

/// Identifies one run of a timer. Obtained while the timer is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken(u64);

#[derive(Debug, Clone)]
pub struct CountdownTimer<C: Clock = SystemClock> {
    clock: C,
    total: f64,
    remaining: f64,
    running: bool,
    started_at: Option<Instant>,
    remaining_at_start: f64,
    generation: u64,
}

impl<C: Clock> CountdownTimer<C> {
    pub fn new(total_secs: f64, clock: C) -> Self {
        let total = total_secs.max(0.0);
        Self {
            clock,
            total,
            remaining: total,
            running: false,
            started_at: None,
            remaining_at_start: total,
            generation: 0,
        }
    }

    pub fn total_secs(&self) -> f64 {
        self.total
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Counted all the way down and not restarted since
    pub fn has_ended(&self) -> bool {
        !self.running && self.remaining <= 0.0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token for the current run, `None` while idle
    pub fn token(&self) -> Option<TickToken> {
        self.running.then_some(TickToken(self.generation))
    }

    /// 0.0 at the start of the countdown, 1.0 once it has run out
    pub fn elapsed_fraction(&self) -> f64 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.total).clamp(0.0, 1.0)
    }

    fn compute_remaining(&self) -> f64 {
        match self.started_at {
            Some(started_at) => {
                let elapsed = self
                    .clock
                    .now()
                    .saturating_duration_since(started_at)
                    .as_secs_f64();
                (self.remaining_at_start - elapsed).max(0.0)
            }
            None => self.remaining,
        }
    }

    /// Starts or resumes the countdown from the current remaining time.
    /// Calling it on a running timer changes nothing.
    pub fn start(&mut self) -> Vec<TimerEvent> {
        if self.running {
            return vec![];
        }
        self.running = true;
        self.started_at = Some(self.clock.now());
        self.remaining_at_start = self.remaining;
        self.generation += 1;
        log::debug!(
            "timer started with {:.2}s left (gen {})",
            self.remaining,
            self.generation
        );
        vec![TimerEvent::Started]
    }

    /// Freezes the countdown. Calling it on an idle timer changes nothing.
    pub fn stop(&mut self) -> Vec<TimerEvent> {
        if !self.running {
            return vec![];
        }
        self.remaining = self.compute_remaining();
        self.halt();
        log::debug!("timer stopped with {:.2}s left", self.remaining);
        vec![TimerEvent::Stopped {
            remaining: self.remaining,
        }]
    }

    /// Stops the timer and rewinds it, to `new_total` when given (which also
    /// becomes the new total) or to the current total otherwise. Never ends.
    pub fn reset(&mut self, new_total: Option<f64>) {
        if let Some(total) = new_total {
            self.total = total.max(0.0);
        }
        self.remaining = self.total;
        self.halt();
    }

    /// Changes the length of an idle timer. Returns false, leaving the timer
    /// untouched, while it is running.
    pub fn change_duration(&mut self, new_total: f64) -> bool {
        if self.running {
            log::warn!("ignoring duration change on a running timer");
            return false;
        }
        self.total = new_total.max(0.0);
        self.remaining = self.total;
        true
    }

    /// Advances the run identified by `token`. Stale tokens are ignored.
    pub fn tick(&mut self, token: TickToken) -> Vec<TimerEvent> {
        if !self.running || token.0 != self.generation {
            return vec![];
        }

        self.remaining = self.compute_remaining();
        let mut events = vec![TimerEvent::Tick {
            remaining: self.remaining,
        }];

        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.halt();
            log::debug!("timer ended");
            events.push(TimerEvent::Ended);
        }
        events
    }

    /// Advances the current run, if any
    pub fn on_tick(&mut self) -> Vec<TimerEvent> {
        match self.token() {
            Some(token) => self.tick(token),
            None => vec![],
        }
    }

    fn halt(&mut self) {
        self.running = false;
        self.started_at = None;
        self.remaining_at_start = self.remaining;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(total: f64) -> (CountdownTimer<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (CountdownTimer::new(total, clock.clone()), clock)
    }

    fn ended_count(events: &[TimerEvent]) -> usize {
        events.iter().filter(|e| **e == TimerEvent::Ended).count()
    }

    #[test]
    fn test_new_timer_is_idle() {
        let (timer, _) = timer(5.0);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 5.0);
        assert_eq!(timer.total_secs(), 5.0);
        assert!(timer.token().is_none());
        assert!(!timer.has_ended());
    }

    #[test]
    fn test_runs_down_and_ends_once() {
        let (mut timer, clock) = timer(5.0);
        assert_eq!(timer.start(), vec![TimerEvent::Started]);

        let mut events = vec![];
        for _ in 0..10 {
            clock.advance_secs(1.0);
            events.extend(timer.on_tick());
        }

        assert_eq!(ended_count(&events), 1);
        assert_eq!(timer.remaining_secs(), 0.0);
        assert!(!timer.is_running());
        assert!(timer.has_ended());
    }

    #[test]
    fn test_tick_reports_remaining() {
        let (mut timer, clock) = timer(5.0);
        timer.start();
        clock.advance_secs(1.5);
        assert_eq!(timer.on_tick(), vec![TimerEvent::Tick { remaining: 3.5 }]);
    }

    #[test]
    fn test_large_jump_ends_in_one_tick() {
        let (mut timer, clock) = timer(5.0);
        timer.start();
        clock.advance_secs(60.0);
        assert_eq!(
            timer.on_tick(),
            vec![TimerEvent::Tick { remaining: 0.0 }, TimerEvent::Ended]
        );
    }

    #[test]
    fn test_stop_then_start_resumes() {
        let (mut timer, clock) = timer(5.0);
        timer.start();
        clock.advance_secs(2.0);
        assert_eq!(timer.stop(), vec![TimerEvent::Stopped { remaining: 3.0 }]);

        // time passing while stopped does not count
        clock.advance_secs(10.0);
        assert_eq!(timer.remaining_secs(), 3.0);

        timer.start();
        clock.advance_secs(1.0);
        timer.on_tick();
        assert_eq!(timer.remaining_secs(), 2.0);
    }

    #[test]
    fn test_double_start_does_not_double_subtract() {
        let (mut timer, clock) = timer(5.0);
        timer.start();
        clock.advance_secs(1.0);
        assert!(timer.start().is_empty());
        clock.advance_secs(1.0);
        timer.on_tick();
        assert_eq!(timer.remaining_secs(), 3.0);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (mut timer, _) = timer(5.0);
        let generation = timer.generation();
        assert!(timer.stop().is_empty());
        assert_eq!(timer.generation(), generation);
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let (mut timer, clock) = timer(5.0);
        timer.start();
        let stale = timer.token().unwrap();
        timer.stop();
        timer.start();

        clock.advance_secs(10.0);
        assert!(timer.tick(stale).is_empty());
        assert!(timer.is_running());

        let fresh = timer.token().unwrap();
        assert_eq!(ended_count(&timer.tick(fresh)), 1);
    }

    #[test]
    fn test_tick_after_stop_is_noop() {
        let (mut timer, clock) = timer(1.0);
        timer.start();
        let token = timer.token().unwrap();
        timer.stop();
        clock.advance_secs(5.0);
        assert!(timer.tick(token).is_empty());
        assert!(timer.on_tick().is_empty());
        assert!(!timer.has_ended());
    }

    #[test]
    fn test_reset_rewinds_without_ending() {
        let (mut timer, clock) = timer(5.0);
        timer.start();
        clock.advance_secs(4.0);
        timer.on_tick();
        timer.reset(None);
        assert_eq!(timer.remaining_secs(), 5.0);
        assert!(!timer.is_running());

        timer.reset(Some(8.0));
        assert_eq!(timer.total_secs(), 8.0);
        assert_eq!(timer.remaining_secs(), 8.0);
    }

    #[test]
    fn test_change_duration_only_when_idle() {
        let (mut timer, _) = timer(5.0);
        assert!(timer.change_duration(30.0));
        assert_eq!(timer.remaining_secs(), 30.0);

        timer.start();
        assert!(!timer.change_duration(2.0));
        assert_eq!(timer.total_secs(), 30.0);
    }

    #[test]
    fn test_zero_length_timer_ends_on_first_tick() {
        let (mut timer, _) = timer(0.0);
        timer.start();
        assert_eq!(ended_count(&timer.on_tick()), 1);
        assert!(timer.on_tick().is_empty());
    }

    #[test]
    fn test_elapsed_fraction() {
        let (mut timer, clock) = timer(4.0);
        assert_eq!(timer.elapsed_fraction(), 0.0);
        timer.start();
        clock.advance_secs(1.0);
        timer.on_tick();
        assert_eq!(timer.elapsed_fraction(), 0.25);
    }
}
