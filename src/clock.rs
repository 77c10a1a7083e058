//! Session clock: the countdown state machine.
//!
//! The clock knows nothing about threads, storage or sound. It advances on
//! [`SessionClock::tick`], decides the next session when one completes and
//! reports what happened as a [`Completion`]; the engine applies the effects.

use crate::models::{SessionType, Settings, TimerState};

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// The session that just ended.
    pub finished: SessionType,
    /// Configured length of the finished session, credited to daily stats.
    pub credited_minutes: u32,
    /// The session now on the clock.
    pub next: SessionType,
    /// Whether `next` should start without user input.
    pub auto_start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    state: TimerState,
    session_type: SessionType,
    remaining_secs: u32,
    completed_work_sessions: u32,
}

impl SessionClock {
    /// An idle clock on a fresh work session.
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: TimerState::Idle,
            session_type: SessionType::Work,
            remaining_secs: settings.duration_secs(SessionType::Work),
            completed_work_sessions: 0,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Starts or resumes the countdown.
    ///
    /// Does nothing while already running. A session with no time left
    /// completes on the spot instead of running at zero.
    pub fn start(&mut self, settings: &Settings) -> Option<Completion> {
        if self.is_running() {
            return None;
        }
        if self.remaining_secs == 0 {
            return Some(self.complete(settings));
        }
        self.state = TimerState::Running;
        None
    }

    /// Suspends a running countdown. Returns false if nothing changed.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    /// Returns to idle with the full configured duration of the current session.
    pub fn reset(&mut self, settings: &Settings) {
        self.state = TimerState::Idle;
        self.remaining_secs = settings.duration_secs(self.session_type);
    }

    /// Advances the countdown by one second.
    ///
    /// Ignored unless running. Completes the session when the last second
    /// elapses, or immediately if none was left.
    pub fn tick(&mut self, settings: &Settings) -> Option<Completion> {
        if !self.is_running() {
            return None;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            if self.remaining_secs > 0 {
                return None;
            }
        }
        Some(self.complete(settings))
    }

    /// Ends the current session from any state and moves to the next one.
    pub fn complete(&mut self, settings: &Settings) -> Completion {
        let finished = self.session_type;
        let credited_minutes = settings.duration_mins(finished);

        if finished == SessionType::Work {
            self.completed_work_sessions += 1;
        }

        let next = self.next_session(settings);
        self.session_type = next;
        self.reset(settings);

        Completion {
            finished,
            credited_minutes,
            next,
            auto_start: settings.auto_starts(next),
        }
    }

    /// Picks the session that follows the current one.
    /// Must be called after the work counter has been updated.
    fn next_session(&self, settings: &Settings) -> SessionType {
        match self.session_type {
            SessionType::Work => {
                let done = self.completed_work_sessions;
                if done > 0 && done % settings.sessions_before_long_break == 0 {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Work,
        }
    }

    /// Picks up new durations when idle. A running or paused countdown keeps
    /// its length until the next reset or completion.
    pub fn apply_settings(&mut self, settings: &Settings) -> bool {
        if self.state != TimerState::Idle {
            return false;
        }
        self.remaining_secs = settings.duration_secs(self.session_type);
        true
    }

    /// Elapsed share of the current session, from 0.0 to 1.0.
    pub fn progress_fraction(&self, settings: &Settings) -> f64 {
        let total = settings.duration_secs(self.session_type);
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        f64::from(elapsed) / f64::from(total)
    }

    /// Position within the long-break cycle as `(current, total)`, 1-indexed.
    pub fn cycle_position(&self, settings: &Settings) -> (u32, u32) {
        let total = settings.sessions_before_long_break.max(1);
        ((self.completed_work_sessions % total) + 1, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_settings() -> Settings {
        Settings {
            work_duration: 1,
            short_break_duration: 1,
            long_break_duration: 2,
            ..Settings::default()
        }
    }

    #[test]
    fn test_new_clock_is_idle_work() {
        let settings = Settings::default();
        let clock = SessionClock::new(&settings);
        assert_eq!(clock.state(), TimerState::Idle);
        assert_eq!(clock.session_type(), SessionType::Work);
        assert_eq!(clock.remaining_secs(), 1500);
        assert_eq!(clock.completed_work_sessions(), 0);
    }

    #[test]
    fn test_start_pause_resume() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);

        assert!(clock.start(&settings).is_none());
        assert_eq!(clock.state(), TimerState::Running);

        for _ in 0..10 {
            clock.tick(&settings);
        }
        assert!(clock.pause());
        assert_eq!(clock.state(), TimerState::Paused);
        assert_eq!(clock.remaining_secs(), 1490);

        // Ticks while paused are ignored
        assert!(clock.tick(&settings).is_none());
        assert_eq!(clock.remaining_secs(), 1490);

        clock.start(&settings);
        assert_eq!(clock.state(), TimerState::Running);
        assert_eq!(clock.remaining_secs(), 1490);
    }

    #[test]
    fn test_start_is_noop_when_running() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        clock.start(&settings);
        clock.tick(&settings);
        let before = clock.clone();
        assert!(clock.start(&settings).is_none());
        assert_eq!(clock, before);
    }

    #[test]
    fn test_pause_is_noop_when_idle_or_paused() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        assert!(!clock.pause());
        assert_eq!(clock.state(), TimerState::Idle);

        clock.start(&settings);
        assert!(clock.pause());
        assert!(!clock.pause());
        assert_eq!(clock.state(), TimerState::Paused);
    }

    #[test]
    fn test_reset_restores_full_duration_for_every_session_type() {
        for work in [1, 25, 60] {
            for short in [1, 5, 15] {
                for long in [1, 15, 30] {
                    let settings = Settings {
                        work_duration: work,
                        short_break_duration: short,
                        long_break_duration: long,
                        sessions_before_long_break: 2,
                        ..Settings::default()
                    };
                    let mut clock = SessionClock::new(&settings);
                    // Work, then short break, then work, then long break
                    for _ in 0..4 {
                        clock.start(&settings);
                        clock.tick(&settings);
                        clock.reset(&settings);
                        assert_eq!(clock.state(), TimerState::Idle);
                        assert_eq!(
                            clock.remaining_secs(),
                            settings.duration_mins(clock.session_type()) * 60
                        );
                        clock.complete(&settings);
                    }
                }
            }
        }
    }

    #[test]
    fn test_reset_keeps_session_and_count() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        clock.complete(&settings);
        clock.start(&settings);
        clock.tick(&settings);
        clock.reset(&settings);
        assert_eq!(clock.session_type(), SessionType::ShortBreak);
        assert_eq!(clock.completed_work_sessions(), 1);
        assert_eq!(clock.remaining_secs(), 300);
    }

    #[test]
    fn test_exhausting_ticks_completes_exactly_once() {
        let settings = short_settings();
        let mut clock = SessionClock::new(&settings);
        clock.start(&settings);

        let ticks = clock.remaining_secs();
        let completions: Vec<Completion> =
            (0..ticks).filter_map(|_| clock.tick(&settings)).collect();

        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].finished, SessionType::Work);
        assert_eq!(completions[0].next, SessionType::ShortBreak);
        assert_eq!(clock.state(), TimerState::Idle);

        // The clock stopped; further ticks do nothing
        assert!(clock.tick(&settings).is_none());
    }

    #[test]
    fn test_completion_resets_to_next_session() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        let done = clock.complete(&settings);
        assert_eq!(
            done,
            Completion {
                finished: SessionType::Work,
                credited_minutes: 25,
                next: SessionType::ShortBreak,
                auto_start: false,
            }
        );
        assert_eq!(clock.remaining_secs(), 300);
        assert_eq!(clock.state(), TimerState::Idle);
    }

    #[test]
    fn test_long_break_every_fourth_work_session() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);

        let mut breaks = Vec::new();
        for _ in 0..5 {
            let work = clock.complete(&settings);
            assert_eq!(work.finished, SessionType::Work);
            breaks.push(work.next);
            let rest = clock.complete(&settings);
            assert_eq!(rest.next, SessionType::Work);
        }

        assert_eq!(
            breaks,
            vec![
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::LongBreak,
                SessionType::ShortBreak,
            ]
        );
        assert_eq!(clock.completed_work_sessions(), 5);
    }

    #[test]
    fn test_breaks_do_not_count_as_work_sessions() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        clock.complete(&settings);
        clock.complete(&settings);
        assert_eq!(clock.completed_work_sessions(), 1);
        assert_eq!(clock.session_type(), SessionType::Work);
    }

    #[test]
    fn test_skip_matches_natural_exhaustion() {
        let settings = short_settings();
        let mut natural = SessionClock::new(&settings);
        natural.start(&settings);
        let mut ticked = None;
        while ticked.is_none() {
            ticked = natural.tick(&settings);
        }

        let setups: [fn(&mut SessionClock, &Settings); 3] = [
            |_, _| {},
            |c, s| {
                c.start(s);
            },
            |c, s| {
                c.start(s);
                c.tick(s);
                c.pause();
            },
        ];
        for setup in setups {
            let mut skipped = SessionClock::new(&settings);
            setup(&mut skipped, &settings);
            let done = skipped.complete(&settings);
            assert_eq!(Some(done), ticked);
            assert_eq!(skipped, natural);
        }
    }

    #[test]
    fn test_auto_start_flag_follows_destination() {
        let settings = Settings {
            auto_start_breaks: true,
            auto_start_work: false,
            ..Settings::default()
        };
        let mut clock = SessionClock::new(&settings);
        assert!(clock.complete(&settings).auto_start);
        assert!(!clock.complete(&settings).auto_start);
    }

    #[test]
    fn test_start_with_zero_remaining_completes_immediately() {
        let settings = short_settings();
        let mut clock = SessionClock {
            state: TimerState::Paused,
            session_type: SessionType::Work,
            remaining_secs: 0,
            completed_work_sessions: 0,
        };
        let done = clock.start(&settings).expect("zero remaining should complete");
        assert_eq!(done.finished, SessionType::Work);
        assert_eq!(clock.state(), TimerState::Idle);
        assert_eq!(clock.session_type(), SessionType::ShortBreak);
        assert_eq!(clock.remaining_secs(), 60);
    }

    #[test]
    fn test_apply_settings_only_when_idle() {
        let settings = Settings::default();
        let longer = Settings {
            work_duration: 50,
            ..Settings::default()
        };

        let mut clock = SessionClock::new(&settings);
        assert!(clock.apply_settings(&longer));
        assert_eq!(clock.remaining_secs(), 3000);

        clock.start(&longer);
        clock.tick(&longer);
        assert!(!clock.apply_settings(&settings));
        assert_eq!(clock.remaining_secs(), 2999);

        clock.pause();
        assert!(!clock.apply_settings(&settings));
        assert_eq!(clock.remaining_secs(), 2999);
    }

    #[test]
    fn test_progress_fraction() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        assert_eq!(clock.progress_fraction(&settings), 0.0);

        clock.start(&settings);
        for _ in 0..600 {
            clock.tick(&settings);
        }
        assert!((clock.progress_fraction(&settings) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cycle_position() {
        let settings = Settings::default();
        let mut clock = SessionClock::new(&settings);
        assert_eq!(clock.cycle_position(&settings), (1, 4));

        for expected in [2, 3, 4, 1] {
            clock.complete(&settings); // work
            clock.complete(&settings); // break
            assert_eq!(clock.cycle_position(&settings), (expected, 4));
        }
    }
}
