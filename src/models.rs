//! Data models for the justpomo timer.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Valid work session lengths in minutes.
pub const WORK_DURATION_RANGE: RangeInclusive<u32> = 1..=60;
/// Valid short break lengths in minutes.
pub const SHORT_BREAK_RANGE: RangeInclusive<u32> = 1..=15;
/// Valid long break lengths in minutes.
pub const LONG_BREAK_RANGE: RangeInclusive<u32> = 1..=30;
/// Valid number of work sessions per long-break cycle.
pub const SESSIONS_BEFORE_LONG_BREAK_RANGE: RangeInclusive<u32> = 2..=8;

/// Lifecycle state of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// Not counting; ready to start the current session.
    #[default]
    Idle,
    /// Counting down, a tick source is armed.
    Running,
    /// Counting suspended, remaining time retained.
    Paused,
}

/// The kind of interval currently on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionType {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Menubar glyph for this session.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Work => "🍅",
            Self::ShortBreak => "☕",
            Self::LongBreak => "🛌",
        }
    }
}

/// User-configurable settings for the pomodoro timer.
///
/// Durations are in minutes. Values outside the valid ranges are clamped by
/// [`Settings::clamped`], which the engine applies on every load and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Duration of a work session in minutes.
    pub work_duration: u32,
    /// Duration of a short break in minutes.
    pub short_break_duration: u32,
    /// Duration of a long break in minutes.
    pub long_break_duration: u32,
    /// Number of completed work sessions between long breaks.
    pub sessions_before_long_break: u32,
    /// Start breaks automatically when a work session completes.
    pub auto_start_breaks: bool,
    /// Start work automatically when a break completes.
    pub auto_start_work: bool,
    /// Whether to play sounds.
    pub sound_enabled: bool,
    /// Whether to show system notifications.
    pub notifications_enabled: bool,
    /// Whether the countdown is shown next to the tray icon.
    pub show_timer_in_menu_bar: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_before_long_break: 4,
            auto_start_breaks: false,
            auto_start_work: false,
            sound_enabled: true,
            notifications_enabled: true,
            show_timer_in_menu_bar: true,
        }
    }
}

impl Settings {
    /// Returns a copy with every numeric field forced into its valid range.
    pub fn clamped(mut self) -> Self {
        self.work_duration = clamp_to(self.work_duration, &WORK_DURATION_RANGE);
        self.short_break_duration = clamp_to(self.short_break_duration, &SHORT_BREAK_RANGE);
        self.long_break_duration = clamp_to(self.long_break_duration, &LONG_BREAK_RANGE);
        self.sessions_before_long_break = clamp_to(
            self.sessions_before_long_break,
            &SESSIONS_BEFORE_LONG_BREAK_RANGE,
        );
        self
    }

    /// Configured length of the given session in minutes.
    pub fn duration_mins(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Configured length of the given session in seconds.
    pub fn duration_secs(&self, session: SessionType) -> u32 {
        self.duration_mins(session) * 60
    }

    /// Whether the session following a completion should start on its own.
    pub fn auto_starts(&self, next: SessionType) -> bool {
        match next {
            SessionType::Work => self.auto_start_work,
            SessionType::ShortBreak | SessionType::LongBreak => self.auto_start_breaks,
        }
    }
}

fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Minutes spent in work and breaks on a single calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStats {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub last_tracked_date: NaiveDate,
}

impl DailyStats {
    /// Empty stats stamped with the given date.
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            work_minutes: 0,
            break_minutes: 0,
            last_tracked_date: date,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.work_minutes + self.break_minutes
    }

    pub fn is_from(&self, today: NaiveDate) -> bool {
        self.last_tracked_date == today
    }

    /// Zeroes the counters if they belong to another day.
    /// Returns true when a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.is_from(today) {
            return false;
        }
        *self = Self::zero(today);
        true
    }

    /// Credits minutes for a finished session to the matching bucket.
    pub fn credit(&mut self, session: SessionType, minutes: u32, today: NaiveDate) {
        self.roll_over(today);
        match session {
            SessionType::Work => self.work_minutes += minutes,
            SessionType::ShortBreak | SessionType::LongBreak => self.break_minutes += minutes,
        }
    }
}

/// The current local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Formats a minute count as `"1h 5m"`, or `"25m"` below an hour.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
