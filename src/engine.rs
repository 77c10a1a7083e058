//! Timer engine: owns the session clock and drives every side effect.

use crate::clock::{Completion, SessionClock};
use crate::models::{self, DailyStats, SessionType, Settings, TimerState};
use crate::services::Services;
use crate::timer::{Tick, TickScheduler};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Upper bound on sessions started automatically within one call.
pub const MAX_AUTO_CHAIN: u32 = 8;

/// The timer's single point of control.
///
/// All commands and ticks go through `&mut self`, so they are applied in the
/// order the event loop delivers them.
pub struct TimerEngine<T: TickScheduler> {
    clock: SessionClock,
    settings: Settings,
    stats: DailyStats,
    services: Services,
    ticker: T,
    /// Bumped on every arm/cancel; ticks from older epochs are discarded.
    epoch: u64,
    today: Box<dyn Fn() -> NaiveDate>,
}

impl<T: TickScheduler> TimerEngine<T> {
    /// Creates the engine, loading settings and stats from the stores.
    pub fn new(services: Services, ticker: T) -> Self {
        Self::with_date_source(services, ticker, Box::new(models::today))
    }

    /// Like [`TimerEngine::new`] with a custom source for the current day.
    pub fn with_date_source(
        services: Services,
        ticker: T,
        today: Box<dyn Fn() -> NaiveDate>,
    ) -> Self {
        let settings = match services.settings_store.load() {
            Ok(settings) => settings.clamped(),
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                Settings::default()
            }
        };

        let date = today();
        let stats = match services.stats_store.load() {
            Ok(Some(stats)) => stats,
            Ok(None) => DailyStats::zero(date),
            Err(e) => {
                warn!("Failed to load daily stats, starting from zero: {}", e);
                DailyStats::zero(date)
            }
        };

        services.notifier.request_permission();

        let mut engine = Self {
            clock: SessionClock::new(&settings),
            settings,
            stats,
            services,
            ticker,
            epoch: 0,
            today,
        };
        engine.roll_over_stats();
        engine
    }

    pub fn state(&self) -> TimerState {
        self.clock.state()
    }

    pub fn session_type(&self) -> SessionType {
        self.clock.session_type()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining_secs()
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.clock.completed_work_sessions()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn daily_stats(&self) -> &DailyStats {
        &self.stats
    }

    /// Elapsed share of the current session.
    pub fn progress_fraction(&self) -> f64 {
        self.clock.progress_fraction(&self.settings)
    }

    /// Position in the long-break cycle, e.g. `"2 of 4"`.
    pub fn session_progress_text(&self) -> String {
        let (current, total) = self.clock.cycle_position(&self.settings);
        format!("{} of {}", current, total)
    }

    /// Remaining time as `MM:SS`.
    pub fn time_string(&self) -> String {
        let secs = self.clock.remaining_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Starts or resumes the countdown. Does nothing while running.
    pub fn start_timer(&mut self) {
        if self.clock.is_running() {
            return;
        }
        self.roll_over_stats();
        match self.clock.start(&self.settings) {
            Some(done) => self.finish(done),
            None => {
                if self.settings.sound_enabled {
                    self.services.sound.play_start();
                }
                self.arm();
                debug!(
                    "Started {} with {}s left",
                    self.clock.session_type().label(),
                    self.clock.remaining_secs()
                );
            }
        }
    }

    /// Pauses a running countdown; idempotent otherwise.
    pub fn pause_timer(&mut self) {
        if !self.clock.pause() {
            return;
        }
        self.disarm();
        if self.settings.sound_enabled {
            self.services.sound.play_pause();
        }
        debug!("Paused with {}s left", self.clock.remaining_secs());
    }

    /// Stops the countdown and restores the full duration of the current session.
    pub fn reset_timer(&mut self) {
        self.disarm();
        self.clock.reset(&self.settings);
        debug!("Reset {} session", self.clock.session_type().label());
    }

    /// Ends the current session now, as if its time had run out.
    pub fn skip_session(&mut self) {
        self.disarm();
        let done = self.clock.complete(&self.settings);
        self.finish(done);
    }

    /// Applies a tick from the scheduler. Returns true if the clock changed.
    pub fn handle_tick(&mut self, tick: Tick) -> bool {
        if tick.epoch != self.epoch || !self.clock.is_running() {
            return false;
        }
        if let Some(done) = self.clock.tick(&self.settings) {
            self.disarm();
            self.finish(done);
        }
        true
    }

    /// Replaces the settings. An idle clock picks up the new duration at
    /// once; a running or paused countdown keeps its length.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings.clamped();
        if self.clock.apply_settings(&self.settings) {
            debug!("Idle clock now at {}s", self.clock.remaining_secs());
        }
        if let Err(e) = self.services.settings_store.save(&self.settings) {
            warn!("Failed to save settings: {}", e);
        }
    }

    /// Zeroes today's statistics regardless of the clock.
    pub fn reset_daily_stats(&mut self) {
        self.stats = DailyStats::zero((self.today)());
        self.save_stats();
        info!("Daily stats reset");
    }

    /// Applies the effects of a completion, then auto-starts successors for
    /// at most [`MAX_AUTO_CHAIN`] hops.
    fn finish(&mut self, first: Completion) {
        let mut pending = Some(first);
        let mut hops = 0;

        while let Some(done) = pending.take() {
            self.on_completed(&done);
            if !done.auto_start {
                break;
            }
            if hops == MAX_AUTO_CHAIN {
                warn!("Auto-start chain exceeded {} sessions, stopping", MAX_AUTO_CHAIN);
                break;
            }
            hops += 1;

            self.roll_over_stats();
            pending = self.clock.start(&self.settings);
            if pending.is_none() {
                self.arm();
                debug!("Auto-started {}", self.clock.session_type().label());
            }
        }
    }

    fn on_completed(&mut self, done: &Completion) {
        info!(
            "{} complete, next up: {}",
            done.finished.label(),
            done.next.label()
        );

        self.stats
            .credit(done.finished, done.credited_minutes, (self.today)());
        self.save_stats();

        if self.settings.sound_enabled {
            self.services.sound.play_completion();
        }
        if self.settings.notifications_enabled {
            self.services
                .notifier
                .send_session_complete(done.finished, self.settings.sound_enabled);
        }
    }

    fn roll_over_stats(&mut self) {
        if self.stats.roll_over((self.today)()) {
            info!("New day, daily stats rolled over");
            self.save_stats();
        }
    }

    fn save_stats(&self) {
        if let Err(e) = self.services.stats_store.save(&self.stats) {
            warn!("Failed to save daily stats: {}", e);
        }
    }

    fn arm(&mut self) {
        self.epoch += 1;
        self.ticker.schedule(self.epoch);
    }

    fn disarm(&mut self) {
        self.epoch += 1;
        self.ticker.cancel();
    }
}
