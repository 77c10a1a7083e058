//! Interfaces the engine uses to reach storage, notifications and sound.

use crate::models::{DailyStats, SessionType, Settings};
use crate::persistence::DatabaseError;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Persists the user's settings.
pub trait SettingsStore {
    /// Returns the saved settings, or defaults when nothing was saved yet.
    fn load(&self) -> Result<Settings, StoreError>;
    fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// Persists the daily minute counters.
pub trait DailyStatsStore {
    /// Returns the most recently saved stats, if any.
    fn load(&self) -> Result<Option<DailyStats>, StoreError>;
    fn save(&self, stats: &DailyStats) -> Result<(), StoreError>;
}

/// Delivers desktop notifications. Calls return immediately; failures are
/// handled by the implementation.
pub trait NotificationSender {
    fn request_permission(&self);
    fn send_session_complete(&self, session: SessionType, sound_enabled: bool);
}

/// Plays feedback sounds without blocking the caller.
pub trait SoundPlayer {
    fn play_completion(&self);
    fn play_start(&self);
    fn play_pause(&self);
}

impl<S: SettingsStore + ?Sized> SettingsStore for Rc<S> {
    fn load(&self) -> Result<Settings, StoreError> {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        (**self).save(settings)
    }
}

impl<S: DailyStatsStore + ?Sized> DailyStatsStore for Rc<S> {
    fn load(&self) -> Result<Option<DailyStats>, StoreError> {
        (**self).load()
    }

    fn save(&self, stats: &DailyStats) -> Result<(), StoreError> {
        (**self).save(stats)
    }
}

/// Sound player used when no audio device is available.
pub struct Silent;

impl SoundPlayer for Silent {
    fn play_completion(&self) {}
    fn play_start(&self) {}
    fn play_pause(&self) {}
}

/// Stores that keep nothing, used when the database cannot be opened.
pub struct Unpersisted;

impl SettingsStore for Unpersisted {
    fn load(&self) -> Result<Settings, StoreError> {
        Ok(Settings::default())
    }

    fn save(&self, _settings: &Settings) -> Result<(), StoreError> {
        Ok(())
    }
}

impl DailyStatsStore for Unpersisted {
    fn load(&self) -> Result<Option<DailyStats>, StoreError> {
        Ok(None)
    }

    fn save(&self, _stats: &DailyStats) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Everything the engine talks to besides the clock and the ticker.
pub struct Services {
    pub settings_store: Box<dyn SettingsStore>,
    pub stats_store: Box<dyn DailyStatsStore>,
    pub notifier: Box<dyn NotificationSender>,
    pub sound: Box<dyn SoundPlayer>,
}
