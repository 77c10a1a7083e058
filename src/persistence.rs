//! SQLite persistence layer for settings and daily stats.

use crate::models::{DailyStats, Settings};
use crate::services::{DailyStatsStore, SettingsStore, StoreError};
use chrono::NaiveDate;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "JUSTPOMO_DB";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid date in database: {0}")]
    Date(#[from] chrono::ParseError),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database at the default location, initializing tables if needed.
    pub fn new() -> Result<Self, DatabaseError> {
        Self::open(&Self::db_path())
    }

    /// Opens the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_stats (
                date TEXT PRIMARY KEY,
                work_minutes INTEGER NOT NULL DEFAULT 0,
                break_minutes INTEGER NOT NULL DEFAULT 0
            );
        "#,
        )?;
        Ok(())
    }

    /// Database location: `$JUSTPOMO_DB`, else the platform data directory.
    pub fn db_path() -> PathBuf {
        if let Some(path) = env::var_os(DB_PATH_ENV) {
            return PathBuf::from(path);
        }
        ProjectDirs::from("com", "justpomo", "JustPomo")
            .map(|dirs| dirs.data_dir().join("justpomo.db"))
            .unwrap_or_else(|| PathBuf::from("justpomo.db"))
    }

    /// Loads settings from the database, returning defaults if not found.
    pub fn load_settings(&self) -> Result<Settings, DatabaseError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = 'config'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(j) => Ok(serde_json::from_str::<Settings>(&j)?.clamped()),
            None => Ok(Settings::default()),
        }
    }

    /// Saves settings to the database.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(settings)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES ('config', ?)",
            [&json],
        )?;
        Ok(())
    }

    /// Loads the most recently tracked day, if any.
    pub fn load_latest_stats(&self) -> Result<Option<DailyStats>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT date, work_minutes, break_minutes
                 FROM daily_stats ORDER BY date DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((date, work_minutes, break_minutes)) => Ok(Some(DailyStats {
                work_minutes,
                break_minutes,
                last_tracked_date: date.parse::<NaiveDate>()?,
            })),
            None => Ok(None),
        }
    }

    /// Saves the stats under their tracked date.
    pub fn save_stats(&self, stats: &DailyStats) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO daily_stats (date, work_minutes, break_minutes)
             VALUES (?, ?, ?)",
            params![
                stats.last_tracked_date.to_string(),
                stats.work_minutes,
                stats.break_minutes,
            ],
        )?;
        Ok(())
    }

    /// Gets statistics for a specific date, zero if nothing was tracked.
    #[cfg(test)]
    pub fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats, DatabaseError> {
        let result = self
            .conn
            .query_row(
                "SELECT work_minutes, break_minutes FROM daily_stats WHERE date = ?",
                [date.to_string()],
                |row| {
                    Ok(DailyStats {
                        work_minutes: row.get(0)?,
                        break_minutes: row.get(1)?,
                        last_tracked_date: date,
                    })
                },
            )
            .optional()?;

        Ok(result.unwrap_or_else(|| DailyStats::zero(date)))
    }
}

impl SettingsStore for Database {
    fn load(&self) -> Result<Settings, StoreError> {
        Ok(self.load_settings()?)
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        Ok(self.save_settings(settings)?)
    }
}

impl DailyStatsStore for Database {
    fn load(&self) -> Result<Option<DailyStats>, StoreError> {
        Ok(self.load_latest_stats()?)
    }

    fn save(&self, stats: &DailyStats) -> Result<(), StoreError> {
        Ok(self.save_stats(stats)?)
    }
}
