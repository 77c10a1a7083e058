//! Menu building and updating for the tray dropdown.

use crate::engine::TimerEngine;
use crate::models::{format_minutes, DailyStats, SessionType, Settings, TimerState};
use crate::timer::TickScheduler;
use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::collections::HashMap;
use thiserror::Error;

// Menu item IDs as constants
pub const ID_STATUS: &str = "status";
pub const ID_PROGRESS: &str = "progress";
pub const ID_CYCLE: &str = "cycle";
pub const ID_STATS: &str = "stats";
pub const ID_START: &str = "start";
pub const ID_PAUSE: &str = "pause";
pub const ID_RESET: &str = "reset";
pub const ID_SKIP: &str = "skip";
pub const ID_AUTO_BREAKS_TOGGLE: &str = "auto_breaks_toggle";
pub const ID_AUTO_WORK_TOGGLE: &str = "auto_work_toggle";
pub const ID_SOUND_TOGGLE: &str = "sound_toggle";
pub const ID_NOTIF_TOGGLE: &str = "notif_toggle";
pub const ID_SHOW_TIMER_TOGGLE: &str = "show_timer_toggle";
pub const ID_RESET_STATS: &str = "reset_stats";
pub const ID_QUIT: &str = "quit";

/// Choices offered in the duration submenus; all within the valid ranges.
pub const WORK_CHOICES: [u32; 6] = [15, 20, 25, 30, 45, 60];
pub const SHORT_BREAK_CHOICES: [u32; 4] = [3, 5, 10, 15];
pub const LONG_BREAK_CHOICES: [u32; 4] = [10, 15, 20, 30];
pub const CYCLE_CHOICES: [u32; 6] = [2, 3, 4, 5, 6, 8];

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu error: {0}")]
    Muda(#[from] muda::Error),
}

/// Everything the menu and tray title render, read from the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: TimerState,
    pub session: SessionType,
    pub remaining_secs: u32,
    pub progress: f64,
    pub cycle_text: String,
    pub completed: u32,
    pub stats: DailyStats,
    pub show_timer: bool,
}

impl Snapshot {
    pub fn of<T: TickScheduler>(engine: &TimerEngine<T>) -> Self {
        Self {
            state: engine.state(),
            session: engine.session_type(),
            remaining_secs: engine.remaining_secs(),
            progress: engine.progress_fraction(),
            cycle_text: engine.session_progress_text(),
            completed: engine.completed_work_sessions(),
            stats: engine.daily_stats().clone(),
            show_timer: engine.settings().show_timer_in_menu_bar,
        }
    }
}

/// Holds references to menu items that need dynamic updates.
pub struct MenuItems {
    pub status: MenuItem,
    pub progress: MenuItem,
    pub cycle: MenuItem,
    pub stats: MenuItem,
    pub start: MenuItem,
    pub pause: MenuItem,
    pub toggles: SettingsToggles,
    pub work_checks: HashMap<u32, CheckMenuItem>,
    pub short_checks: HashMap<u32, CheckMenuItem>,
    pub long_checks: HashMap<u32, CheckMenuItem>,
    pub cycle_checks: HashMap<u32, CheckMenuItem>,
}

/// Checkbox items mirroring the boolean settings.
pub struct SettingsToggles {
    pub auto_breaks: CheckMenuItem,
    pub auto_work: CheckMenuItem,
    pub sound: CheckMenuItem,
    pub notifications: CheckMenuItem,
    pub show_timer: CheckMenuItem,
}

impl SettingsToggles {
    /// Re-syncs every checkbox with the settings.
    pub fn sync(&self, settings: &Settings) {
        self.auto_breaks.set_checked(settings.auto_start_breaks);
        self.auto_work.set_checked(settings.auto_start_work);
        self.sound.set_checked(settings.sound_enabled);
        self.notifications.set_checked(settings.notifications_enabled);
        self.show_timer.set_checked(settings.show_timer_in_menu_bar);
    }
}

fn info_item(id: &str, text: String) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, false, None::<Accelerator>)
}

fn action_item(id: &str, text: &str, enabled: bool) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, enabled, None::<Accelerator>)
}

fn toggle_item(id: &str, text: &str, checked: bool) -> CheckMenuItem {
    CheckMenuItem::with_id(MenuId::new(id), text, true, checked, None::<Accelerator>)
}

/// Builds the complete menu structure.
pub fn build_menu(snapshot: &Snapshot, settings: &Settings) -> Result<(Menu, MenuItems), MenuError> {
    let menu = Menu::new();

    let status = info_item(ID_STATUS, format_status(snapshot));
    let progress = info_item(ID_PROGRESS, format_progress(snapshot));
    let cycle = info_item(ID_CYCLE, format_cycle(snapshot));
    menu.append(&status)?;
    menu.append(&progress)?;
    menu.append(&cycle)?;

    menu.append(&PredefinedMenuItem::separator())?;

    let stats = info_item(ID_STATS, format_stats(&snapshot.stats));
    menu.append(&stats)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Control buttons
    let start = action_item(
        ID_START,
        start_label(snapshot.state),
        snapshot.state != TimerState::Running,
    );
    let pause = action_item(ID_PAUSE, "⏸  Pause", snapshot.state == TimerState::Running);
    let reset = action_item(ID_RESET, "↺  Reset", true);
    let skip = action_item(ID_SKIP, "⏭  Skip", true);
    menu.append(&start)?;
    menu.append(&pause)?;
    menu.append(&reset)?;
    menu.append(&skip)?;

    menu.append(&PredefinedMenuItem::separator())?;

    let (settings_menu, checks, toggles) = build_settings_submenu(settings)?;
    menu.append(&settings_menu)?;

    menu.append(&PredefinedMenuItem::separator())?;

    let quit = action_item(ID_QUIT, "Quit JustPomo", true);
    menu.append(&quit)?;

    let [work_checks, short_checks, long_checks, cycle_checks] = checks;
    let items = MenuItems {
        status,
        progress,
        cycle,
        stats,
        start,
        pause,
        toggles,
        work_checks,
        short_checks,
        long_checks,
        cycle_checks,
    };

    Ok((menu, items))
}

/// Appends a submenu of mutually exclusive numeric choices.
fn choice_submenu(
    parent: &Submenu,
    title: String,
    prefix: &str,
    unit: &str,
    choices: &[u32],
    current: u32,
) -> Result<HashMap<u32, CheckMenuItem>, MenuError> {
    let sub = Submenu::new(title, true);
    let mut checks = HashMap::new();
    for &value in choices {
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}_{}", prefix, value)),
            format!("{} {}", value, unit),
            true,
            value == current,
            None::<Accelerator>,
        );
        sub.append(&item)?;
        checks.insert(value, item);
    }
    parent.append(&sub)?;
    Ok(checks)
}

type SettingsSubmenuResult = (Submenu, [HashMap<u32, CheckMenuItem>; 4], SettingsToggles);

fn build_settings_submenu(settings: &Settings) -> Result<SettingsSubmenuResult, MenuError> {
    let submenu = Submenu::new("⚙  Settings", true);

    let work_checks = choice_submenu(
        &submenu,
        format!("Work: {} min", settings.work_duration),
        "work",
        "min",
        &WORK_CHOICES,
        settings.work_duration,
    )?;
    let short_checks = choice_submenu(
        &submenu,
        format!("Short Break: {} min", settings.short_break_duration),
        "short",
        "min",
        &SHORT_BREAK_CHOICES,
        settings.short_break_duration,
    )?;
    let long_checks = choice_submenu(
        &submenu,
        format!("Long Break: {} min", settings.long_break_duration),
        "long",
        "min",
        &LONG_BREAK_CHOICES,
        settings.long_break_duration,
    )?;
    let cycle_checks = choice_submenu(
        &submenu,
        format!(
            "Long Break After: {} sessions",
            settings.sessions_before_long_break
        ),
        "cycle",
        "sessions",
        &CYCLE_CHOICES,
        settings.sessions_before_long_break,
    )?;

    submenu.append(&PredefinedMenuItem::separator())?;

    let toggles = SettingsToggles {
        auto_breaks: toggle_item(
            ID_AUTO_BREAKS_TOGGLE,
            "Auto-start Breaks",
            settings.auto_start_breaks,
        ),
        auto_work: toggle_item(ID_AUTO_WORK_TOGGLE, "Auto-start Work", settings.auto_start_work),
        sound: toggle_item(ID_SOUND_TOGGLE, "Sound Enabled", settings.sound_enabled),
        notifications: toggle_item(
            ID_NOTIF_TOGGLE,
            "Notifications Enabled",
            settings.notifications_enabled,
        ),
        show_timer: toggle_item(
            ID_SHOW_TIMER_TOGGLE,
            "Show Timer in Menu Bar",
            settings.show_timer_in_menu_bar,
        ),
    };
    submenu.append(&toggles.auto_breaks)?;
    submenu.append(&toggles.auto_work)?;
    submenu.append(&toggles.sound)?;
    submenu.append(&toggles.notifications)?;
    submenu.append(&toggles.show_timer)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    let reset = action_item(ID_RESET_STATS, "Reset Today's Stats", true);
    submenu.append(&reset)?;

    Ok((
        submenu,
        [work_checks, short_checks, long_checks, cycle_checks],
        toggles,
    ))
}

/// Moves the checkmark in a choice submenu to `selected`.
pub fn check_only(checks: &HashMap<u32, CheckMenuItem>, selected: u32) {
    for (&value, check) in checks {
        check.set_checked(value == selected);
    }
}

/// Updates the menu items based on the current state.
pub fn update_menu_items(items: &MenuItems, snapshot: &Snapshot) {
    items.status.set_text(format_status(snapshot));
    items.progress.set_text(format_progress(snapshot));
    items.cycle.set_text(format_cycle(snapshot));
    items.stats.set_text(format_stats(&snapshot.stats));

    items.start.set_text(start_label(snapshot.state));
    items.start.set_enabled(snapshot.state != TimerState::Running);
    items.pause.set_enabled(snapshot.state == TimerState::Running);
}

fn start_label(state: TimerState) -> &'static str {
    match state {
        TimerState::Paused => "▶  Resume",
        TimerState::Idle | TimerState::Running => "▶  Start",
    }
}

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats the tray title: the session icon, plus the countdown while it
/// runs (or is paused) if enabled.
pub fn format_tray_title(snapshot: &Snapshot) -> String {
    let icon = snapshot.session.icon();
    if !snapshot.show_timer {
        return icon.to_string();
    }
    match snapshot.state {
        TimerState::Idle => icon.to_string(),
        TimerState::Running => format!("{} {}", icon, format_time(snapshot.remaining_secs)),
        TimerState::Paused => format!("⏸ {}", format_time(snapshot.remaining_secs)),
    }
}

/// Formats the status line for the menu.
pub fn format_status(snapshot: &Snapshot) -> String {
    let label = snapshot.session.label();
    let time = format_time(snapshot.remaining_secs);
    match snapshot.state {
        TimerState::Idle => format!("{}  {} - {} (ready)", snapshot.session.icon(), label, time),
        TimerState::Running => format!("⏱  {} - {} remaining", label, time),
        TimerState::Paused => format!("⏸  {} - {} (paused)", label, time),
    }
}

/// Formats the progress bar for the menu.
pub fn format_progress(snapshot: &Snapshot) -> String {
    let pct = snapshot.progress.clamp(0.0, 1.0);
    let filled = (pct * 20.0).round() as usize;
    let empty = 20 - filled;
    format!(
        "{}{}  {}%",
        "█".repeat(filled),
        "░".repeat(empty),
        (pct * 100.0).round() as u32
    )
}

/// Formats the position in the long-break cycle.
pub fn format_cycle(snapshot: &Snapshot) -> String {
    match snapshot.completed {
        0 => format!("Session {}", snapshot.cycle_text),
        n => format!("Session {}  ({} done)", snapshot.cycle_text, n),
    }
}

/// Formats the daily stats for the menu.
pub fn format_stats(stats: &DailyStats) -> String {
    if stats.total_minutes() == 0 {
        return "Today: —".to_string();
    }
    format!(
        "Today: Work {} · Break {}",
        format_minutes(stats.work_minutes),
        format_minutes(stats.break_minutes)
    )
}
