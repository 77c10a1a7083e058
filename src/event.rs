//! Menu event handling.

use crate::engine::TimerEngine;
use crate::menu::{
    self, MenuItems, ID_AUTO_BREAKS_TOGGLE, ID_AUTO_WORK_TOGGLE, ID_NOTIF_TOGGLE, ID_PAUSE,
    ID_QUIT, ID_RESET, ID_RESET_STATS, ID_SHOW_TIMER_TOGGLE, ID_SKIP, ID_SOUND_TOGGLE, ID_START,
};
use crate::models::Settings;
use crate::timer::TickScheduler;
use muda::MenuEvent;

/// Result of handling a menu event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event handled, nothing to redraw.
    Continue,
    /// User requested quit.
    Quit,
    /// Timer or stats changed, menu and title need update.
    StateChanged,
}

/// A user action, decoded from a menu item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Skip,
    ResetStats,
    Quit,
    ToggleAutoBreaks,
    ToggleAutoWork,
    ToggleSound,
    ToggleNotifications,
    ToggleShowTimer,
    SetWorkDuration(u32),
    SetShortBreak(u32),
    SetLongBreak(u32),
    SetSessionsBeforeLongBreak(u32),
}

impl Command {
    /// Decodes a menu item id. Unknown ids yield `None`.
    pub fn parse(id: &str) -> Option<Self> {
        let command = match id {
            ID_START => Self::Start,
            ID_PAUSE => Self::Pause,
            ID_RESET => Self::Reset,
            ID_SKIP => Self::Skip,
            ID_RESET_STATS => Self::ResetStats,
            ID_QUIT => Self::Quit,
            ID_AUTO_BREAKS_TOGGLE => Self::ToggleAutoBreaks,
            ID_AUTO_WORK_TOGGLE => Self::ToggleAutoWork,
            ID_SOUND_TOGGLE => Self::ToggleSound,
            ID_NOTIF_TOGGLE => Self::ToggleNotifications,
            ID_SHOW_TIMER_TOGGLE => Self::ToggleShowTimer,
            _ => return parse_choice(id),
        };
        Some(command)
    }
}

/// Decodes `<prefix>_<number>` ids from the duration submenus.
fn parse_choice(id: &str) -> Option<Command> {
    let (prefix, value) = id.split_once('_')?;
    let value: u32 = value.parse().ok()?;
    match prefix {
        "work" => Some(Command::SetWorkDuration(value)),
        "short" => Some(Command::SetShortBreak(value)),
        "long" => Some(Command::SetLongBreak(value)),
        "cycle" => Some(Command::SetSessionsBeforeLongBreak(value)),
        _ => None,
    }
}

/// Applies a command to the engine. Returns what the UI has to refresh.
pub fn apply_command<T: TickScheduler>(engine: &mut TimerEngine<T>, command: Command) -> EventResult {
    match command {
        Command::Start => engine.start_timer(),
        Command::Pause => engine.pause_timer(),
        Command::Reset => engine.reset_timer(),
        Command::Skip => engine.skip_session(),
        Command::ResetStats => engine.reset_daily_stats(),
        Command::Quit => return EventResult::Quit,
        _ => {
            let mut settings = engine.settings().clone();
            edit_settings(&mut settings, command);
            engine.update_settings(settings);
        }
    }
    EventResult::StateChanged
}

fn edit_settings(settings: &mut Settings, command: Command) {
    match command {
        Command::ToggleAutoBreaks => settings.auto_start_breaks = !settings.auto_start_breaks,
        Command::ToggleAutoWork => settings.auto_start_work = !settings.auto_start_work,
        Command::ToggleSound => settings.sound_enabled = !settings.sound_enabled,
        Command::ToggleNotifications => {
            settings.notifications_enabled = !settings.notifications_enabled
        }
        Command::ToggleShowTimer => {
            settings.show_timer_in_menu_bar = !settings.show_timer_in_menu_bar
        }
        Command::SetWorkDuration(mins) => settings.work_duration = mins,
        Command::SetShortBreak(mins) => settings.short_break_duration = mins,
        Command::SetLongBreak(mins) => settings.long_break_duration = mins,
        Command::SetSessionsBeforeLongBreak(count) => settings.sessions_before_long_break = count,
        Command::Start
        | Command::Pause
        | Command::Reset
        | Command::Skip
        | Command::ResetStats
        | Command::Quit => {}
    }
}

/// Handles a menu event and keeps the settings checkmarks in sync.
pub fn handle_menu_event<T: TickScheduler>(
    engine: &mut TimerEngine<T>,
    items: &MenuItems,
    event: MenuEvent,
) -> EventResult {
    let Some(command) = Command::parse(event.id().as_ref()) else {
        return EventResult::Continue;
    };

    let result = apply_command(engine, command);

    let settings = engine.settings();
    items.toggles.sync(settings);
    menu::check_only(&items.work_checks, settings.work_duration);
    menu::check_only(&items.short_checks, settings.short_break_duration);
    menu::check_only(&items.long_checks, settings.long_break_duration);
    menu::check_only(&items.cycle_checks, settings.sessions_before_long_break);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!(Command::parse(ID_START), Some(Command::Start));
        assert_eq!(Command::parse(ID_PAUSE), Some(Command::Pause));
        assert_eq!(Command::parse(ID_SKIP), Some(Command::Skip));
        assert_eq!(Command::parse(ID_QUIT), Some(Command::Quit));
        assert_eq!(
            Command::parse(ID_SHOW_TIMER_TOGGLE),
            Some(Command::ToggleShowTimer)
        );
    }

    #[test]
    fn test_parse_choices() {
        assert_eq!(Command::parse("work_45"), Some(Command::SetWorkDuration(45)));
        assert_eq!(Command::parse("short_3"), Some(Command::SetShortBreak(3)));
        assert_eq!(Command::parse("long_30"), Some(Command::SetLongBreak(30)));
        assert_eq!(
            Command::parse("cycle_6"),
            Some(Command::SetSessionsBeforeLongBreak(6))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Command::parse("status"), None);
        assert_eq!(Command::parse("work_abc"), None);
        assert_eq!(Command::parse("volume_5"), None);
    }

    #[test]
    fn test_edit_settings() {
        let mut settings = Settings::default();
        edit_settings(&mut settings, Command::ToggleAutoBreaks);
        edit_settings(&mut settings, Command::ToggleSound);
        edit_settings(&mut settings, Command::SetLongBreak(20));
        assert!(settings.auto_start_breaks);
        assert!(!settings.sound_enabled);
        assert_eq!(settings.long_break_duration, 20);

        let before = settings.clone();
        edit_settings(&mut settings, Command::Skip);
        assert_eq!(settings, before);
    }
}
