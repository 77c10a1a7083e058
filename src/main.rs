//! JustPomo - a native menubar Pomodoro timer.
//!
//! Work and break sessions alternate automatically, with a long break after
//! a configurable number of work sessions and per-day time totals.

use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use log::{info, warn};
use muda::MenuEvent;
use thiserror::Error;
use tray_icon::{TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

mod audio;
mod clock;
mod engine;
mod event;
mod menu;
mod models;
mod notifications;
mod persistence;
mod services;
mod timer;

use audio::AudioPlayer;
use engine::TimerEngine;
use event::EventResult;
use menu::{MenuItems, Snapshot};
use notifications::DesktopNotifier;
use persistence::Database;
use services::{DailyStatsStore, Services, SettingsStore, Silent, SoundPlayer, Unpersisted};
use timer::{ThreadTicker, Tick};

/// How often the loop wakes to drain ticks and menu events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Tray error: {0}")]
    Tray(#[from] tray_icon::Error),
    #[error("Menu error: {0}")]
    Menu(#[from] menu::MenuError),
}

type Engine = TimerEngine<ThreadTicker>;

/// Application handler for the winit event loop. Owns the engine; every
/// command and tick is applied here, on the main thread.
struct JustPomo {
    engine: Engine,
    tray: TrayIcon,
    menu_items: MenuItems,
    tick_rx: Receiver<Tick>,
}

impl JustPomo {
    fn refresh(&self) {
        let snapshot = Snapshot::of(&self.engine);
        menu::update_menu_items(&self.menu_items, &snapshot);
        self.tray
            .set_title(Some(menu::format_tray_title(&snapshot)));
    }

    fn process_ticks(&mut self) -> bool {
        let mut changed = false;
        while let Ok(tick) = self.tick_rx.try_recv() {
            changed |= self.engine.handle_tick(tick);
        }
        changed
    }

    fn process_menu_events(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let mut changed = false;
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            match event::handle_menu_event(&mut self.engine, &self.menu_items, event) {
                EventResult::Quit => {
                    info!("Quitting");
                    event_loop.exit();
                    return changed;
                }
                EventResult::StateChanged => changed = true,
                EventResult::Continue => {}
            }
        }
        changed
    }
}

impl ApplicationHandler for JustPomo {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Nothing to do on resume for a tray-only app
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // No window events for a tray-only app
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));

        // Ticks first, so a command in the same batch sees the latest countdown
        let ticked = self.process_ticks();
        let commanded = self.process_menu_events(event_loop);

        if ticked || commanded {
            self.refresh();
        }
    }
}

fn build_services() -> Services {
    let sound: Box<dyn SoundPlayer> = match AudioPlayer::new() {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("Audio unavailable, sounds disabled: {}", e);
            Box::new(Silent)
        }
    };

    let (settings_store, stats_store): (Box<dyn SettingsStore>, Box<dyn DailyStatsStore>) =
        match Database::new() {
            Ok(db) => {
                let db = Rc::new(db);
                let settings_store: Box<dyn SettingsStore> = Box::new(Rc::clone(&db));
                (settings_store, Box::new(db) as Box<dyn DailyStatsStore>)
            }
            Err(e) => {
                warn!("Database unavailable, settings and stats won't persist: {}", e);
                (Box::new(Unpersisted), Box::new(Unpersisted))
            }
        };

    Services {
        settings_store,
        stats_store,
        notifier: Box::new(DesktopNotifier),
        sound,
    }
}

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Create event loop (required for tray on macOS)
    let event_loop = EventLoop::new()?;

    let (tick_tx, tick_rx) = mpsc::channel();
    let engine = TimerEngine::new(build_services(), ThreadTicker::new(tick_tx));

    let snapshot = Snapshot::of(&engine);
    let (built_menu, menu_items) = menu::build_menu(&snapshot, engine.settings())?;

    // No icon image, the title text carries the session glyph
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(built_menu))
        .with_title(menu::format_tray_title(&snapshot))
        .with_tooltip("JustPomo - Pomodoro Timer")
        .build()?;

    info!(
        "Ready: {} session, {}",
        engine.session_type().label(),
        engine.time_string()
    );

    let mut app = JustPomo {
        engine,
        tray,
        menu_items,
        tick_rx,
    };
    event_loop.run_app(&mut app)?;

    Ok(())
}
