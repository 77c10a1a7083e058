//! System notifications for finished sessions.

use crate::models::SessionType;
use crate::services::NotificationSender;
use log::{debug, warn};
use notify_rust::Notification;
use std::thread;

/// Bundle identifier notifications are attributed to on macOS.
#[cfg(target_os = "macos")]
const BUNDLE_ID: &str = "com.justpomo.JustPomo";

/// Title and body shown when `session` completes.
pub fn completion_message(session: SessionType) -> (&'static str, &'static str) {
    match session {
        SessionType::Work => ("Work session complete!", "Time to take a break."),
        SessionType::ShortBreak => ("Break is over!", "Ready to get back to work?"),
        SessionType::LongBreak => (
            "Long break complete!",
            "You're refreshed and ready to focus.",
        ),
    }
}

/// Sends notifications through the desktop notification service.
/// Each notification is shown from a background thread to avoid blocking.
pub struct DesktopNotifier;

impl NotificationSender for DesktopNotifier {
    fn request_permission(&self) {
        #[cfg(target_os = "macos")]
        {
            if let Err(e) = notify_rust::set_application(BUNDLE_ID) {
                warn!("Failed to register notification sender: {}", e);
            }
        }
        debug!("Notifications ready");
    }

    fn send_session_complete(&self, session: SessionType, sound_enabled: bool) {
        thread::spawn(move || {
            let (summary, body) = completion_message(session);

            let mut notification = Notification::new();
            notification.summary(summary).body(body);
            if sound_enabled {
                notification.sound_name("default");
            }

            if let Err(e) = notification.show() {
                warn!("Failed to show notification: {}", e);
            }
        });
    }
}
