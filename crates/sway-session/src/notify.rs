//! Desktop notifications
//!
//! Notifications are best effort. The backend is chosen once at startup and a
//! failure to deliver is logged and otherwise ignored.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use sway_session_config::NotifierPreference;
use tracing::debug;

/// Something that can put a message in front of the user
pub trait Notifier {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Show a message; must not fail
    fn notify(&self, headline: &str, body: &str);
}

/// `dunstify --appname=<app> <headline> <body>`
#[derive(Debug, Clone)]
pub struct Dunstify {
    pub app_name: String,
}

impl Notifier for Dunstify {
    fn name(&self) -> &'static str {
        "dunstify"
    }

    fn notify(&self, headline: &str, body: &str) {
        let app_name = format!("--appname={}", self.app_name);
        spawn_detached("dunstify", &[app_name.as_str(), headline, body]);
    }
}

/// `notify-send <headline> <body>`
#[derive(Debug, Clone, Copy)]
pub struct NotifySend;

impl Notifier for NotifySend {
    fn name(&self) -> &'static str {
        "notify-send"
    }

    fn notify(&self, headline: &str, body: &str) {
        spawn_detached("notify-send", &[headline, body]);
    }
}

/// Drops every message; used when no backend is available
#[derive(Debug, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn name(&self) -> &'static str {
        "none"
    }

    fn notify(&self, headline: &str, body: &str) {
        debug!(headline, body, "Notification dropped, no backend available");
    }
}

fn spawn_detached(program: &str, args: &[&str]) {
    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if let Err(e) = result {
        debug!(program, error = %e, "Failed to send notification");
    }
}

/// Pick the notification backend for this run from `$PATH`
pub fn select_notifier(preference: NotifierPreference, app_name: &str) -> Box<dyn Notifier> {
    select_notifier_in(preference, app_name, std::env::var_os("PATH").as_deref())
}

/// Pick the preferred backend if its executable is on `path`, else the other one
pub fn select_notifier_in(
    preference: NotifierPreference,
    app_name: &str,
    path: Option<&OsStr>,
) -> Box<dyn Notifier> {
    let dunstify = || -> Box<dyn Notifier> {
        Box::new(Dunstify {
            app_name: app_name.to_string(),
        })
    };
    let notify_send = || -> Box<dyn Notifier> { Box::new(NotifySend) };

    let order: Vec<(&str, Box<dyn Notifier>)> = match preference {
        NotifierPreference::None => return Box::new(Silent),
        NotifierPreference::Dunstify => {
            vec![("dunstify", dunstify()), ("notify-send", notify_send())]
        }
        NotifierPreference::NotifySend => {
            vec![("notify-send", notify_send()), ("dunstify", dunstify())]
        }
    };

    for (program, notifier) in order {
        if on_path(program, path) {
            debug!(backend = notifier.name(), "Selected notification backend");
            return notifier;
        }
    }

    debug!("No notification backend found on PATH");
    Box::new(Silent)
}

fn on_path(program: &str, path: Option<&OsStr>) -> bool {
    path.map(|path| std::env::split_paths(path).any(|dir| is_file(&dir.join(program))))
        .unwrap_or(false)
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn path_with(programs: &[&str]) -> (tempfile::TempDir, OsString) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        for program in programs {
            std::fs::write(dir.path().join(program), "").unwrap();
        }
        let path = std::env::join_paths([dir.path(), Path::new("/nonexistent")]).unwrap();
        (dir, path)
    }

    #[test]
    fn test_preferred_backend_when_available() {
        let (_dir, path) = path_with(&["dunstify", "notify-send"]);

        let notifier =
            select_notifier_in(NotifierPreference::Dunstify, "app", Some(path.as_os_str()));
        assert_eq!(notifier.name(), "dunstify");

        let notifier =
            select_notifier_in(NotifierPreference::NotifySend, "app", Some(path.as_os_str()));
        assert_eq!(notifier.name(), "notify-send");
    }

    #[test]
    fn test_falls_back_to_other_backend() {
        let (_dir, path) = path_with(&["notify-send"]);

        let notifier =
            select_notifier_in(NotifierPreference::Dunstify, "app", Some(path.as_os_str()));
        assert_eq!(notifier.name(), "notify-send");
    }

    #[test]
    fn test_silent_without_backends() {
        let (_dir, path) = path_with(&[]);

        let notifier =
            select_notifier_in(NotifierPreference::Dunstify, "app", Some(path.as_os_str()));
        assert_eq!(notifier.name(), "none");

        let notifier = select_notifier_in(NotifierPreference::Dunstify, "app", None);
        assert_eq!(notifier.name(), "none");
    }

    #[test]
    fn test_disabled_backend_is_silent() {
        let (_dir, path) = path_with(&["dunstify"]);

        let notifier =
            select_notifier_in(NotifierPreference::None, "app", Some(path.as_os_str()));
        assert_eq!(notifier.name(), "none");
    }

    #[test]
    fn test_missing_executable_is_swallowed() {
        // Must not panic or block
        spawn_detached("definitely-not-a-notifier-binary", &["headline", "body"]);
        Silent.notify("headline", "body");
    }
}
