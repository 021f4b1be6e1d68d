//! Hot reload of the configuration file.
//!
//! Watches the parent directory and filters on the file name, so saves that
//! rename a temp file over the config keep being picked up.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Keeps the underlying OS watcher alive. Dropping it stops reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    /// Watch `path`, sending every successfully reloaded config on the returned channel.
    ///
    /// Changes that fail to load or validate are logged and skipped.
    pub fn start(
        path: &Path,
    ) -> Result<(Self, mpsc::UnboundedReceiver<AppConfig>), notify::Error> {
        let file_name = path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let config_path = path.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_file(&event, &file_name) => {
                    reload(&config_path, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, dir = ?dir, "Config watcher started");
        Ok((
            Self {
                path: path.to_path_buf(),
                _watcher: watcher,
            },
            rx,
        ))
    }

    /// The config file being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A create, write or rename that lands on the watched file name.
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<AppConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(path = ?path, "Config file changed, reloaded");
            let _ = tx.send(config);
        }
        Err(e) => tracing::warn!(
            path = ?path,
            error = %e,
            "Config reload failed, keeping current configuration"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RenameMode};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_only_the_config_file() {
        let name = OsString::from("rot13.toml");

        assert!(touches_file(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/rot13/rot13.toml"),
            &name
        ));
        assert!(touches_file(
            &event(
                EventKind::Modify(ModifyKind::Name(RenameMode::To)),
                "/etc/rot13/rot13.toml"
            ),
            &name
        ));
        assert!(touches_file(
            &event(EventKind::Create(CreateKind::File), "/etc/rot13/rot13.toml"),
            &name
        ));
        assert!(!touches_file(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/rot13/.rot13.toml.swp"),
            &name
        ));
        assert!(!touches_file(
            &event(EventKind::Access(notify::event::AccessKind::Any), "/etc/rot13/rot13.toml"),
            &name
        ));
    }

    /// Write to a sibling temp file, then rename it over `path`.
    fn atomic_save(path: &Path, content: &str) {
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).unwrap();
        std::fs::rename(&tmp, path).unwrap();
    }

    async fn next_login_quota(rx: &mut mpsc::UnboundedReceiver<AppConfig>, want: u32) {
        let waited = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(config) = rx.recv().await {
                if config.rate_limit.login_per_minute == want {
                    return;
                }
            }
            panic!("watcher channel closed");
        })
        .await;
        assert!(waited.is_ok(), "no reload with login_per_minute = {want}");
    }

    #[tokio::test]
    async fn test_reloads_after_repeated_rename_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot13.toml");
        std::fs::write(&path, "[rate_limit]\nlogin_per_minute = 1\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::start(&path).unwrap();
        assert_eq!(watcher.path(), path.as_path());

        atomic_save(&path, "[rate_limit]\nlogin_per_minute = 2\n");
        next_login_quota(&mut rx, 2).await;

        atomic_save(&path, "[rate_limit]\nlogin_per_minute = 3\n");
        next_login_quota(&mut rx, 3).await;
    }

    #[tokio::test]
    async fn test_invalid_save_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rot13.toml");
        std::fs::write(&path, "").unwrap();

        let (_watcher, mut rx) = ConfigWatcher::start(&path).unwrap();

        atomic_save(&path, "[rate_limit]\nlogin_per_minute = 0\n");
        atomic_save(&path, "[rate_limit]\nlogin_per_minute = 4\n");
        next_login_quota(&mut rx, 4).await;
    }
}
