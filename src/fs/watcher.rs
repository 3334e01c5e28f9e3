use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};
use tokio::sync::mpsc;

use crate::event::Event;

/// Watches the directory a file list shows and reports changes so the
/// listing can be rebuilt.
///
/// Only one directory is watched at a time, non-recursively: entries of
/// sub-directories are not part of the listing.
pub struct DirWatcher {
    watched: Option<PathBuf>,
    debouncer: Debouncer<RecommendedWatcher>,
}

impl DirWatcher {
    /// Create a watcher that posts [`Event::DirChanged`] after `debounce` of
    /// quiet time. Nothing is watched until [`DirWatcher::retarget`].
    pub fn new(debounce: Duration, event_tx: mpsc::UnboundedSender<Event>) -> notify::Result<Self> {
        let debouncer = new_debouncer(
            debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                match result {
                    Ok(events) => {
                        let paths = changed_paths(&events);
                        if !paths.is_empty() {
                            let _ = event_tx.send(Event::DirChanged(paths));
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "directory watcher error"),
                }
            },
        )?;

        Ok(Self {
            watched: None,
            debouncer,
        })
    }

    /// Move the watch to `dir`. Returns `false` when `dir` could not be
    /// watched; the previous watch is released either way.
    pub fn retarget(&mut self, dir: &Path) -> bool {
        if self.watched.as_deref() == Some(dir) {
            return true;
        }
        if let Some(old) = self.watched.take() {
            let _ = self.debouncer.watcher().unwatch(&old);
        }
        match self
            .debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
        {
            Ok(()) => {
                tracing::debug!(dir = %dir.display(), "watching directory");
                self.watched = Some(dir.to_path_buf());
                true
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot watch directory");
                false
            }
        }
    }

    pub fn watched(&self) -> Option<&Path> {
        self.watched.as_deref()
    }
}

/// Paths from a debounced batch that signal a real change.
pub fn changed_paths(events: &[DebouncedEvent]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = events
        .iter()
        .filter(|e| e.kind == DebouncedEventKind::Any)
        .map(|e| e.path.clone())
        .collect();
    paths.dedup();
    paths
}

/// Whether a change to `changed` affects the listing of `dir`.
pub fn affects_listing(dir: &Path, changed: &[PathBuf]) -> bool {
    changed
        .iter()
        .any(|p| p == dir || p.parent() == Some(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(path: &str, kind: DebouncedEventKind) -> DebouncedEvent {
        DebouncedEvent {
            path: PathBuf::from(path),
            kind,
        }
    }

    #[test]
    fn continuous_events_are_dropped() {
        let events = vec![
            event("/tmp/a", DebouncedEventKind::Any),
            event("/tmp/b", DebouncedEventKind::AnyContinuous),
        ];
        assert_eq!(changed_paths(&events), vec![PathBuf::from("/tmp/a")]);
    }

    #[test]
    fn direct_children_affect_listing() {
        let dir = Path::new("/home/user/docs");
        assert!(affects_listing(dir, &[PathBuf::from("/home/user/docs/a.txt")]));
        assert!(affects_listing(dir, &[PathBuf::from("/home/user/docs")]));
        assert!(!affects_listing(
            dir,
            &[PathBuf::from("/home/user/docs/sub/deep.txt")]
        ));
        assert!(!affects_listing(dir, &[PathBuf::from("/home/user/other")]));
    }

    #[test]
    fn retarget_switches_watch() {
        let first = tempfile::TempDir::new().unwrap();
        let second = tempfile::TempDir::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut watcher = DirWatcher::new(Duration::from_millis(50), tx).unwrap();
        assert!(watcher.retarget(first.path()));
        assert_eq!(watcher.watched(), Some(first.path()));
        assert!(watcher.retarget(second.path()));
        assert_eq!(watcher.watched(), Some(second.path()));
        assert!(!watcher.retarget(Path::new("/nonexistent/watch/target")));
        assert_eq!(watcher.watched(), None);
    }
}
