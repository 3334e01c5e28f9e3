//! Background directory scans with latest-wins delivery.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::Event;
use crate::fs::entry::{scan_directory, DirectoryEntry, EntryKinds};

/// Generations are unique across all scanners so a result can never be
/// mistaken for another list's request.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// What to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub directory: PathBuf,
    pub filter: String,
    pub kinds: EntryKinds,
}

/// A finished scan, delivered through the event channel.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub generation: u64,
    pub directory: PathBuf,
    pub filter: String,
    pub entries: Vec<DirectoryEntry>,
}

/// Runs one directory scan at a time for a single file list.
///
/// A new request aborts the task of the previous one, and a task that
/// finishes after being superseded does not post its result.
pub struct DirScanner {
    latest: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Event>,
}

impl DirScanner {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            task: None,
            tx,
        }
    }

    /// Generation of the most recent request (0 before the first).
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start scanning and return the request's generation.
    ///
    /// The enumeration runs on tokio's blocking pool. Without a runtime
    /// (plain unit tests, headless use) the scan runs inline and the
    /// outcome is posted before this returns.
    pub fn request(&mut self, request: ScanRequest) -> u64 {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::SeqCst);
        self.latest.store(generation, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::debug!(
            generation,
            dir = %request.directory.display(),
            filter = %request.filter,
            "scan requested"
        );

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            let outcome = run_scan(generation, request);
            let _ = self.tx.send(Event::ScanComplete(outcome));
            return generation;
        };

        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        self.task = Some(runtime.spawn(async move {
            let outcome =
                match tokio::task::spawn_blocking(move || run_scan(generation, request)).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::warn!(generation, error = %e, "scan task failed");
                        return;
                    }
                };
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "dropping superseded scan");
                return;
            }
            let _ = tx.send(Event::ScanComplete(outcome));
        }));
        generation
    }
}

impl Drop for DirScanner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn run_scan(generation: u64, request: ScanRequest) -> ScanOutcome {
    let entries = scan_directory(&request.directory, &request.filter, request.kinds);
    ScanOutcome {
        generation,
        directory: request.directory,
        filter: request.filter,
        entries,
    }
}
