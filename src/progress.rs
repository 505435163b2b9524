use crate::chapters::extract_chapter_number;
use crate::config::TimingConfig;
use crate::models::{ProgressUpdate, ReadingStatus};
use crate::traits::LibraryBackend;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Debounced reading-position writer for one library entry.
///
/// Every navigation restarts the quiet window; only the URL seen when the window
/// finally elapses is written. Requires a running tokio runtime.
pub struct ProgressTracker {
    backend: Arc<dyn LibraryBackend>,
    entry_id: Option<String>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressTracker {
    pub fn new(backend: Arc<dyn LibraryBackend>, entry_id: Option<String>, debounce: Duration) -> Self {
        Self {
            backend,
            entry_id,
            debounce,
            pending: Mutex::new(None),
        }
    }

    /// Tracker using the configured `progress_debounce_ms` window.
    pub fn from_config(backend: Arc<dyn LibraryBackend>, entry_id: Option<String>, timing: &TimingConfig) -> Self {
        Self::new(backend, entry_id, timing.progress_debounce())
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn entry_id(&self) -> Option<&str> {
        self.entry_id.as_deref()
    }

    /// Records a navigation inside the reader. No-op without an entry to update.
    pub fn on_navigation(&self, url: &str) {
        let Some(entry_id) = self.entry_id.clone() else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let debounce = self.debounce;
        let url = url.to_string();

        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let Some(chapter) = extract_chapter_number(&url, None) else {
                debug!("[PROGRESS] No chapter number in {}, skipping update", url);
                return;
            };

            info!("[PROGRESS] Updating {} to chapter {}", entry_id, chapter);
            let update = ProgressUpdate {
                last_read_url: url,
                current_chapter: chapter,
                status: ReadingStatus::Reading,
            };
            match backend.update_progress(&entry_id, &update).await {
                Ok(entry) => debug!("[PROGRESS] Saved, entry now at chapter {}", entry.current_chapter),
                Err(e) => error!("[PROGRESS] Failed to update progress for {}: {}", entry_id, e),
            }
        });

        if let Some(previous) = self.replace_pending(Some(task)) {
            previous.abort();
        }
    }

    /// Drops any write still waiting for its quiet window.
    pub fn cancel(&self) {
        if let Some(previous) = self.replace_pending(None) {
            previous.abort();
        }
    }

    fn replace_pending(&self, task: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *pending, task)
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}
