//! Decides when metadata is extracted from the page being viewed.
//!
//! Auto-extraction runs once a supported detail page has been shown for the
//! settle delay. Replies arrive asynchronously through [`ExtractionCoordinator::on_message`]
//! and the last one received wins, whichever request produced it. Held metadata
//! is only handed out for the page its own `sourceUrl` names.

use crate::config::TimingConfig;
use crate::error::{ExtractionFailure, MangaShelfError, Result};
use crate::models::{ExtractedMetadata, LibraryEntry, NavigationState, ReadingStatus};
use crate::service::MetadataService;
use crate::traits::{LibraryBackend, PageHost};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct CoordinatorState {
    navigation: NavigationState,
    overlay_visible: bool,
    latest: Option<ExtractedMetadata>,
    /// Bumped for every accepted reply.
    replies: u64,
    pending: Option<JoinHandle<()>>,
}

/// Scheduling needs a tokio runtime; without one, navigation is tracked but
/// nothing is extracted automatically.
pub struct ExtractionCoordinator {
    service: Arc<MetadataService>,
    host: Arc<dyn PageHost>,
    timing: TimingConfig,
    state: Arc<Mutex<CoordinatorState>>,
}

impl ExtractionCoordinator {
    pub fn new(service: Arc<MetadataService>, host: Arc<dyn PageHost>, timing: TimingConfig) -> Self {
        Self {
            service,
            host,
            timing,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        lock_state(&self.state)
    }

    /// Host callback for every navigation change. A new URL cancels any pending
    /// auto-extraction and, for detail pages, schedules a fresh one.
    pub fn on_navigation_state_change(&self, navigation: NavigationState) {
        let mut state = self.lock();
        let url_changed = state.navigation.url != navigation.url;
        state.navigation = navigation;

        if url_changed {
            self.reschedule(&mut state);
        }
    }

    /// While the overlay is up nothing is extracted automatically.
    pub fn set_overlay_visible(&self, visible: bool) {
        let mut state = self.lock();
        if state.overlay_visible == visible {
            return;
        }
        state.overlay_visible = visible;
        self.reschedule(&mut state);
    }

    fn reschedule(&self, state: &mut CoordinatorState) {
        if let Some(previous) = state.pending.take() {
            debug!("[COORDINATOR] Cancelled pending extraction");
            previous.abort();
        }

        let url = state.navigation.url.clone();
        if url.is_empty() || state.overlay_visible || !self.service.is_extractable(&url) {
            return;
        }
        if self.service.is_chapter_page(&url) {
            debug!(
                "[COORDINATOR] Chapter page, not extracting (series: {})",
                self.service.series_url_for(&url).as_deref().unwrap_or("unknown")
            );
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("[COORDINATOR] No async runtime, not scheduling extraction of {}", url);
            return;
        };

        let service = Arc::clone(&self.service);
        let host = Arc::clone(&self.host);
        let shared = Arc::clone(&self.state);
        let delay = self.timing.settle_delay();

        debug!("[COORDINATOR] Extracting {} in {:?}", url, delay);
        state.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = lock_state(&shared);
                if state.navigation.url != url || state.overlay_visible {
                    return;
                }
                state.pending = None;
            }
            if let Err(e) = inject(&service, host.as_ref(), &url) {
                debug!("[COORDINATOR] Auto-extraction skipped: {}", e);
            }
        }));
    }

    /// Injects the extraction script for `url` right away.
    pub fn trigger_extraction(&self, url: &str) -> std::result::Result<(), ExtractionFailure> {
        inject(&self.service, self.host.as_ref(), url)
    }

    /// Host callback for a message posted from the page. Accepted metadata
    /// replaces whatever was held before.
    pub fn on_message(&self, raw: &str) -> Option<ExtractedMetadata> {
        let metadata = self.service.parse_and_validate(raw)?;
        let mut state = self.lock();
        state.latest = Some(metadata.clone());
        state.replies += 1;
        Some(metadata)
    }

    /// User-initiated extraction ("add to library").
    ///
    /// Returns held metadata describing the current page at once; otherwise
    /// injects and waits `manual_wait` for a reply. A reply arriving later still
    /// lands in the latest-metadata slot.
    pub async fn request_manual_extraction(&self) -> std::result::Result<ExtractedMetadata, ExtractionFailure> {
        let url = self.lock().navigation.url.clone();
        if url.is_empty() {
            return Err(ExtractionFailure::NoPage);
        }
        if self.service.extractor_for_url(&url).is_none() {
            warn!("[COORDINATOR] Unsupported website: {}", url);
            return Err(ExtractionFailure::Unsupported(url));
        }
        if !self.service.is_extractable(&url) {
            return Err(ExtractionFailure::NotDetailPage(url));
        }

        let replies_before = {
            let state = self.lock();
            if let Some(held) = self.held_for(&state, &url) {
                info!("[COORDINATOR] Using held metadata for {}", url);
                return Ok(held.clone());
            }
            state.replies
        };

        self.trigger_extraction(&url)?;
        tokio::time::sleep(self.timing.manual_wait()).await;

        let state = self.lock();
        match self.held_for(&state, &url) {
            Some(held) if state.replies > replies_before => Ok(held.clone()),
            _ => {
                warn!("[COORDINATOR] No reply within {:?} for {}", self.timing.manual_wait(), url);
                Err(ExtractionFailure::NoReply)
            }
        }
    }

    fn held_for<'a>(&self, state: &'a CoordinatorState, url: &str) -> Option<&'a ExtractedMetadata> {
        state
            .latest
            .as_ref()
            .filter(|metadata| self.service.describes_page(metadata, url))
    }

    /// Adds the held metadata to the library as plan-to-read.
    pub async fn save_to_library(&self, backend: &dyn LibraryBackend, category_id: &str) -> Result<LibraryEntry> {
        let metadata = self
            .latest_metadata()
            .ok_or(MangaShelfError::Extraction(ExtractionFailure::NoReply))?;

        info!("[COORDINATOR] Saving \"{}\" to category {}", metadata.title, category_id);
        backend
            .add_entry(&metadata, category_id, ReadingStatus::PlanToRead)
            .await
            .inspect_err(|e| error!("[COORDINATOR] Failed to save \"{}\": {}", metadata.title, e))
    }

    pub fn latest_metadata(&self) -> Option<ExtractedMetadata> {
        self.lock().latest.clone()
    }

    pub fn clear_metadata(&self) {
        self.lock().latest = None;
    }

    pub fn navigation(&self) -> NavigationState {
        self.lock().navigation.clone()
    }

    pub fn has_pending_extraction(&self) -> bool {
        self.lock().pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancels any scheduled auto-extraction.
    pub fn shutdown(&self) {
        if let Some(task) = self.lock().pending.take() {
            task.abort();
        }
    }
}

impl Drop for ExtractionCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock_state(state: &Mutex<CoordinatorState>) -> MutexGuard<'_, CoordinatorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn inject(service: &MetadataService, host: &dyn PageHost, url: &str) -> std::result::Result<(), ExtractionFailure> {
    if service.extractor_for_url(url).is_none() {
        return Err(ExtractionFailure::Unsupported(url.to_string()));
    }
    if service.is_chapter_page(url) {
        info!(
            "[COORDINATOR] Reading a chapter, series page is {}",
            service.series_url_for(url).as_deref().unwrap_or("unknown")
        );
        return Err(ExtractionFailure::ChapterPage(url.to_string()));
    }
    let Some(script) = service.injection_script(url) else {
        return Err(ExtractionFailure::NoScript(url.to_string()));
    };

    host.inject_script(&script).map_err(|e| {
        error!("[COORDINATOR] Script injection failed for {}: {}", url, e);
        ExtractionFailure::InjectionFailed(e.to_string())
    })?;
    debug!("[COORDINATOR] Injected extraction script into {}", url);
    Ok(())
}
