use crate::error::Result;
use crate::extractors::ExtractionPlan;
use crate::models::{ExtractedMetadata, LibraryEntry, ProgressUpdate, ReadingStatus, ValidationReport};
use regex::Regex;
use std::sync::LazyLock;

static DEFAULT_CHAPTER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(?:chapter|ch|episode|ep|read)/\d+(?:\.\d+)?").unwrap()
});

/// Site-specific strategy for recognising pages and scraping metadata.
///
/// Adapters are built once and never mutated; the registry holds them behind
/// this trait so adding a site is a pure addition.
pub trait SiteAdapter: Send + Sync {
    /// Stable identifier, echoed into metadata as `sourceWebsite`.
    fn name(&self) -> &'static str;

    /// URL patterns, evaluated in order.
    fn url_patterns(&self) -> &[Regex];

    /// Fallback chains for every metadata field on this site.
    fn plan(&self) -> &ExtractionPlan;

    fn can_handle(&self, url: &str) -> bool {
        self.url_patterns().iter().any(|pattern| pattern.is_match(url))
    }

    /// Raw page-side program. Never throws: failures become `{error}` payloads.
    fn injection_script(&self) -> String {
        crate::extractors::script::render_plan(self.plan())
    }

    fn is_chapter_page(&self, url: &str) -> bool {
        DEFAULT_CHAPTER_SEGMENT.is_match(url)
    }

    fn is_detail_page(&self, url: &str) -> bool {
        self.can_handle(url) && !self.is_chapter_page(url)
    }

    /// Drops the trailing chapter segment of a chapter URL.
    fn series_url_from_chapter(&self, chapter_url: &str) -> Option<String> {
        let found = DEFAULT_CHAPTER_SEGMENT.find(chapter_url)?;
        let series = chapter_url[..found.start()].trim_end_matches('/');
        (!series.is_empty()).then(|| series.to_string())
    }

    fn validate_metadata(&self, metadata: &ExtractedMetadata) -> ValidationReport {
        required_field_errors(metadata)
    }
}

/// Presence checks shared by every adapter's validation.
pub fn required_field_errors(metadata: &ExtractedMetadata) -> ValidationReport {
    let mut errors = Vec::new();
    if metadata.title.trim().is_empty() {
        errors.push("title is required".to_string());
    }
    if metadata.source_url.trim().is_empty() {
        errors.push("sourceUrl is required".to_string());
    }
    if metadata.source_website.trim().is_empty() {
        errors.push("sourceWebsite is required".to_string());
    }
    ValidationReport::from_errors(errors)
}

/// The embedded page's execution environment as seen by the coordinator.
///
/// Injection is fire-and-forget; results come back through the host's message
/// callback, never as a return value.
pub trait PageHost: Send + Sync {
    fn inject_script(&self, script: &str) -> Result<()>;
}

/// Remote library persistence. Calls may fail and are never retried here.
#[async_trait::async_trait]
pub trait LibraryBackend: Send + Sync {
    async fn add_entry(
        &self,
        metadata: &ExtractedMetadata,
        category_id: &str,
        status: ReadingStatus,
    ) -> Result<LibraryEntry>;

    async fn update_progress(&self, entry_id: &str, update: &ProgressUpdate) -> Result<LibraryEntry>;
}
