use crate::config::ExtractionConfig;
use crate::extractors::script;
use crate::models::ExtractedMetadata;
use crate::registry::AdapterRegistry;
use crate::traits::SiteAdapter;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Single entry point for the page viewer: which pages can be extracted, what
/// to inject, and how to read the reply.
pub struct MetadataService {
    registry: AdapterRegistry,
    config: ExtractionConfig,
}

impl MetadataService {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            registry: AdapterRegistry::from_config(&config),
            config,
        }
    }

    pub fn with_registry(registry: AdapterRegistry, config: ExtractionConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn extractor_for_url(&self, url: &str) -> Option<&dyn SiteAdapter> {
        self.registry.adapter_for_url(url)
    }

    pub fn adapter_by_name(&self, name: &str) -> Option<&dyn SiteAdapter> {
        self.registry.adapter_by_name(name)
    }

    pub fn supported_websites(&self) -> Vec<&'static str> {
        self.registry.supported_sites()
    }

    /// A supported detail page, or a chapter page of a supported series.
    pub fn is_extractable(&self, url: &str) -> bool {
        match self.registry.adapter_for_url(url) {
            Some(adapter) => adapter.is_chapter_page(url) || adapter.is_detail_page(url),
            None => false,
        }
    }

    pub fn is_chapter_page(&self, url: &str) -> bool {
        self.registry
            .adapter_for_url(url)
            .map(|adapter| adapter.is_chapter_page(url))
            .unwrap_or(false)
    }

    /// Series page for a chapter URL, if the owning adapter can derive one.
    pub fn series_url_for(&self, url: &str) -> Option<String> {
        self.registry
            .adapter_for_url(url)
            .filter(|adapter| adapter.is_chapter_page(url))
            .and_then(|adapter| adapter.series_url_from_chapter(url))
    }

    /// True when `metadata` was scraped from the page at `url`, judged by the
    /// owning adapter and the source URL that page would report.
    pub fn describes_page(&self, metadata: &ExtractedMetadata, url: &str) -> bool {
        self.registry.adapter_for_url(url).is_some_and(|adapter| {
            adapter.name() == metadata.source_website
                && adapter.plan().source_url.normalize(url) == metadata.source_url
        })
    }

    /// The enveloped payload for `url`, or `None` when no adapter matches or the
    /// page is a chapter being read.
    pub fn injection_script(&self, url: &str) -> Option<String> {
        let adapter = self.registry.adapter_for_url(url)?;

        if adapter.is_chapter_page(url) {
            debug!("[METADATA] Not scraping chapter page: {}", url);
            return None;
        }

        info!("[METADATA] Using {} adapter for {}", adapter.name(), url);
        Some(script::wrap_for_bridge(
            &adapter.injection_script(),
            &self.config.bridge_object,
        ))
    }

    /// Turns a raw page reply into metadata. Never fails: malformed, error or
    /// incomplete replies yield `None`.
    pub fn parse_and_validate(&self, raw: &str) -> Option<ExtractedMetadata> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("[METADATA] Reply is not JSON: {}", e);
                return None;
            }
        };
        let Some(object) = value.as_object() else {
            warn!("[METADATA] Reply is not a JSON object");
            return None;
        };

        if object.get("_isDebugAdapter").and_then(Value::as_bool) == Some(true) {
            let report = serde_json::to_string_pretty(&value).unwrap_or_default();
            info!("[METADATA] Debug probe result:\n{}", report);
            return None;
        }

        if object.get("_redirecting").and_then(Value::as_bool) == Some(true) {
            let target = object
                .get("seriesUrl")
                .and_then(Value::as_str)
                .unwrap_or("an unknown page");
            info!("[METADATA] Page is redirecting to {}", target);
            return None;
        }

        if let Some(error) = object.get("error") {
            warn!("[METADATA] Extraction script failed: {}", error);
            return None;
        }

        let Some(metadata) = ExtractedMetadata::from_json_object(object, self.config.max_genres)
        else {
            warn!("[METADATA] Reply is missing title, sourceUrl or sourceWebsite");
            return None;
        };

        if let Some(adapter) = self.registry.adapter_by_name(&metadata.source_website) {
            let report = adapter.validate_metadata(&metadata);
            if !report.is_valid {
                warn!(
                    "[METADATA] {} validation: {}",
                    adapter.name(),
                    report.errors.join(", ")
                );
            }
        }

        info!(
            "[METADATA] Extracted \"{}\" from {}",
            metadata.title, metadata.source_website
        );
        Some(metadata)
    }
}

impl Default for MetadataService {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
