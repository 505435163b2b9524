use super::patterns;
use crate::extractors::{script, ExtractionPlan, PlanLimits};
use crate::traits::SiteAdapter;
use regex::Regex;

const TITLE_SELECTORS: &[&str] = &[
    "h1",
    "h1.title",
    "h1.entry-title",
    "h1.post-title",
    "h1.name",
    "h1.subj",
    "[class*=\"title\"]",
    "[class*=\"Title\"]",
    ".series-title",
    ".manga-title",
    ".comic-title",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".description",
    ".summary",
    ".synopsis",
    "[class*=\"desc\"]",
    "[class*=\"summary\"]",
    "p.summary",
    ".content p",
    "[itemprop=\"description\"]",
];

const IMAGE_SELECTORS: &[&str] = &[
    "img.cover",
    "img.poster",
    "img.thumb",
    "img[alt*=\"cover\"]",
    "img[class*=\"cover\"]",
    "[class*=\"thumb\"] img",
];

const AUTHOR_SELECTORS: &[&str] = &[
    ".author",
    "[class*=\"author\"]",
    "[class*=\"Author\"]",
    "a[href*=\"author\"]",
    "[itemprop=\"author\"]",
];

const GENRE_SELECTORS: &[&str] = &[
    ".genres a",
    ".genre a",
    "a[href*=\"genre\"]",
    "[class*=\"genre\"] a",
    ".badge",
    ".tag",
];

const STATUS_SELECTORS: &[&str] = &[
    ".status",
    "[class*=\"status\"]",
    "[class*=\"Status\"]",
    ".info-status",
    "[data-status]",
];

/// Matches every URL and reports which common selectors hit, for writing new adapters.
///
/// Only registered when `extraction.debug_adapter` is enabled. Its reply is
/// marked `_isDebugAdapter` and never turns into metadata.
pub struct DebugAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl DebugAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        Self {
            patterns: patterns(&[r".*"]),
            plan: ExtractionPlan::generic("Debug", limits),
        }
    }
}

impl Default for DebugAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for DebugAdapter {
    fn name(&self) -> &'static str {
        "Debug"
    }

    fn url_patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }

    fn injection_script(&self) -> String {
        script::render_probe(&[
            ("titles", TITLE_SELECTORS),
            ("descriptions", DESCRIPTION_SELECTORS),
            ("images", IMAGE_SELECTORS),
            ("authors", AUTHOR_SELECTORS),
            ("genres", GENRE_SELECTORS),
            ("statuses", STATUS_SELECTORS),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_everything_and_probes() {
        let adapter = DebugAdapter::default();
        assert!(adapter.can_handle("https://unknown.example/anything"));
        assert!(adapter.is_detail_page("https://unknown.example/series/x"));

        let script = adapter.injection_script();
        assert!(script.contains("_isDebugAdapter"));
        assert!(script.contains("\"statuses\""));
        assert!(script.contains("h1.entry-title"));
    }
}
