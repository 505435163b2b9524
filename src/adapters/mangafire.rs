use super::patterns;
use crate::extractors::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, StatusSource, Strategy,
    TextField,
};
use crate::traits::SiteAdapter;
use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/read/|/chapter-\d+|[?&]chapter=\d+").unwrap());

// https://mangafire.to/read/<slug>/<lang>/chapter-<n>
static READER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?://[^/]+)/read/([^/?#]+)").unwrap());

/// mangafire.to. Series live under `/manga/<slug>`, the reader under `/read/<slug>/...`.
pub struct MangaFireAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl MangaFireAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("MangaFire", limits);
        let plan = ExtractionPlan {
            title: TextField::new(vec![
                Strategy::first("h1.name"),
                Strategy::first("h1.title"),
                Strategy::first("h1"),
                Strategy::meta(&["og:title"]),
                Strategy::DocumentTitle,
            ]),
            description: TextField::new(vec![
                Strategy::first(".description"),
                Strategy::first(".synopsis"),
                Strategy::first("[class*=\"desc\"]"),
                Strategy::meta(&["og:description", "description"]),
            ]),
            cover_image: TextField::new(vec![
                Strategy::attr("img.cover", "src"),
                Strategy::attr("img.poster", "src"),
                Strategy::attr("img[alt*=\"cover\"]", "src"),
                Strategy::meta(&["og:image"]),
            ])
            .reject(&["logo"]),
            author: TextField::new(vec![Strategy::first("[class*=\"author\"]")]),
            genres: ListField::new(vec![
                ListStrategy::all(".genres a"),
                ListStrategy::all("[class*=\"genre\"] a"),
                ListStrategy::all(".badge"),
            ]),
            status: StatusField::new(vec![
                StatusSource::element(".status"),
                StatusSource::element("[class*=\"status\"]"),
            ]),
            ..generic
        };

        Self {
            patterns: patterns(&[r"(?i)mangafire\.to/manga", r"(?i)mangafire\.to/read/"]),
            plan,
        }
    }
}

impl Default for MangaFireAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for MangaFireAdapter {
    fn name(&self) -> &'static str {
        "MangaFire"
    }

    fn url_patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }

    fn is_chapter_page(&self, url: &str) -> bool {
        CHAPTER_PAGE.is_match(url)
    }

    fn series_url_from_chapter(&self, chapter_url: &str) -> Option<String> {
        if let Some(caps) = READER.captures(chapter_url) {
            return Some(format!("{}/manga/{}", &caps[1], &caps[2]));
        }
        if !self.is_chapter_page(chapter_url) {
            return None;
        }
        let series = chapter_url.split(['?', '#']).next()?;
        let series = match series.rfind("/chapter-") {
            Some(index) => &series[..index],
            None => series,
        };
        Some(series.trim_end_matches('/').to_string())
    }
}
