use super::patterns;
use crate::extractors::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, StatusSource, Strategy,
    TextField,
};
use crate::traits::SiteAdapter;
use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/chapter[-_]\d+").unwrap());

/// mangakakalot.com and its manganato.com mirror.
///
/// Author and status sit in `Label : value` rows of the info table.
pub struct MangaKakalotAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl MangaKakalotAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("MangaKakalot", limits);
        let plan = ExtractionPlan {
            title: TextField::new(vec![
                Strategy::first(".manga-info-text h1"),
                Strategy::first("h1"),
                Strategy::meta(&["og:title"]),
                Strategy::DocumentTitle,
            ]),
            description: TextField::new(vec![
                Strategy::first("#noidungm"),
                Strategy::first("#panel-story-info-description"),
                Strategy::first(".panel-story-info-description"),
                Strategy::meta(&["og:description", "description"]),
            ])
            .clean(&["Description :"]),
            cover_image: TextField::new(vec![
                Strategy::attr(".manga-info-pic img", "src"),
                Strategy::attr(".info-image img", "src"),
                Strategy::attr("img.img-loading", "src"),
                Strategy::meta(&["og:image"]),
            ])
            .reject(&["logo"]),
            author: TextField::new(vec![
                Strategy::labelled(".manga-info-text li", "author"),
                Strategy::labelled(".variations-tableInfo tr", "author"),
            ]),
            genres: ListField::new(vec![
                ListStrategy::all(".manga-info-text li a[href*=\"genre\"]"),
                ListStrategy::all(".table-value a"),
            ]),
            status: StatusField::new(vec![
                StatusSource::labelled(".manga-info-text li", "status"),
                StatusSource::labelled(".variations-tableInfo tr", "status"),
            ]),
            ..generic
        };

        Self {
            patterns: patterns(&[r"(?i)mangakakalot\.com/manga", r"(?i)manganato\.com/manga"]),
            plan,
        }
    }
}

impl Default for MangaKakalotAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for MangaKakalotAdapter {
    fn name(&self) -> &'static str {
        "MangaKakalot"
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

    // /manga/<id>/chapter-12 and /chapter/<id>/chapter_12 both map to /manga/<id>.
    fn series_url_from_chapter(&self, chapter_url: &str) -> Option<String> {
        let found = CHAPTER_PAGE.find(chapter_url)?;
        let series = chapter_url[..found.start()].trim_end_matches('/');
        (!series.is_empty()).then(|| series.replacen("/chapter/", "/manga/", 1))
    }
}
