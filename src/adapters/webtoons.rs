use super::patterns;
use crate::extractors::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, StatusSource, Strategy,
    TextField, UrlRule,
};
use crate::models::{ExtractedMetadata, ValidationReport};
use crate::traits::{required_field_errors, SiteAdapter};
use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)viewer\?title_no=|/episode/").unwrap());

static TITLE_NO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"title_no=(\d+)").unwrap());

static SERIES_BASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?webtoons\.com/[a-z]+/[a-z-]+/[a-z0-9-]+)").unwrap());

/// webtoons.com. Series metadata lives on the `/list` page only.
pub struct WebtoonsAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl WebtoonsAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("Webtoons", limits);
        let plan = ExtractionPlan {
            title: TextField::new(vec![
                Strategy::first("h1.subj"),
                Strategy::first("h1._title"),
                Strategy::first(".info h1"),
                Strategy::first(".detail_header h1"),
                Strategy::first("h1[class*=\"title\"]"),
                Strategy::first("h1"),
                Strategy::meta(&["og:title"]),
                Strategy::DocumentTitle,
            ])
            .clean(&[" | WEBTOON"]),
            description: TextField::new(vec![
                Strategy::first_min("p.summary", 21),
                Strategy::first_min("p._summary", 21),
                Strategy::first_min(".summary", 21),
                Strategy::first_min(".detail_body p", 21),
                Strategy::first_min("p[class*=\"summary\"]", 21),
                Strategy::first_min("p[class*=\"description\"]", 21),
                Strategy::meta(&["og:description", "description"]),
            ]),
            cover_image: TextField::new(vec![
                Strategy::attr("img.thumb", "src"),
                Strategy::attr("span._thumbnail img", "src"),
                Strategy::attr(".detail_header img", "src"),
                Strategy::attr(".detail_body img", "src"),
                Strategy::attr("img[class*=\"thumb\"]", "src"),
                Strategy::attr("img[class*=\"cover\"]", "src"),
                Strategy::meta(&["og:image"]),
            ])
            .reject(&["logo", "blank"]),
            author: TextField::new(vec![
                Strategy::first(".author"),
                Strategy::first("._authorName"),
                Strategy::first(".detail_header .author"),
                Strategy::first("a[href*=\"/creator/\"]"),
                Strategy::first(".creator_name"),
            ])
            .clean(&["author info", "author"]),
            genres: ListField::new(vec![
                ListStrategy::first(".genre"),
                ListStrategy::first("h2._genre"),
                ListStrategy::first(".info .genre"),
                ListStrategy::first("span.genre"),
                ListStrategy::first("a[href*=\"/genre/\"]"),
            ])
            .append(&["Webtoon"]),
            status: StatusField::new(vec![
                StatusSource::element(".day_info"),
                StatusSource::element("._statusText"),
                StatusSource::element(".info .status"),
                StatusSource::element("span[class*=\"status\"]"),
            ]),
            source_url: UrlRule::canonical("/list"),
            ..generic
        };

        Self {
            patterns: patterns(&[r"(?i)webtoons\.com/[a-z]+/[a-z-]+/[a-z0-9-]+"]),
            plan,
        }
    }
}

impl Default for WebtoonsAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for WebtoonsAdapter {
    fn name(&self) -> &'static str {
        "Webtoons"
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

    fn is_detail_page(&self, url: &str) -> bool {
        self.can_handle(url) && url.contains("/list") && !self.is_chapter_page(url)
    }

    // .../<genre>/<series>/<episode-slug>/viewer?title_no=95&episode_no=1
    //   -> .../<genre>/<series>/list?title_no=95
    fn series_url_from_chapter(&self, chapter_url: &str) -> Option<String> {
        if !self.is_chapter_page(chapter_url) {
            return None;
        }
        let title_no = TITLE_NO.captures(chapter_url)?.get(1)?.as_str();
        let base = chapter_url.split("/viewer").next()?;
        let base = base.split("/episode").next()?;
        let series = SERIES_BASE.captures(base)?.get(1)?.as_str();
        Some(format!("{}/list?title_no={}", series, title_no))
    }

    fn validate_metadata(&self, metadata: &ExtractedMetadata) -> ValidationReport {
        let mut errors = required_field_errors(metadata).errors;
        if !metadata.source_url.is_empty() && !metadata.source_url.ends_with("/list") {
            errors.push("sourceUrl must point at the series /list page".to_string());
        }
        ValidationReport::from_errors(errors)
    }
}
