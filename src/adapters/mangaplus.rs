use super::patterns;
use crate::extractors::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, Strategy, TextField,
};
use crate::models::MangaStatus;
use crate::traits::SiteAdapter;
use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/viewer/\d+").unwrap());

/// MANGA Plus by Shueisha. Viewer URLs carry only a chapter id, so there is
/// no way back to the title page from a chapter.
pub struct MangaPlusAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl MangaPlusAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("MangaPlus", limits);
        let plan = ExtractionPlan {
            title: TextField::new(vec![
                Strategy::first("h1.TitleDetailHeader-module_title"),
                Strategy::first("h1"),
                Strategy::meta(&["og:title"]),
            ]),
            description: TextField::new(vec![
                Strategy::first(".TitleDetailHeader-module_overview"),
                Strategy::first("[class*=\"overview\"]"),
                Strategy::meta(&["og:description", "description"]),
            ]),
            cover_image: TextField::new(vec![
                Strategy::attr("img.TitleDetailHeader-module_img", "src"),
                Strategy::attr("img[class*=\"title\"]", "src"),
                Strategy::meta(&["og:image"]),
            ]),
            author: TextField::new(vec![
                Strategy::first(".TitleDetailHeader-module_author"),
                Strategy::first("[class*=\"author\"]"),
            ]),
            genres: ListField::new(vec![ListStrategy::fixed(&["Manga", "Shueisha"])]),
            status: StatusField::fixed(MangaStatus::Ongoing),
            ..generic
        };

        Self {
            patterns: patterns(&[
                r"(?i)mangaplus\.shueisha\.co\.jp/titles",
                r"(?i)mangaplus\.shueisha\.co\.jp/viewer",
            ]),
            plan,
        }
    }
}

impl Default for MangaPlusAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for MangaPlusAdapter {
    fn name(&self) -> &'static str {
        "MangaPlus"
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

    fn series_url_from_chapter(&self, _chapter_url: &str) -> Option<String> {
        None
    }
}
