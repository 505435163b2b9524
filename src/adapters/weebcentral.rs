use super::patterns;
use crate::extractors::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, Strategy, TextField,
};
use crate::models::MangaStatus;
use crate::traits::SiteAdapter;
use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/chapter/\d+").unwrap());

// /series/<ID>/<NAME>/chapter/<N>
static SERIES_FROM_CHAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*/series/[^/]+/[^/]+)/chapter/\d+").unwrap());

/// weebcentral.com. The site shows no author, genre or status on series pages.
pub struct WeebCentralAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl WeebCentralAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("WeebCentral", limits);
        let plan = ExtractionPlan {
            title: TextField::new(vec![Strategy::first("h1"), Strategy::meta(&["og:title"])])
                .clean(&[" | Weeb Central"]),
            description: TextField::new(vec![Strategy::meta(&["og:description", "description"])]),
            cover_image: TextField::new(vec![
                Strategy::image_by_alt(&["cover"], false),
                Strategy::meta(&["og:image"]),
                Strategy::large_image(200, 250),
            ])
            .reject(&["brand.png", "logo", "icon"]),
            author: TextField::new(vec![]),
            artist: TextField::new(vec![]),
            genres: ListField::new(vec![ListStrategy::fixed(&["Manga"])]),
            status: StatusField::fixed(MangaStatus::Ongoing),
            ..generic
        };

        Self {
            patterns: patterns(&[r"(?i)weebcentral\.com/series", r"(?i)weebcentral\.com/manga"]),
            plan,
        }
    }
}

impl Default for WeebCentralAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for WeebCentralAdapter {
    fn name(&self) -> &'static str {
        "WeebCentral"
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
        SERIES_FROM_CHAPTER
            .captures(chapter_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{engine, HtmlPage};

    #[test]
    fn recognises_series_and_chapter_pages() {
        let adapter = WeebCentralAdapter::default();
        let series = "https://weebcentral.com/series/01J76XY/Kagurabachi";
        let chapter = "https://weebcentral.com/series/01J76XY/Kagurabachi/chapter/108";

        assert!(adapter.can_handle(series));
        assert!(adapter.is_detail_page(series));
        assert!(adapter.is_chapter_page(chapter));
        assert_eq!(adapter.series_url_from_chapter(chapter).as_deref(), Some(series));
        assert_eq!(adapter.series_url_from_chapter(series), None);
    }

    #[test]
    fn extracts_stub_page() {
        let adapter = WeebCentralAdapter::default();
        let page = HtmlPage::parse(
            "https://weebcentral.com/series/ABC123/My-Title?tab=info",
            r#"<html><head>
                 <meta property="og:image" content="https://x/cover.jpg">
               </head><body><img src="/static/brand.png" alt="brand"><h1>My Title</h1></body></html>"#,
        );
        let value = engine::evaluate(adapter.plan(), &page);

        assert_eq!(value["title"], "My Title");
        assert_eq!(value["coverImage"], "https://x/cover.jpg");
        assert_eq!(value["sourceUrl"], "https://weebcentral.com/series/ABC123/My-Title");
        assert_eq!(value["sourceWebsite"], "WeebCentral");
        assert_eq!(value["genres"], serde_json::json!(["Manga"]));
        assert_eq!(value["mangaStatus"], "ongoing");
        assert!(value.get("author").is_none());
    }

    #[test]
    fn title_falls_back_to_og_title_without_suffix() {
        let adapter = WeebCentralAdapter::default();
        let page = HtmlPage::parse(
            "https://weebcentral.com/series/X/Y",
            r#"<meta property="og:title" content="Kagurabachi | Weeb Central">"#,
        );
        assert_eq!(engine::evaluate(adapter.plan(), &page)["title"], "Kagurabachi");
    }
}
