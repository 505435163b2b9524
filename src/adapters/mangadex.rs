use super::patterns;
use crate::extractors::{ExtractionPlan, ListField, ListStrategy, PlanLimits, Strategy, TextField};
use crate::traits::SiteAdapter;
use regex::Regex;

/// mangadex.org title pages.
pub struct MangaDexAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl MangaDexAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("MangaDex", limits);
        let plan = ExtractionPlan {
            title: TextField::new(vec![
                Strategy::first("h1.text-3xl"),
                Strategy::first("h1[class*=\"title\"]"),
                Strategy::meta(&["og:title"]),
                Strategy::DocumentTitle,
            ]),
            description: TextField::new(vec![
                Strategy::first("[class*=\"description\"]"),
                Strategy::first(".text-sm.leading-relaxed"),
                Strategy::meta(&["og:description", "description"]),
            ]),
            cover_image: TextField::new(vec![
                Strategy::attr("img[alt*=\"cover\"]", "src"),
                Strategy::attr(".rounded.shadow-md", "src"),
                Strategy::meta(&["og:image"]),
            ])
            .reject(&["logo"]),
            author: TextField::new(vec![Strategy::first("a[href*=\"/author/\"]")]),
            artist: TextField::new(vec![Strategy::first("a[href*=\"/artist/\"]")]),
            genres: ListField::new(vec![ListStrategy::all("a[href*=\"/tag/\"]")]),
            ..generic
        };

        Self {
            patterns: patterns(&[r"(?i)mangadex\.org/title/[a-f0-9-]+"]),
            plan,
        }
    }
}

impl Default for MangaDexAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for MangaDexAdapter {
    fn name(&self) -> &'static str {
        "MangaDex"
    }

    fn url_patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{engine, HtmlPage};

    #[test]
    fn extracts_title_page() {
        let adapter = MangaDexAdapter::default();
        let url = "https://mangadex.org/title/32d76d19-8a05-4db0-9fc2-e0b0648fe9d0/solo-leveling";
        assert!(adapter.is_detail_page(url));
        assert!(!adapter.can_handle("https://mangadex.org/chapter/5f1b0a6e"));

        let page = HtmlPage::parse(
            url,
            r#"
            <img class="rounded shadow-md" src="https://mangadex.org/covers/32d7/a.jpg" alt="Cover image">
            <h1 class="text-3xl">Solo Leveling</h1>
            <a href="/author/1">Chugong</a><a href="/artist/2">DUBU (REDICE STUDIO)</a>
            <a href="/tag/action">Action</a><a href="/tag/fantasy">Fantasy</a>
            <span class="status-tag">Publication: 2018, Completed</span>
            "#,
        );
        let value = engine::evaluate(adapter.plan(), &page);

        assert_eq!(value["title"], "Solo Leveling");
        assert_eq!(value["author"], "Chugong");
        assert_eq!(value["artist"], "DUBU (REDICE STUDIO)");
        assert_eq!(value["coverImage"], "https://mangadex.org/covers/32d7/a.jpg");
        assert_eq!(value["genres"], serde_json::json!(["Action", "Fantasy"]));
        assert_eq!(value["mangaStatus"], "completed");
    }
}
