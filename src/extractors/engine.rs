//! In-process interpreter for extraction plans.
//!
//! Mirrors the page-side runtime rule for rule so a plan can be checked
//! against saved HTML without a browser.

use super::dom::Dom;
use super::plan::{
    contains_any_token, normalize_list, ExtractionPlan, ListField, ListStrategy, StatusField,
    StatusSource, Strategy, TextField,
};
use crate::models::MangaStatus;
use serde_json::{Map, Value};
use tracing::debug;

/// Runs `plan` against `dom`, producing the same JSON object the injected script posts.
pub fn evaluate(plan: &ExtractionPlan, dom: &dyn Dom) -> Value {
    let mut data = Map::new();

    let title = text_field(&plan.title, dom, "").unwrap_or_default();
    debug!("[ENGINE] {} title={:?}", plan.site, title);

    if let Some(description) = text_field(&plan.description, dom, &title) {
        let truncated: String = description.chars().take(plan.description_limit).collect();
        data.insert("description".into(), Value::String(truncated));
    }
    if let Some(cover) = text_field(&plan.cover_image, dom, &title) {
        data.insert("coverImage".into(), Value::String(cover));
    }
    if let Some(author) = text_field(&plan.author, dom, &title) {
        data.insert("author".into(), Value::String(author));
    }
    if let Some(artist) = text_field(&plan.artist, dom, &title) {
        data.insert("artist".into(), Value::String(artist));
    }

    let genres = list_field(&plan.genres, dom, plan.max_genres);
    if !genres.is_empty() {
        data.insert(
            "genres".into(),
            Value::Array(genres.into_iter().map(Value::String).collect()),
        );
    }

    data.insert(
        "mangaStatus".into(),
        Value::String(status_field(&plan.status, dom).as_str().to_string()),
    );
    if !title.is_empty() {
        data.insert("title".into(), Value::String(title));
    }
    data.insert(
        "sourceUrl".into(),
        Value::String(plan.source_url.normalize(dom.location())),
    );
    data.insert("sourceWebsite".into(), Value::String(plan.site.clone()));

    Value::Object(data)
}

/// Serialized form of [`evaluate`], i.e. the message the page would send.
pub fn evaluate_to_message(plan: &ExtractionPlan, dom: &dyn Dom) -> String {
    evaluate(plan, dom).to_string()
}

/// Tries each strategy in order; the first tidy, non-rejected, non-empty value wins.
pub fn text_field(field: &TextField, dom: &dyn Dom, title: &str) -> Option<String> {
    field.strategies.iter().find_map(|strategy| {
        let raw = candidate(strategy, field, dom, title)?;
        let value = field.tidy(&raw);
        if value.is_empty() || field.is_rejected(&value) {
            debug!("[ENGINE] Discarded candidate {:?} from {:?}", raw, strategy);
            None
        } else {
            Some(value)
        }
    })
}

fn candidate(strategy: &Strategy, field: &TextField, dom: &dyn Dom, title: &str) -> Option<String> {
    let usable = |value: &str| !value.is_empty() && !field.is_rejected(value);

    match strategy {
        Strategy::First { selector, min_len } => dom
            .texts(selector)
            .into_iter()
            .find(|text| text.chars().count() >= (*min_len).max(1) && usable(text)),
        Strategy::Longest { selector, exclude } => {
            let best = dom
                .texts(selector)
                .into_iter()
                .filter(|text| usable(text))
                .filter(|text| !exclude.iter().any(|ex| ex.eq_ignore_ascii_case(text)))
                // Ties keep the earliest heading.
                .fold(String::new(), |best, text| {
                    if text.chars().count() > best.chars().count() {
                        text
                    } else {
                        best
                    }
                });
            (!best.is_empty()).then_some(best)
        }
        Strategy::Attr { selector, attr } => dom
            .attrs(selector, attr)
            .into_iter()
            .find(|value| usable(value)),
        Strategy::Meta { keys } => keys
            .iter()
            .filter_map(|key| dom.meta(key))
            .find(|value| usable(value)),
        Strategy::DocumentTitle => dom.document_title().map(|title| first_title_segment(&title)),
        Strategy::ImageByAlt {
            keywords,
            include_title,
        } => {
            let title = title.to_lowercase();
            dom.images()
                .into_iter()
                .find(|img| {
                    let alt = img.alt.to_lowercase();
                    let named = keywords.iter().any(|k| alt.contains(&k.to_lowercase()))
                        || (*include_title && !title.is_empty() && alt.contains(&title));
                    !alt.is_empty() && named && !field.is_rejected(&img.alt) && usable(&img.src)
                })
                .map(|img| img.src)
        }
        Strategy::LargeImage {
            min_width,
            min_height,
        } => dom
            .images()
            .into_iter()
            .find(|img| img.width > *min_width && img.height > *min_height && usable(&img.src))
            .map(|img| img.src),
        Strategy::Labelled { selector, label } => dom
            .texts(selector)
            .into_iter()
            .filter(|text| text.to_lowercase().contains(&label.to_lowercase()))
            .filter_map(|text| text.split_once(':').map(|(_, value)| value.trim().to_string()))
            .find(|value| usable(value)),
    }
}

/// `"Solo Leveling | MangaFire"` → `"Solo Leveling"`. Hyphens inside words are kept.
pub fn first_title_segment(title: &str) -> String {
    let head = title.split('|').next().unwrap_or_default();
    let head = head.split(" - ").next().unwrap_or_default();
    let head = head.split(" – ").next().unwrap_or_default();
    head.trim().to_string()
}

pub fn list_field(field: &ListField, dom: &dyn Dom, max: usize) -> Vec<String> {
    let mut values = field
        .strategies
        .iter()
        .map(|strategy| match strategy {
            ListStrategy::All { selector } => dom
                .texts(selector)
                .into_iter()
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>(),
            ListStrategy::First { selector } => dom
                .texts(selector)
                .into_iter()
                .filter(|t| !t.is_empty())
                .take(1)
                .collect(),
            ListStrategy::Fixed { values } => values.clone(),
        })
        .find(|values| !values.is_empty())
        .unwrap_or_default();

    values.extend(field.append.iter().cloned());
    normalize_list(values, max)
}

pub fn status_field(field: &StatusField, dom: &dyn Dom) -> MangaStatus {
    field
        .sources
        .iter()
        .find_map(|source| match source {
            StatusSource::Element { selector } => dom
                .texts(selector)
                .into_iter()
                .next()
                .and_then(|text| MangaStatus::from_text(&text)),
            StatusSource::Labelled { selector, label } => dom
                .texts(selector)
                .into_iter()
                .find(|text| contains_any_token(text, std::slice::from_ref(label)))
                .and_then(|text| MangaStatus::from_text(&text)),
            StatusSource::Fixed { status } => Some(*status),
        })
        .unwrap_or(field.default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::dom::HtmlPage;
    use crate::extractors::plan::{PlanLimits, UrlRule};

    fn generic() -> ExtractionPlan {
        ExtractionPlan::generic("Test", PlanLimits::default())
    }

    #[test]
    fn longest_heading_wins_and_summary_is_ignored() {
        let page = HtmlPage::parse(
            "https://asuracomic.net/series/x",
            "<h1>summary</h1><h1>Nano Machine</h1><h1>Comments</h1>",
        );
        assert_eq!(
            text_field(&generic().title, &page, "").as_deref(),
            Some("Nano Machine")
        );
    }

    #[test]
    fn title_falls_back_to_document_title() {
        let page = HtmlPage::parse(
            "https://asuracomic.net/series/x",
            "<title>Nano Machine - Asura Scans</title><h1>   </h1>",
        );
        assert_eq!(
            text_field(&generic().title, &page, "").as_deref(),
            Some("Nano Machine")
        );
    }

    #[test]
    fn cover_skips_branding_and_prefers_alt_match() {
        let page = HtmlPage::parse(
            "https://asuracomic.net/series/x",
            r#"
            <img src="/logo.png" alt="Nano Machine logo" width="600" height="600">
            <img src="/bg/background.jpg" width="900" height="900">
            <img src="/c/nano.webp" alt="Nano Machine" width="100" height="100">
            "#,
        );
        let plan = generic();
        assert_eq!(
            text_field(&plan.cover_image, &page, "Nano Machine").as_deref(),
            Some("https://asuracomic.net/c/nano.webp")
        );
    }

    #[test]
    fn cover_falls_back_to_large_image_then_meta() {
        let large = HtmlPage::parse(
            "https://x.test/",
            r#"<img src="/small.jpg" width="50" height="50"><img src="/big.jpg" width="200" height="300">"#,
        );
        assert_eq!(
            text_field(&generic().cover_image, &large, "").as_deref(),
            Some("https://x.test/big.jpg")
        );

        let meta_only = HtmlPage::parse(
            "https://x.test/",
            r#"<meta property="og:image" content="https://x.test/site-logo.png">"#,
        );
        assert_eq!(text_field(&generic().cover_image, &meta_only, ""), None);
    }

    #[test]
    fn description_prefers_meta_and_is_truncated() {
        let long = "a".repeat(800);
        let page = HtmlPage::parse(
            "https://x.test/series/y",
            &format!(r#"<meta name="description" content="{}"><p>short</p>"#, long),
        );
        let value = evaluate(&generic(), &page);
        assert_eq!(value["description"].as_str().map(|d| d.len()), Some(500));
    }

    #[test]
    fn description_paragraph_needs_minimum_length() {
        let page = HtmlPage::parse(
            "https://x.test/series/y",
            "<p>Too short.</p><p>This paragraph is comfortably long enough.</p>",
        );
        assert_eq!(
            text_field(&generic().description, &page, "").as_deref(),
            Some("This paragraph is comfortably long enough.")
        );
    }

    #[test]
    fn genres_deduplicated_and_capped() {
        let page = HtmlPage::parse(
            "https://x.test/series/y",
            r#"
            <a href="/genre/action">Action,</a><a href="/genre/action">Action</a>
            <a href="/genre/a">Adventure</a><a href="/genre/b">Drama</a>
            <a href="/genre/c">Fantasy</a><a href="/genre/d">Isekai</a><a href="/genre/e">Magic</a>
            "#,
        );
        assert_eq!(
            list_field(&generic().genres, &page, 5),
            vec!["Action", "Adventure", "Drama", "Fantasy", "Isekai"]
        );
    }

    #[test]
    fn status_defaults_to_ongoing_when_ambiguous() {
        let unknown = HtmlPage::parse("https://x.test/", r#"<span class="status-x">Weekly</span>"#);
        assert_eq!(status_field(&generic().status, &unknown), MangaStatus::Ongoing);

        let finished = HtmlPage::parse("https://x.test/", r#"<span class="status">Finished</span>"#);
        assert_eq!(status_field(&generic().status, &finished), MangaStatus::Completed);
    }

    #[test]
    fn labelled_rows_yield_value_after_colon() {
        let field = TextField::new(vec![Strategy::labelled("li", "author")]);
        let page = HtmlPage::parse(
            "https://x.test/",
            "<ul><li>Name : One Piece</li><li>Author(s) : Oda Eiichiro</li></ul>",
        );
        assert_eq!(text_field(&field, &page, "").as_deref(), Some("Oda Eiichiro"));
    }

    #[test]
    fn missing_title_is_omitted_from_output() {
        let mut plan = generic();
        plan.source_url = UrlRule::default();
        let page = HtmlPage::parse("https://x.test/manga/y?ref=home", "<div></div>");
        let value = evaluate(&plan, &page);
        assert!(value.get("title").is_none());
        assert_eq!(value["sourceUrl"], "https://x.test/manga/y");
        assert_eq!(value["mangaStatus"], "ongoing");
    }

    #[test]
    fn title_segment_keeps_hyphenated_words() {
        assert_eq!(first_title_segment("Re-Monarch | WEBTOON"), "Re-Monarch");
        assert_eq!(first_title_segment("Re-Monarch - Manga Fire"), "Re-Monarch");
    }
}
