use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata scraped from a manga detail page.
///
/// `title`, `source_url` and `source_website` are required; a payload missing any
/// of them is discarded as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    pub title: String,
    pub source_url: String,
    pub source_website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manga_status: Option<MangaStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chapters: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chapter_added: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MangaStatus {
    #[default]
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    Reading,
    #[default]
    PlanToRead,
    Completed,
    OnHold,
    Dropped,
}

/// Body of a progress write issued to the library backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub last_read_url: String,
    pub current_chapter: String,
    pub status: ReadingStatus,
}

/// A library record as returned by the backend. Owned by the backend; only read here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default = "default_chapter")]
    pub current_chapter: String,
    #[serde(default)]
    pub last_read_url: Option<String>,
    #[serde(default)]
    pub status: ReadingStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub last_read_at: Option<DateTime<Utc>>,
}

fn default_chapter() -> String {
    "0".to_string()
}

/// Navigation snapshot reported by the page-viewer host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub url: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub loading: bool,
}

/// Outcome of an adapter's metadata rules. Lists every violated rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl MangaStatus {
    /// Maps free text from a status badge onto a status, if any keyword matches.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains("ongoing") {
            Some(MangaStatus::Ongoing)
        } else if text.contains("completed") || text.contains("complete") || text.contains("finished") {
            Some(MangaStatus::Completed)
        } else if text.contains("hiatus") {
            Some(MangaStatus::Hiatus)
        } else if text.contains("cancelled") || text.contains("canceled") || text.contains("dropped") {
            Some(MangaStatus::Cancelled)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MangaStatus::Ongoing => "ongoing",
            MangaStatus::Completed => "completed",
            MangaStatus::Hiatus => "hiatus",
            MangaStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for MangaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExtractedMetadata {
    pub fn new(title: &str, source_url: &str, source_website: &str) -> Self {
        Self {
            title: title.to_string(),
            source_url: source_url.to_string(),
            source_website: source_website.to_string(),
            ..Default::default()
        }
    }

    /// Builds metadata from an untyped JSON object, tolerating wrong or missing
    /// optional fields. Returns `None` when a required field is absent or blank.
    pub fn from_json_object(object: &Map<String, Value>, max_genres: usize) -> Option<Self> {
        let title = non_empty_string(object.get("title"))?;
        let source_url = non_empty_string(object.get("sourceUrl"))?;
        let source_website = non_empty_string(object.get("sourceWebsite"))?;

        let mut genres = string_list(object.get("genres"));
        genres.truncate(max_genres);

        Some(Self {
            title,
            source_url,
            source_website,
            description: non_empty_string(object.get("description")),
            author: non_empty_string(object.get("author")),
            artist: non_empty_string(object.get("artist")),
            cover_image: non_empty_string(object.get("coverImage")),
            genres,
            manga_status: object
                .get("mangaStatus")
                .and_then(Value::as_str)
                .and_then(MangaStatus::from_text),
            total_chapters: object
                .get("totalChapters")
                .and_then(number)
                .filter(|n| (0.0..=f64::from(u32::MAX)).contains(n))
                .map(|n| n as u32),
            alternative_titles: string_list(object.get("alternativeTitles")),
            last_chapter_added: non_empty_string(object.get("lastChapterAdded")),
            rating: object.get("rating").and_then(number),
        })
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| non_empty_string(Some(item)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Finite numbers only; `"NaN"` or `"1e400"` in a string count as absent.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn status_keywords() {
        assert_eq!(MangaStatus::from_text("Status: Ongoing"), Some(MangaStatus::Ongoing));
        assert_eq!(MangaStatus::from_text("FINISHED"), Some(MangaStatus::Completed));
        assert_eq!(MangaStatus::from_text("on hiatus"), Some(MangaStatus::Hiatus));
        assert_eq!(MangaStatus::from_text("Dropped"), Some(MangaStatus::Cancelled));
        assert_eq!(MangaStatus::from_text("every monday"), None);
    }

    #[test]
    fn blank_required_field_rejects_object() {
        let data = object(json!({"title": "  ", "sourceUrl": "u", "sourceWebsite": "s"}));
        assert!(ExtractedMetadata::from_json_object(&data, 5).is_none());
    }

    #[test]
    fn optional_fields_are_lenient() {
        let data = object(json!({
            "title": "Solo Leveling",
            "sourceUrl": "https://mangafire.to/manga/solo-leveling",
            "sourceWebsite": "MangaFire",
            "description": "",
            "genres": ["Action", "", 3, "Fantasy", "A", "B", "C", "D"],
            "mangaStatus": "unknown",
            "totalChapters": "201",
            "rating": "x"
        }));
        let metadata = ExtractedMetadata::from_json_object(&data, 5).unwrap();
        assert_eq!(metadata.description, None);
        assert_eq!(metadata.genres, vec!["Action", "3", "Fantasy", "A", "B"]);
        assert_eq!(metadata.manga_status, None);
        assert_eq!(metadata.total_chapters, Some(201));
        assert_eq!(metadata.rating, None);
    }

    #[test]
    fn non_finite_numbers_are_dropped() {
        for (rating, chapters) in [("1e400", "1e400"), ("NaN", "NaN"), ("-inf", "1e12")] {
            let data = object(json!({
                "title": "T",
                "sourceUrl": "https://x",
                "sourceWebsite": "X",
                "rating": rating,
                "totalChapters": chapters
            }));
            let metadata = ExtractedMetadata::from_json_object(&data, 5).unwrap();
            assert_eq!(metadata.rating, None, "rating {}", rating);
            assert_eq!(metadata.total_chapters, None, "chapters {}", chapters);
        }

        let data = object(json!({"title": "T", "sourceUrl": "u", "sourceWebsite": "X", "rating": "4.5"}));
        assert_eq!(ExtractedMetadata::from_json_object(&data, 5).unwrap().rating, Some(4.5));
    }

    #[test]
    fn serializes_wire_names() {
        let metadata = ExtractedMetadata {
            title: "T".into(),
            source_url: "https://x".into(),
            source_website: "WeebCentral".into(),
            manga_status: Some(MangaStatus::Hiatus),
            ..Default::default()
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["sourceUrl"], "https://x");
        assert_eq!(value["mangaStatus"], "hiatus");
        assert!(value.get("coverImage").is_none());
    }

    #[test]
    fn reading_status_is_kebab_case() {
        let update = ProgressUpdate {
            last_read_url: "u".into(),
            current_chapter: "12".into(),
            status: ReadingStatus::Reading,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"lastReadUrl": "u", "currentChapter": "12", "status": "reading"})
        );
        assert_eq!(serde_json::to_value(ReadingStatus::PlanToRead).unwrap(), "plan-to-read");
    }
}
