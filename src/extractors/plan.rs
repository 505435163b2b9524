//! Extraction plans: per-site fallback chains expressed as data.
//!
//! A plan is interpreted twice by the same rules: inside the page by the
//! rendered script (see [`super::script`]) and in-process by [`super::engine`].

use crate::config::ExtractionConfig;
use crate::models::MangaStatus;
use serde::Serialize;

pub const DEFAULT_DESCRIPTION_LIMIT: usize = 500;
pub const DEFAULT_MAX_GENRES: usize = 5;

/// Characters stripped from the end of list entries such as genre links.
pub const LIST_TRAILING_PUNCTUATION: &[char] = &[',', ';', ':', '.', '·'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub description_limit: usize,
    pub max_genres: usize,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
            max_genres: DEFAULT_MAX_GENRES,
        }
    }
}

impl From<&ExtractionConfig> for PlanLimits {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            description_limit: config.description_limit,
            max_genres: config.max_genres,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionPlan {
    pub site: String,
    pub title: TextField,
    pub description: TextField,
    pub cover_image: TextField,
    pub author: TextField,
    pub artist: TextField,
    pub genres: ListField,
    pub status: StatusField,
    pub source_url: UrlRule,
    pub description_limit: usize,
    pub max_genres: usize,
}

/// One way of producing a candidate value for a text field.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Text of the first match at least `min_len` characters long.
    First { selector: String, min_len: usize },
    /// Longest text among all matches, ignoring the `exclude` values.
    Longest { selector: String, exclude: Vec<String> },
    /// Attribute of the first match carrying a usable value.
    Attr { selector: String, attr: String },
    /// `<meta property=..>` or `<meta name=..>` content, keys tried in order.
    Meta { keys: Vec<String> },
    /// Document title, first segment before `|` or a spaced dash.
    DocumentTitle,
    /// Image whose alt text names a keyword or the extracted title.
    ImageByAlt { keywords: Vec<String>, include_title: bool },
    /// First image strictly larger than the given size.
    LargeImage { min_width: u32, min_height: u32 },
    /// `Label: value` rows, value taken after the first colon.
    Labelled { selector: String, label: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextField {
    pub strategies: Vec<Strategy>,
    /// Case-insensitive tokens that disqualify a candidate (branding, placeholders).
    pub reject: Vec<String>,
    /// Literal fragments removed from a candidate before it is judged.
    pub clean: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListStrategy {
    All { selector: String },
    First { selector: String },
    Fixed { values: Vec<String> },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListField {
    pub strategies: Vec<ListStrategy>,
    /// Values always added after the winning strategy's output.
    pub append: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusSource {
    Element { selector: String },
    Labelled { selector: String, label: String },
    Fixed { status: MangaStatus },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusField {
    pub sources: Vec<StatusSource>,
    pub default: MangaStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct UrlRule {
    /// Canonical path ending (e.g. `/list`) forced onto the source URL.
    pub canonical_suffix: Option<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Strategy {
    pub fn first(selector: &str) -> Self {
        Strategy::First {
            selector: selector.to_string(),
            min_len: 1,
        }
    }

    pub fn first_min(selector: &str, min_len: usize) -> Self {
        Strategy::First {
            selector: selector.to_string(),
            min_len,
        }
    }

    pub fn longest(selector: &str, exclude: &[&str]) -> Self {
        Strategy::Longest {
            selector: selector.to_string(),
            exclude: owned(exclude),
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Strategy::Attr {
            selector: selector.to_string(),
            attr: attr.to_string(),
        }
    }

    pub fn meta(keys: &[&str]) -> Self {
        Strategy::Meta { keys: owned(keys) }
    }

    pub fn image_by_alt(keywords: &[&str], include_title: bool) -> Self {
        Strategy::ImageByAlt {
            keywords: owned(keywords),
            include_title,
        }
    }

    pub fn large_image(min_width: u32, min_height: u32) -> Self {
        Strategy::LargeImage { min_width, min_height }
    }

    pub fn labelled(selector: &str, label: &str) -> Self {
        Strategy::Labelled {
            selector: selector.to_string(),
            label: label.to_string(),
        }
    }
}

impl TextField {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self {
            strategies,
            reject: Vec::new(),
            clean: Vec::new(),
        }
    }

    pub fn reject(mut self, tokens: &[&str]) -> Self {
        self.reject = owned(tokens);
        self
    }

    pub fn clean(mut self, fragments: &[&str]) -> Self {
        self.clean = owned(fragments);
        self
    }

    pub fn is_rejected(&self, value: &str) -> bool {
        contains_any_token(value, &self.reject)
    }

    /// Removes `clean` fragments, collapses whitespace and drops trailing commas.
    pub fn tidy(&self, value: &str) -> String {
        let mut text = value.to_string();
        for fragment in &self.clean {
            text = text.replace(fragment.as_str(), "");
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed
            .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
            .trim()
            .to_string()
    }
}

impl ListField {
    pub fn new(strategies: Vec<ListStrategy>) -> Self {
        Self {
            strategies,
            append: Vec::new(),
        }
    }

    pub fn append(mut self, values: &[&str]) -> Self {
        self.append = owned(values);
        self
    }
}

impl ListStrategy {
    pub fn all(selector: &str) -> Self {
        ListStrategy::All {
            selector: selector.to_string(),
        }
    }

    pub fn first(selector: &str) -> Self {
        ListStrategy::First {
            selector: selector.to_string(),
        }
    }

    pub fn fixed(values: &[&str]) -> Self {
        ListStrategy::Fixed { values: owned(values) }
    }
}

impl StatusField {
    pub fn new(sources: Vec<StatusSource>) -> Self {
        Self {
            sources,
            default: MangaStatus::Ongoing,
        }
    }

    pub fn fixed(status: MangaStatus) -> Self {
        Self::new(vec![StatusSource::Fixed { status }])
    }
}

impl StatusSource {
    pub fn element(selector: &str) -> Self {
        StatusSource::Element {
            selector: selector.to_string(),
        }
    }

    pub fn labelled(selector: &str, label: &str) -> Self {
        StatusSource::Labelled {
            selector: selector.to_string(),
            label: label.to_string(),
        }
    }
}

impl UrlRule {
    pub fn canonical(suffix: &str) -> Self {
        Self {
            canonical_suffix: Some(suffix.to_string()),
        }
    }

    /// Strips query and fragment, then forces the canonical suffix if one is set.
    pub fn normalize(&self, location: &str) -> String {
        let base = location.split('#').next().unwrap_or_default();
        let mut url = base.split('?').next().unwrap_or_default().to_string();

        if let Some(suffix) = self.canonical_suffix.as_deref() {
            if !url.ends_with(suffix) {
                let head = url.split(suffix).next().unwrap_or_default();
                url = format!("{}{}", head.trim_end_matches('/'), suffix);
            }
        }
        url
    }
}

impl ExtractionPlan {
    /// Chains that work on most manga sites: headings, OpenGraph tags and the
    /// document title, with logo and background artwork excluded from covers.
    pub fn generic(site: &str, limits: PlanLimits) -> Self {
        Self {
            site: site.to_string(),
            title: TextField::new(vec![
                Strategy::longest("h1", &["summary"]),
                Strategy::meta(&["og:title", "title"]),
                Strategy::DocumentTitle,
            ]),
            description: TextField::new(vec![
                Strategy::meta(&["og:description", "description"]),
                Strategy::first_min("[class*=\"description\"]", 21),
                Strategy::first_min("[class*=\"summary\"]", 21),
                Strategy::first_min("p", 21),
            ]),
            cover_image: TextField::new(vec![
                Strategy::image_by_alt(&["cover"], true),
                Strategy::large_image(150, 200),
                Strategy::meta(&["og:image"]),
            ])
            .reject(&["logo", "background"]),
            author: TextField::new(vec![
                Strategy::first("a[href*=\"author\"]"),
                Strategy::first("[class*=\"author\"]"),
            ]),
            artist: TextField::new(vec![Strategy::first("a[href*=\"artist\"]")]),
            genres: ListField::new(vec![
                ListStrategy::all("a[href*=\"genre\"]"),
                ListStrategy::all(".genres a"),
            ]),
            status: StatusField::new(vec![StatusSource::element("[class*=\"status\"]")]),
            source_url: UrlRule::default(),
            description_limit: limits.description_limit,
            max_genres: limits.max_genres,
        }
    }
}

pub fn contains_any_token(value: &str, tokens: &[String]) -> bool {
    let value = value.to_lowercase();
    tokens
        .iter()
        .any(|token| !token.is_empty() && value.contains(&token.to_lowercase()))
}

/// Trims entries, strips trailing punctuation, drops blanks and duplicates, caps the length.
pub fn normalize_list(values: Vec<String>, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value
            .trim()
            .trim_end_matches(|c: char| LIST_TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
            .trim()
            .to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out.truncate(max);
    out
}
