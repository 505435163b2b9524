use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

/// Read-only view of a loaded page, the only thing extraction plans may touch.
pub trait Dom {
    fn location(&self) -> &str;

    /// Trimmed text content of every element matching `selector`.
    /// Invalid selectors match nothing.
    fn texts(&self, selector: &str) -> Vec<String>;

    /// Trimmed attribute values of matching elements; `src`/`href` resolve against the location.
    fn attrs(&self, selector: &str, attr: &str) -> Vec<String>;

    /// First non-empty `content` of `<meta property=key>` then `<meta name=key>`.
    fn meta(&self, key: &str) -> Option<String>;

    fn document_title(&self) -> Option<String>;

    fn images(&self) -> Vec<ImageInfo>;
}

/// A parsed HTML document standing in for the live page.
///
/// Image sizes come from `width`/`height` attributes since there is no layout.
pub struct HtmlPage {
    location: String,
    base: Option<Url>,
    document: Html,
}

impl HtmlPage {
    pub fn parse(location: impl Into<String>, html: &str) -> Self {
        let location = location.into();
        let base = Url::parse(&location).ok();
        Self {
            location,
            base,
            document: Html::parse_document(html),
        }
    }

    fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(parsed) => self.document.select(&parsed).collect(),
            Err(e) => {
                debug!("[DOM] Ignoring invalid selector {:?}: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    fn resolve(&self, value: &str) -> String {
        match &self.base {
            Some(base) if !value.is_empty() => base
                .join(value)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| value.to_string()),
            _ => value.to_string(),
        }
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn dimension(value: Option<&str>) -> u32 {
    value
        .map(|v| v.trim().chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

impl Dom for HtmlPage {
    fn location(&self) -> &str {
        &self.location
    }

    fn texts(&self, selector: &str) -> Vec<String> {
        self.select(selector).iter().map(element_text).collect()
    }

    fn attrs(&self, selector: &str, attr: &str) -> Vec<String> {
        self.select(selector)
            .iter()
            .map(|el| {
                let value = el.value().attr(attr).unwrap_or_default().trim();
                if attr == "src" || attr == "href" {
                    self.resolve(value)
                } else {
                    value.to_string()
                }
            })
            .collect()
    }

    fn meta(&self, key: &str) -> Option<String> {
        ["property", "name"].iter().find_map(|kind| {
            self.select(&format!("meta[{}=\"{}\"]", kind, key))
                .iter()
                .filter_map(|el| el.value().attr("content"))
                .map(|content| content.trim().to_string())
                .find(|content| !content.is_empty())
        })
    }

    fn document_title(&self) -> Option<String> {
        self.select("title")
            .first()
            .map(element_text)
            .filter(|title| !title.is_empty())
    }

    fn images(&self) -> Vec<ImageInfo> {
        self.select("img")
            .iter()
            .map(|img| {
                let attrs = img.value();
                ImageInfo {
                    src: self.resolve(attrs.attr("src").unwrap_or_default().trim()),
                    alt: attrs.attr("alt").unwrap_or_default().trim().to_string(),
                    width: dimension(attrs.attr("width")),
                    height: dimension(attrs.attr("height")),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
          <title>Omniscient Reader | Asura Scans</title>
          <meta property="og:title" content="  Omniscient Reader ">
          <meta name="description" content="">
          <meta property="og:description" content="Only I know the end.">
        </head><body>
          <h1> Omniscient Reader </h1>
          <img src="/images/cover.webp" alt="Omniscient Reader cover" width="240px" height="320">
          <img src="https://cdn.example/logo.png">
        </body></html>
    "#;

    #[test]
    fn reads_meta_by_property_then_name() {
        let page = HtmlPage::parse("https://asuracomic.net/series/omniscient-reader", PAGE);
        assert_eq!(page.meta("og:title").as_deref(), Some("Omniscient Reader"));
        assert_eq!(page.meta("description"), None);
        assert_eq!(page.meta("og:description").as_deref(), Some("Only I know the end."));
    }

    #[test]
    fn resolves_relative_image_sources() {
        let page = HtmlPage::parse("https://asuracomic.net/series/omniscient-reader", PAGE);
        let images = page.images();
        assert_eq!(images[0].src, "https://asuracomic.net/images/cover.webp");
        assert_eq!((images[0].width, images[0].height), (240, 320));
        assert_eq!(images[1].width, 0);
    }

    #[test]
    fn invalid_selector_matches_nothing() {
        let page = HtmlPage::parse("https://asuracomic.net/", PAGE);
        assert!(page.texts("div:contains(\"Author\")").is_empty());
        assert_eq!(page.texts("h1"), vec!["Omniscient Reader"]);
        assert_eq!(page.document_title().as_deref(), Some("Omniscient Reader | Asura Scans"));
    }
}
