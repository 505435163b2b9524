//! Chapter-number and title heuristics for arbitrary manga URLs.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Trailing path segments at or above this are treated as ids, not chapters.
pub const MAX_PLAUSIBLE_CHAPTER: f64 = 10_000.0;

// /chapter-12, ?chapter=12, &episode_no=12
static NUMERIC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/chapter-(\d+(?:\.\d+)?)|[?&](?:chapter|episode_no)=(\d+(?:\.\d+)?)").unwrap()
});

static PATH_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(?:chapter|ch|episode|ep)/(\d+(?:\.\d+)?)").unwrap()
});

static READER_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/read/[^/]+/[^/]+/chapter-?(\d+(?:\.\d+)?)").unwrap()
});

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+(?:\.\d+)?)/?$").unwrap());

static TITLE_CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:Chapter|Ch\.?|Episode|Ep\.?)\s+(\d+(?:\.\d+)?)").unwrap()
});

static SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[-–—|]\s*(?:Asura\s*Scans?|Webtoons?|Manga\s*Fire|Weeb\s*Central|MangaDex|Manga\s*Kakalot|Manganato|MANGA\s*Plus)\s*$",
    )
    .unwrap()
});

static CHAPTER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:Chapter|Ch\.?|Episode|Ep\.?)\s+\d+(?:\.\d+)?\s*$").unwrap()
});

fn first_group(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)?
        .iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

/// Chapter number from a reader URL, falling back to a "Chapter N" pattern in
/// `title`. Decimal chapters such as `"150.5"` are kept verbatim.
pub fn extract_chapter_number(url: &str, title: Option<&str>) -> Option<String> {
    if let Some(found) = first_group(&NUMERIC_SUFFIX, url) {
        debug!("[CHAPTERS] {} -> {} (numeric suffix)", url, found);
        return Some(found);
    }
    if let Some(found) = first_group(&PATH_SEGMENT, url) {
        debug!("[CHAPTERS] {} -> {} (path segment)", url, found);
        return Some(found);
    }
    if let Some(found) = first_group(&READER_PATH, url) {
        debug!("[CHAPTERS] {} -> {} (reader path)", url, found);
        return Some(found);
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    if let Some(found) = first_group(&TRAILING_NUMBER, path) {
        let plausible = found
            .parse::<f64>()
            .map(|n| n > 0.0 && n < MAX_PLAUSIBLE_CHAPTER)
            .unwrap_or(false);
        if plausible {
            debug!("[CHAPTERS] {} -> {} (trailing number)", url, found);
            return Some(found);
        }
    }

    let found = title.and_then(|title| first_group(&TITLE_CHAPTER, title));
    if found.is_none() {
        debug!("[CHAPTERS] No chapter number in {}", url);
    }
    found
}

/// `"Swordmaster's Youngest Son Chapter 194 - Asura Scans"` → `"Swordmaster's Youngest Son"`.
///
/// Suffixes are stripped until none remain, so cleaning twice changes nothing.
pub fn clean_manga_title(title: &str) -> String {
    let mut current = title.trim().to_string();
    loop {
        let stripped = SITE_SUFFIX.replace(&current, "");
        let stripped = CHAPTER_SUFFIX.replace(&stripped, "");
        let stripped = stripped.trim();
        if stripped == current {
            return current;
        }
        current = stripped.to_string();
    }
}

pub fn format_chapter_display(chapter: &str) -> String {
    match chapter.trim() {
        "" | "0" => "Not started".to_string(),
        chapter => format!("Chapter {}", chapter),
    }
}

/// Percentage read, clamped to `0..=100`. Unknown totals and unparsable chapters give 0.
pub fn calculate_progress(current_chapter: &str, total_chapters: Option<u32>) -> u8 {
    let total = match total_chapters {
        Some(total) if total > 0 => f64::from(total),
        _ => return 0,
    };
    match current_chapter.trim().parse::<f64>() {
        Ok(current) if current.is_finite() && current > 0.0 => {
            (current / total * 100.0).round().clamp(0.0, 100.0) as u8
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_from_common_url_shapes() {
        let cases = [
            ("https://asuracomic.net/series/swordmasters-youngest-son-b62b5a15/chapter/194", "194"),
            ("https://mangafire.to/read/solo-leveling.1pv7/en/chapter-150.5", "150.5"),
            ("https://mangafire.to/manga/solo-leveling.1pv7?chapter=150", "150"),
            ("https://www.webtoons.com/en/fantasy/tog/ep-1/viewer?title_no=95&episode_no=12", "12"),
            ("https://mangaplus.shueisha.co.jp/ep/7", "7"),
            ("https://example.com/manga/berserk/364/", "364"),
        ];
        for (url, expected) in cases {
            assert_eq!(extract_chapter_number(url, None).as_deref(), Some(expected), "{}", url);
        }
    }

    #[test]
    fn large_trailing_ids_are_not_chapters() {
        assert_eq!(
            extract_chapter_number("https://mangaplus.shueisha.co.jp/viewer/1000486", None),
            None
        );
        assert_eq!(extract_chapter_number("https://example.com/manga/0", None), None);
    }

    #[test]
    fn title_is_last_resort() {
        let url = "https://weebcentral.com/chapters/01J76XYZ";
        assert_eq!(extract_chapter_number(url, None), None);
        assert_eq!(
            extract_chapter_number(url, Some("Kagurabachi Chapter 58.5 | Weeb Central")).as_deref(),
            Some("58.5")
        );
        assert_eq!(extract_chapter_number(url, Some("Match 5")), None);
    }

    #[test]
    fn title_cleaning() {
        assert_eq!(
            clean_manga_title("Swordmaster's Youngest Son Chapter 194 - Asura Scans"),
            "Swordmaster's Youngest Son"
        );
        assert_eq!(clean_manga_title("One Piece Ch. 1050"), "One Piece");
        assert_eq!(clean_manga_title("Re-Monarch - Manga Fire"), "Re-Monarch");
        assert_eq!(clean_manga_title("Solo Leveling - Asura Scans Chapter 3"), "Solo Leveling");
        assert_eq!(clean_manga_title("  "), "");
    }

    #[test]
    fn title_cleaning_is_idempotent() {
        for title in [
            "Solo Leveling - Asura Scans Chapter 3",
            "Tower of God Episode 12 | WEBTOON",
            "Berserk",
        ] {
            let once = clean_manga_title(title);
            assert_eq!(clean_manga_title(&once), once);
        }
    }

    #[test]
    fn display_and_progress() {
        assert_eq!(format_chapter_display("0"), "Not started");
        assert_eq!(format_chapter_display(""), "Not started");
        assert_eq!(format_chapter_display("194.5"), "Chapter 194.5");

        assert_eq!(calculate_progress("50", Some(200)), 25);
        assert_eq!(calculate_progress("250", Some(200)), 100);
        assert_eq!(calculate_progress("12", None), 0);
        assert_eq!(calculate_progress("12", Some(0)), 0);
        assert_eq!(calculate_progress("abc", Some(10)), 0);
    }
}
