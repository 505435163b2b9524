use super::patterns;
use crate::extractors::{
    ExtractionPlan, ListField, ListStrategy, PlanLimits, StatusField, StatusSource, Strategy,
    TextField,
};
use crate::traits::SiteAdapter;
use regex::Regex;

/// asuracomic.net and the older asurascans domains.
///
/// Series pages carry several `h1`s (site banner, "Summary" heading) and hero
/// artwork that outranks the cover in size, hence the stricter rejection list.
pub struct AsuraScansAdapter {
    patterns: Vec<Regex>,
    plan: ExtractionPlan,
}

impl AsuraScansAdapter {
    pub fn new(limits: PlanLimits) -> Self {
        let generic = ExtractionPlan::generic("AsuraScans", limits);
        let plan = ExtractionPlan {
            description: TextField::new(vec![
                Strategy::meta(&["og:description", "description"]),
                Strategy::first_min(".description", 21),
                Strategy::first_min("[class*=\"description\"]", 21),
                Strategy::first_min(".summary", 21),
                Strategy::first_min("[class*=\"summary\"]", 21),
                Strategy::first_min("p", 101),
            ]),
            cover_image: TextField::new(vec![
                Strategy::image_by_alt(&["cover"], true),
                Strategy::large_image(150, 200),
                Strategy::meta(&["og:image"]),
            ])
            .reject(&["logo", "bg.png", "background", "toraka-hero"]),
            genres: ListField::new(vec![
                ListStrategy::all("a[href*=\"genre\"]"),
                ListStrategy::all(".genres a"),
                ListStrategy::all("[class*=\"genre\"] a"),
            ]),
            status: StatusField::new(vec![
                StatusSource::element("[class*=\"status\"]"),
                StatusSource::element(".post-status span"),
            ]),
            ..generic
        };

        Self {
            patterns: patterns(&[r"(?i)asuracomic\.net/series", r"(?i)asurascans\."]),
            plan,
        }
    }
}

impl Default for AsuraScansAdapter {
    fn default() -> Self {
        Self::new(PlanLimits::default())
    }
}

impl SiteAdapter for AsuraScansAdapter {
    fn name(&self) -> &'static str {
        "AsuraScans"
    }

    fn url_patterns(&self) -> &[Regex] {
        &self.patterns
    }

    fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }
}
