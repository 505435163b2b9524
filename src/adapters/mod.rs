pub mod asura;
pub mod debug;
pub mod mangadex;
pub mod mangafire;
pub mod mangakakalot;
pub mod mangaplus;
pub mod webtoons;
pub mod weebcentral;

use crate::extractors::PlanLimits;
use crate::traits::SiteAdapter;
use regex::Regex;

pub use asura::AsuraScansAdapter;
pub use debug::DebugAdapter;
pub use mangadex::MangaDexAdapter;
pub use mangafire::MangaFireAdapter;
pub use mangakakalot::MangaKakalotAdapter;
pub use mangaplus::MangaPlusAdapter;
pub use webtoons::WebtoonsAdapter;
pub use weebcentral::WeebCentralAdapter;

/// Built-in site adapters in priority order. Earlier entries win on overlapping patterns.
pub fn builtin(limits: PlanLimits) -> Vec<Box<dyn SiteAdapter>> {
    vec![
        Box::new(WebtoonsAdapter::new(limits)),
        Box::new(AsuraScansAdapter::new(limits)),
        Box::new(MangaFireAdapter::new(limits)),
        Box::new(WeebCentralAdapter::new(limits)),
        Box::new(MangaDexAdapter::new(limits)),
        Box::new(MangaKakalotAdapter::new(limits)),
        Box::new(MangaPlusAdapter::new(limits)),
    ]
}

/// Compiles constant adapter patterns.
pub(crate) fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|p| Regex::new(p).unwrap()).collect()
}
