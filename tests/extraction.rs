use mangashelf::config::{ExtractionConfig, TimingConfig};
use mangashelf::error::Result;
use mangashelf::extractors::{engine, HtmlPage};
use mangashelf::models::{ExtractedMetadata, LibraryEntry, NavigationState, ProgressUpdate, ReadingStatus};
use mangashelf::traits::{LibraryBackend, PageHost};
use mangashelf::{AdapterRegistry, ExtractionCoordinator, ExtractionFailure, MangaStatus, MetadataService};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SERIES_URL: &str = "https://weebcentral.com/series/ABC123/My-Title";
const STUB_PAGE: &str = r#"<html><head>
  <meta property="og:image" content="https://x/cover.jpg">
</head><body><h1>My Title</h1></body></html>"#;

/// Evaluates every injected script against a fixed HTML page and posts the
/// result back, like a web view would.
struct StubPage {
    html: &'static str,
    service: Arc<MetadataService>,
    posted: Mutex<Vec<String>>,
}

impl PageHost for StubPage {
    fn inject_script(&self, script: &str) -> Result<()> {
        assert!(script.contains("postMessage"));
        let url = SERIES_URL;
        let adapter = self.service.extractor_for_url(url).expect("adapter");
        let page = HtmlPage::parse(url, self.html);
        self.posted
            .lock()
            .unwrap()
            .push(engine::evaluate_to_message(adapter.plan(), &page));
        Ok(())
    }
}

#[derive(Default)]
struct MemoryLibrary {
    added: Mutex<Vec<(ExtractedMetadata, String, ReadingStatus)>>,
}

#[async_trait::async_trait]
impl LibraryBackend for MemoryLibrary {
    async fn add_entry(
        &self,
        metadata: &ExtractedMetadata,
        category_id: &str,
        status: ReadingStatus,
    ) -> Result<LibraryEntry> {
        self.added
            .lock()
            .unwrap()
            .push((metadata.clone(), category_id.to_string(), status));
        Ok(LibraryEntry {
            id: "entry-1".to_string(),
            category: None,
            current_chapter: "0".to_string(),
            last_read_url: None,
            status,
            progress: 0,
            last_read_at: None,
        })
    }

    async fn update_progress(&self, _: &str, _: &ProgressUpdate) -> Result<LibraryEntry> {
        unreachable!()
    }
}

#[tokio::test(start_paused = true)]
async fn weebcentral_page_end_to_end() {
    let service = Arc::new(MetadataService::new(ExtractionConfig::default()));
    let host = Arc::new(StubPage {
        html: STUB_PAGE,
        service: Arc::clone(&service),
        posted: Mutex::new(Vec::new()),
    });
    let coordinator = ExtractionCoordinator::new(
        Arc::clone(&service),
        host.clone(),
        TimingConfig::default(),
    );

    coordinator.on_navigation_state_change(NavigationState {
        url: SERIES_URL.to_string(),
        ..NavigationState::default()
    });
    tokio::time::sleep(Duration::from_secs(4)).await;

    let reply = host.posted.lock().unwrap().pop().expect("script was injected");
    let metadata = coordinator.on_message(&reply).expect("reply accepted");

    assert_eq!(metadata.title, "My Title");
    assert_eq!(metadata.source_url, SERIES_URL);
    assert_eq!(metadata.source_website, "WeebCentral");
    assert_eq!(metadata.cover_image.as_deref(), Some("https://x/cover.jpg"));
    assert_eq!(metadata.genres, vec!["Manga"]);
    assert_eq!(metadata.manga_status, Some(MangaStatus::Ongoing));

    let library = MemoryLibrary::default();
    let entry = coordinator.save_to_library(&library, "reading-list").await.unwrap();
    assert_eq!(entry.status, ReadingStatus::PlanToRead);
    let added = library.added.lock().unwrap();
    assert_eq!(added[0].0.title, "My Title");
    assert_eq!(added[0].1, "reading-list");
}

#[test]
fn unsupported_site_gets_no_script() {
    let service = MetadataService::default();
    let url = "https://example.com/manga/x";

    assert!(service.extractor_for_url(url).is_none());
    assert!(!service.is_extractable(url));
    assert!(service.injection_script(url).is_none());
}

#[tokio::test]
async fn unsupported_site_manual_trigger_injects_nothing() {
    struct NoInjection;
    impl PageHost for NoInjection {
        fn inject_script(&self, _: &str) -> Result<()> {
            panic!("nothing should be injected on unsupported sites");
        }
    }

    let coordinator = ExtractionCoordinator::new(
        Arc::new(MetadataService::default()),
        Arc::new(NoInjection),
        TimingConfig::default(),
    );
    coordinator.on_navigation_state_change(NavigationState {
        url: "https://example.com/manga/x".to_string(),
        ..NavigationState::default()
    });
    assert!(matches!(
        coordinator.request_manual_extraction().await,
        Err(ExtractionFailure::Unsupported(_))
    ));
}

#[test]
fn chapter_pages_never_get_a_script() {
    let service = MetadataService::default();
    let chapters = [
        "https://www.webtoons.com/en/fantasy/tower-of-god/season-1-ep-0/viewer?title_no=95&episode_no=1",
        "https://asuracomic.net/series/nano-machine-5e13a0a8/chapter/221",
        "https://mangafire.to/read/solo-levelingg.v2/en/chapter-200",
        "https://weebcentral.com/series/ABC123/My-Title/chapter/3",
        "https://mangadex.org/title/32d76d19-8a05-4db0-9fc2-e0b0648fe9d0/chapter/1",
        "https://manganato.com/manga/ax951880/chapter-12",
        "https://mangaplus.shueisha.co.jp/viewer/1000486",
    ];

    let registry = AdapterRegistry::new();
    let mut covered: Vec<&str> = Vec::new();
    for url in chapters {
        let adapter = registry.adapter_for_url(url).expect("chapter URL has an adapter");
        assert!(adapter.is_chapter_page(url), "{} not detected as chapter", url);
        assert!(service.injection_script(url).is_none(), "{} got a script", url);
        covered.push(adapter.name());
    }
    assert_eq!(covered, registry.supported_sites());
}

#[test]
fn parse_never_panics_on_hostile_input() {
    let service = MetadataService::default();
    let inputs = [
        "{",
        "{\"title\": 5, \"sourceUrl\": [], \"sourceWebsite\": {}}",
        "{\"title\":\"T\",\"sourceUrl\":\"u\",\"sourceWebsite\":\"W\",\"genres\":\"not a list\",\"rating\":\"x\"}",
        "\u{0000}",
        "{\"error\":null}",
        "1e400",
    ];
    for raw in inputs {
        let _ = service.parse_and_validate(raw);
    }

    let lenient = service
        .parse_and_validate(inputs[2])
        .expect("wrong optional types are ignored");
    assert!(lenient.genres.is_empty());
    assert_eq!(lenient.rating, None);
}

#[test]
fn rendered_script_embeds_adapter_plan() {
    let service = MetadataService::default();
    let script = service
        .injection_script("https://asuracomic.net/series/nano-machine-5e13a0a8")
        .unwrap();

    assert!(script.contains("var bridge = window.ReactNativeWebView;"));
    assert!(script.contains("toraka-hero"));
    assert!(script.trim_end().ends_with("true;"));
}
