//! Manga metadata extraction for pages shown in an embedded web view, plus
//! reading-progress tracking against a library backend.

pub mod adapters;
pub mod backend;
pub mod chapters;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod extractors;
pub mod models;
pub mod progress;
pub mod registry;
pub mod service;
pub mod traits;

pub use config::Config;
pub use coordinator::ExtractionCoordinator;
pub use error::{ExtractionFailure, MangaShelfError, Result};
pub use models::{ExtractedMetadata, MangaStatus, ReadingStatus};
pub use registry::AdapterRegistry;
pub use service::MetadataService;
