use thiserror::Error;

#[derive(Error, Debug)]
pub enum MangaShelfError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Script injection failed: {0}")]
    Injection(String),

    #[error("Backend responded with {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),
}

impl MangaShelfError {
    pub fn injection(msg: impl Into<String>) -> Self {
        Self::Injection(msg.into())
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }
}

/// Reasons a user-initiated extraction could not produce metadata.
///
/// Every variant is recoverable: the UI shows a message and the user may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("no page is loaded")]
    NoPage,

    #[error("this website is not supported yet: {0}")]
    Unsupported(String),

    #[error("please navigate to a manga detail page first: {0}")]
    NotDetailPage(String),

    #[error("metadata is not extracted while reading a chapter: {0}")]
    ChapterPage(String),

    #[error("no extraction script available for {0}")]
    NoScript(String),

    #[error("failed to inject extraction script: {0}")]
    InjectionFailed(String),

    #[error("could not extract manga information, the page may not be fully loaded yet")]
    NoReply,
}

pub type Result<T> = std::result::Result<T, MangaShelfError>;
