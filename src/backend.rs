use crate::config::BackendConfig;
use crate::error::{MangaShelfError, Result};
use crate::models::{ExtractedMetadata, LibraryEntry, ProgressUpdate, ReadingStatus};
use crate::traits::LibraryBackend;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// REST client for the library service. Failed calls are returned, never retried.
#[derive(Clone)]
pub struct LibraryApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddEntryRequest<'a> {
    #[serde(flatten)]
    metadata: &'a ExtractedMetadata,
    category_id: &'a str,
    reading_status: ReadingStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryResponse {
    user_manga: LibraryEntry,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

impl LibraryApi {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn entry_from(response: Response) -> Result<LibraryEntry> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            error!("[BACKEND] {} {}", status.as_u16(), message);
            return Err(MangaShelfError::backend(status.as_u16(), message));
        }

        let body: EntryResponse = response.json().await?;
        Ok(body.user_manga)
    }
}

#[async_trait::async_trait]
impl LibraryBackend for LibraryApi {
    async fn add_entry(
        &self,
        metadata: &ExtractedMetadata,
        category_id: &str,
        status: ReadingStatus,
    ) -> Result<LibraryEntry> {
        let url = format!("{}/library", self.base_url);
        debug!("[BACKEND] POST {} ({})", url, metadata.title);

        let request = self.client.post(&url).json(&AddEntryRequest {
            metadata,
            category_id,
            reading_status: status,
        });
        let response = self.authorized(request).send().await?;
        Self::entry_from(response).await
    }

    async fn update_progress(&self, entry_id: &str, update: &ProgressUpdate) -> Result<LibraryEntry> {
        let url = format!("{}/library/{}/progress", self.base_url, entry_id);
        debug!("[BACKEND] PUT {} chapter={}", url, update.current_chapter);

        let response = self
            .authorized(self.client.put(&url).json(update))
            .send()
            .await?;
        Self::entry_from(response).await
    }
}
