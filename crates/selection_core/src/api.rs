//! Remote gallery collaborator: the selection fetch and the photo move call.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    error::ErrorBody,
    protocol::{MovePhotoRequest, SelectionResponse, MOVE_PHOTO_SEGMENTS, PUBLIC_SELECTION_SEGMENTS},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const MOVE_FAILED_FALLBACK: &str = "Failed to move photo";
pub const FETCH_FAILED_FALLBACK: &str = "Gallery not found or no longer available.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Target gallery ID is missing")]
    Validation,
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("move request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected selection payload: {0}")]
    Decode(String),
    #[error("selection request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

#[async_trait]
pub trait GalleryApi: Send + Sync {
    async fn fetch_selection(&self, token: &str) -> Result<SelectionResponse, FetchError>;
    async fn move_photo(&self, request: MovePhotoRequest) -> Result<(), MoveError>;
}

/// [`GalleryApi`] over the backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpGalleryApi {
    http: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpGalleryApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build gallery http client")?;
        Ok(Self {
            http,
            base_url,
            bearer_token: None,
        })
    }

    /// Attaches an already-issued access token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base url, keeping the backend's trailing slash.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Accepts `http(s)://host[/prefix]`; other schemes are rejected.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).with_context(|| format!("invalid server url '{trimmed}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("server url must start with http:// or https://");
    }
    if url.cannot_be_a_base() {
        bail!("server url '{trimmed}' cannot carry a path");
    }
    Ok(url)
}

async fn error_message(response: Response, fallback: &str) -> (u16, String) {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    (status, ErrorBody::parse(&raw).message_or(fallback))
}

#[async_trait]
impl GalleryApi for HttpGalleryApi {
    async fn fetch_selection(&self, token: &str) -> Result<SelectionResponse, FetchError> {
        let url = self.endpoint(PUBLIC_SELECTION_SEGMENTS.into_iter().chain([token]));
        debug!(%url, "fetching selection");

        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_message(response, FETCH_FAILED_FALLBACK).await;
            return Err(FetchError::Status { status, message });
        }

        let raw = response
            .text()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        serde_json::from_str(&raw).map_err(|err| FetchError::Decode(err.to_string()))
    }

    async fn move_photo(&self, request: MovePhotoRequest) -> Result<(), MoveError> {
        let url = self.endpoint(MOVE_PHOTO_SEGMENTS);
        debug!(
            %url,
            photo_id = %request.photo_id,
            target_gallery_id = %request.target_gallery_id,
            "moving photo"
        );

        let response = self
            .authorized(self.http.post(url).json(&request))
            .send()
            .await
            .map_err(|err| MoveError::Network(err.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_message(response, MOVE_FAILED_FALLBACK).await;
            return Err(MoveError::Server { status, message });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
