//! Reqwest-backed catalogue source adapter.
//!
//! This adapter owns transport details only: URL construction, bearer
//! authorisation, timeout and HTTP error mapping, and JSON decoding into
//! domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::dto::ApiSpecListDto;
use crate::domain::ProjectId;
use crate::domain::ports::{ApiSpecRecord, ApiSpecSource, ApiSpecSourceError};

const LIST_BY_PROJECT_PATH: &str = "api/api-specs/by-project";

/// Catalogue source that lists specifications over HTTP.
pub struct ApiSpecHttpSource {
    client: Client,
    base_url: Url,
}

impl ApiSpecHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// ```rust,ignore
    /// let source = ApiSpecHttpSource::new(config.base_url().clone(), config.request_timeout())?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ApiSpecSource for ApiSpecHttpSource {
    async fn list_by_project(
        &self,
        project_id: ProjectId,
        auth_token: &str,
    ) -> Result<Vec<ApiSpecRecord>, ApiSpecSourceError> {
        let url = list_by_project_url(&self.base_url, project_id)?;
        debug!(%project_id, %url, "requesting api spec listing");
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization_value(auth_token)?)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_records(body.as_ref())
    }
}

fn list_by_project_url(base_url: &Url, project_id: ProjectId) -> Result<Url, ApiSpecSourceError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("{LIST_BY_PROJECT_PATH}/{project_id}"))
        .map_err(|error| ApiSpecSourceError::rejected(format!("invalid request URL: {error}")))
}

fn authorization_value(auth_token: &str) -> Result<HeaderValue, ApiSpecSourceError> {
    let raw = if auth_token.is_empty() {
        String::new()
    } else {
        format!("Bearer {auth_token}")
    };
    let mut value = HeaderValue::from_str(&raw).map_err(|_| {
        ApiSpecSourceError::unauthorized("bearer token contains invalid header characters")
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn parse_records(body: &[u8]) -> Result<Vec<ApiSpecRecord>, ApiSpecSourceError> {
    let decoded: ApiSpecListDto = serde_json::from_slice(body).map_err(|error| {
        ApiSpecSourceError::decode(format!("invalid api spec JSON payload: {error}"))
    })?;
    decoded.into_domain_records().map_err(|error| {
        ApiSpecSourceError::decode(format!("invalid api spec record: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> ApiSpecSourceError {
    if error.is_timeout() {
        ApiSpecSourceError::timeout(error.to_string())
    } else if error.is_decode() {
        ApiSpecSourceError::decode(error.to_string())
    } else {
        ApiSpecSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiSpecSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ApiSpecSourceError::unauthorized(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ApiSpecSourceError::timeout(message)
        }
        _ if status.is_client_error() => ApiSpecSourceError::rejected(message),
        _ => ApiSpecSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
