//! Driven port for fetching a project's API specification records.
//!
//! The domain owns the record shape so the coordinator stays adapter-agnostic;
//! payload defaults (`GET`, `AI_GENERATED`, empty path) are applied by the
//! adapter before records cross this boundary.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::endpoint::{HttpMethod, ProcessState, ProjectId};

/// One API specification record as served by the catalogue backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSpecRecord {
    /// Endpoint path, possibly empty or malformed.
    pub endpoint: String,
    /// HTTP verb.
    pub http_method: HttpMethod,
    /// Backend specification version identifier.
    pub api_spec_version_id: Option<i64>,
    /// Processing state.
    pub api_spec_status: ProcessState,
}

impl ApiSpecRecord {
    /// Build a record with the default `AI_GENERATED` state.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, http_method: impl Into<HttpMethod>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_method: http_method.into(),
            api_spec_version_id: None,
            api_spec_status: ProcessState::default(),
        }
    }

    /// Attach a specification version identifier.
    #[must_use]
    pub fn with_version_id(mut self, version_id: i64) -> Self {
        self.api_spec_version_id = Some(version_id);
        self
    }

    /// Override the processing state.
    #[must_use]
    pub fn with_status(mut self, status: ProcessState) -> Self {
        self.api_spec_status = status;
        self
    }
}

define_port_error! {
    /// Errors surfaced while fetching API specification records.
    pub enum ApiSpecSourceError {
        /// Network transport failed or the server returned an error status.
        Transport { message: String } =>
            "api spec transport failed: {message}",
        /// The request timed out.
        Timeout { message: String } =>
            "api spec request timed out: {message}",
        /// The bearer token was missing, expired, or lacked permission.
        Unauthorized { message: String } =>
            "api spec request unauthorised: {message}",
        /// The server rejected the request.
        Rejected { message: String } =>
            "api spec request rejected: {message}",
        /// The response payload could not be decoded.
        Decode { message: String } =>
            "api spec response decode failed: {message}",
    }
}

/// Port for listing the API specification records of one project.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiSpecSource: Send + Sync {
    /// Fetch every specification record of `project_id`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use api_catalog::domain::ProjectId;
    /// use api_catalog::domain::ports::ApiSpecSource;
    ///
    /// let records = source.list_by_project(ProjectId::new(7), "token").await?;
    /// for record in &records {
    ///     println!("{} {}", record.http_method, record.endpoint);
    /// }
    /// ```
    async fn list_by_project(
        &self,
        project_id: ProjectId,
        auth_token: &str,
    ) -> Result<Vec<ApiSpecRecord>, ApiSpecSourceError>;
}
