//! DTOs for decoding the catalogue backend's specification listing.
//!
//! The adapter decodes into these transport DTOs first, then maps them into
//! domain records in one pass. Missing, null, or empty method and status
//! fields take the backend's documented defaults.

use serde::Deserialize;

use crate::domain::ports::ApiSpecRecord;
use crate::domain::{HttpMethod, ProcessState, UnknownProcessState};

#[derive(Debug, Deserialize)]
pub(super) struct ApiSpecListDto {
    #[serde(default)]
    pub(super) content: Option<Vec<ApiSpecRecordDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiSpecRecordDto {
    #[serde(default)]
    pub(super) endpoint: Option<String>,
    #[serde(default)]
    pub(super) http_method: Option<String>,
    #[serde(default)]
    pub(super) api_spec_version_id: Option<i64>,
    #[serde(default)]
    pub(super) api_spec_status: Option<String>,
}

impl ApiSpecListDto {
    pub(super) fn into_domain_records(self) -> Result<Vec<ApiSpecRecord>, UnknownProcessState> {
        self.content
            .unwrap_or_default()
            .into_iter()
            .map(ApiSpecRecordDto::into_domain_record)
            .collect()
    }
}

impl ApiSpecRecordDto {
    fn into_domain_record(self) -> Result<ApiSpecRecord, UnknownProcessState> {
        let api_spec_status = non_empty(self.api_spec_status)
            .map(|raw| raw.parse::<ProcessState>())
            .transpose()?
            .unwrap_or_default();
        Ok(ApiSpecRecord {
            endpoint: self.endpoint.unwrap_or_default(),
            http_method: non_empty(self.http_method).map_or(HttpMethod::Get, HttpMethod::from),
            api_spec_version_id: self.api_spec_version_id,
            api_spec_status,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.is_empty())
}
