//! Grouping pipeline: records → classifier → sorter → tag assigner.
//!
//! Identifiers embed a batch stamp so that two fetches processed within the
//! same session never hand out colliding ids. Everything else about the
//! output is a pure function of the input records.

use std::collections::BTreeMap;

use super::classifier::group_key_for_path;
use super::endpoint::{Endpoint, EndpointGroup};
use super::ordering::{sort_by_group_key, sort_endpoints};
use super::ports::ApiSpecRecord;
use super::visual_tag::visual_tag_for_key;

/// Key of the placeholder group produced for an empty catalogue.
pub const FALLBACK_GROUP_KEY: &str = "/api/v1";

/// Classify, group, order, and tag a batch of specification records.
///
/// `batch_stamp` is usually the fetch time in Unix milliseconds. An empty
/// input yields exactly one fallback group keyed [`FALLBACK_GROUP_KEY`].
///
/// ```
/// use api_catalog::domain::build_endpoint_groups;
/// use api_catalog::domain::ports::ApiSpecRecord;
///
/// let groups = build_endpoint_groups(
///     vec![
///         ApiSpecRecord::new("/api/v1/users", "GET"),
///         ApiSpecRecord::new("/api/v1/users/{id}", "GET"),
///         ApiSpecRecord::new("/api/v1/orders", "POST"),
///     ],
///     1_700_000_000_000,
/// );
/// let keys: Vec<&str> = groups.iter().map(|group| group.key.as_str()).collect();
/// assert_eq!(keys, ["/api/v1/orders", "/api/v1/users"]);
/// ```
#[must_use]
pub fn build_endpoint_groups(records: Vec<ApiSpecRecord>, batch_stamp: i64) -> Vec<EndpointGroup> {
    let mut by_key: BTreeMap<String, Vec<Endpoint>> = BTreeMap::new();
    for (index, record) in records.into_iter().enumerate() {
        let key = group_key_for_path(&record.endpoint);
        let endpoint = endpoint_from_record(record, stamp_offset(batch_stamp, index));
        by_key.entry(key).or_default().push(endpoint);
    }

    if by_key.is_empty() {
        return vec![fallback_group(batch_stamp)];
    }

    let mut ordered: Vec<(String, Vec<Endpoint>)> = by_key.into_iter().collect();
    sort_by_group_key(&mut ordered);

    ordered
        .into_iter()
        .enumerate()
        .map(|(group_index, (key, mut endpoints))| {
            sort_endpoints(&mut endpoints);
            EndpointGroup {
                id: group_id(&key, stamp_offset(batch_stamp, group_index)),
                visual_tag: visual_tag_for_key(&key).to_owned(),
                key,
                endpoints,
            }
        })
        .collect()
}

fn endpoint_from_record(record: ApiSpecRecord, stamp: i64) -> Endpoint {
    let version = record
        .api_spec_version_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    Endpoint {
        id: format!("endpoint-{version}-{stamp}"),
        path: record.endpoint,
        method: record.http_method,
        status: record.api_spec_status,
        spec_version_id: record.api_spec_version_id,
    }
}

fn group_id(key: &str, stamp: i64) -> String {
    format!("group-{}-{stamp}", key.replace('/', "-"))
}

fn fallback_group(batch_stamp: i64) -> EndpointGroup {
    EndpointGroup {
        id: format!("default-group-{batch_stamp}"),
        key: FALLBACK_GROUP_KEY.to_owned(),
        visual_tag: visual_tag_for_key(FALLBACK_GROUP_KEY).to_owned(),
        endpoints: Vec::new(),
    }
}

fn stamp_offset(batch_stamp: i64, index: usize) -> i64 {
    batch_stamp.saturating_add(i64::try_from(index).unwrap_or(i64::MAX))
}
