//! Deterministic ordering of groups and endpoints.

use std::cmp::Ordering;

use super::endpoint::{Endpoint, HttpMethod};

/// Prefix whose groups are listed ahead of all others.
pub const PRIORITY_GROUP_PREFIX: &str = "/api/v1";

/// Rank assigned to verbs outside the ranked set.
pub const UNRANKED_METHOD: u8 = 99;

/// Display rank of an HTTP verb; lower sorts first.
#[must_use]
pub const fn method_rank(method: &HttpMethod) -> u8 {
    match method {
        HttpMethod::Get => 1,
        HttpMethod::Post => 2,
        HttpMethod::Put => 3,
        HttpMethod::Patch => 4,
        HttpMethod::Delete => 5,
        HttpMethod::Other(_) => UNRANKED_METHOD,
    }
}

/// Compare two group keys: `/api/v1` keys first, then byte-wise.
#[must_use]
pub fn compare_group_keys(left: &str, right: &str) -> Ordering {
    let left_priority = left.starts_with(PRIORITY_GROUP_PREFIX);
    let right_priority = right.starts_with(PRIORITY_GROUP_PREFIX);
    right_priority
        .cmp(&left_priority)
        .then_with(|| left.cmp(right))
}

/// Compare two endpoints by method rank, then by full path.
#[must_use]
pub fn compare_endpoints(left: &Endpoint, right: &Endpoint) -> Ordering {
    method_rank(&left.method)
        .cmp(&method_rank(&right.method))
        .then_with(|| left.path.cmp(&right.path))
}

/// Sort endpoints in place into display order. The sort is stable.
pub fn sort_endpoints(endpoints: &mut [Endpoint]) {
    endpoints.sort_by(compare_endpoints);
}

/// Sort `(key, value)` pairs into group display order. The sort is stable.
pub fn sort_by_group_key<T>(groups: &mut [(String, T)]) {
    groups.sort_by(|(left, _), (right, _)| compare_group_keys(left, right));
}
