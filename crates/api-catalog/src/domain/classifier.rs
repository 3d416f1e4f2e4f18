//! Endpoint path classification.
//!
//! A group key keeps at most the first three non-empty path segments. Keys
//! built from three segments drop any segment carrying a path-parameter
//! marker, so `/api/v1/{id}` groups with `/api/v1`.

/// Maximum number of path segments retained in a group key.
pub const GROUP_KEY_DEPTH: usize = 3;

/// Key used when a path yields no usable segments.
pub const ROOT_GROUP_KEY: &str = "/";

/// Map an endpoint path onto its group key.
///
/// The result is never empty.
///
/// ```
/// use api_catalog::domain::group_key_for_path;
///
/// assert_eq!(group_key_for_path("/api/v1/users/{id}/roles"), "/api/v1/users");
/// assert_eq!(group_key_for_path("/api/v1/{id}"), "/api/v1");
/// assert_eq!(group_key_for_path(""), "/");
/// ```
#[must_use]
pub fn group_key_for_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();

    match segments.as_slice() {
        [] => ROOT_GROUP_KEY.to_owned(),
        [first] => format!("/{first}"),
        [first, second] => format!("/{first}/{second}"),
        deeper => {
            let retained: Vec<&str> = deeper
                .iter()
                .take(GROUP_KEY_DEPTH)
                .copied()
                .filter(|segment| !is_parameter_segment(segment))
                .collect();
            if retained.is_empty() {
                ROOT_GROUP_KEY.to_owned()
            } else {
                format!("/{}", retained.join("/"))
            }
        }
    }
}

fn is_parameter_segment(segment: &str) -> bool {
    segment.contains('{') || segment.contains('}')
}
