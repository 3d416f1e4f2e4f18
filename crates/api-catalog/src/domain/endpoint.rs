//! Catalogue entities: projects, endpoints, and endpoint groups.
//!
//! These types are the read model shared by the grouping pipeline, the cache
//! store, and snapshot persistence. They serialise in camelCase so a snapshot
//! reads the same way as the backend payload it was derived from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of the project whose catalogue is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Wrap a raw project identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProjectId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// HTTP verb attached to a catalogued endpoint.
///
/// Parsing is exact: only the upper-case spellings map to the named variants.
/// Anything else is kept verbatim in [`HttpMethod::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// Any verb outside the ranked set.
    Other(String),
}

impl HttpMethod {
    /// Wire spelling of the verb.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(value: &str) -> Self {
        match value {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<HttpMethod> for String {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Other(raw) => raw,
            named => named.as_str().to_owned(),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of one API specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    /// Generated by the assistant and not yet reviewed.
    #[default]
    AiGenerated,
    /// A diagram has been generated for the specification.
    AiVisualized,
    /// The user marked the specification as finished.
    UserCompleted,
}

impl ProcessState {
    /// Wire spelling of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiGenerated => "AI_GENERATED",
            Self::AiVisualized => "AI_VISUALIZED",
            Self::UserCompleted => "USER_COMPLETED",
        }
    }

    /// Whether a hand-issued status change from `self` to `next` is allowed.
    ///
    /// A freshly generated specification only leaves `AI_GENERATED` through
    /// diagram generation, and reviewed specifications never return to it.
    /// The cache does not enforce this; callers consult it before mutating.
    ///
    /// ```
    /// use api_catalog::domain::ProcessState;
    ///
    /// assert!(ProcessState::AiVisualized.permits_transition_to(ProcessState::UserCompleted));
    /// assert!(!ProcessState::UserCompleted.permits_transition_to(ProcessState::AiGenerated));
    /// ```
    #[must_use]
    pub const fn permits_transition_to(self, next: Self) -> bool {
        !matches!(self, Self::AiGenerated) && !matches!(next, Self::AiGenerated)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ProcessState`] spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown API process state: {value}")]
pub struct UnknownProcessState {
    /// The rejected input.
    pub value: String,
}

impl FromStr for ProcessState {
    type Err = UnknownProcessState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI_GENERATED" => Ok(Self::AiGenerated),
            "AI_VISUALIZED" => Ok(Self::AiVisualized),
            "USER_COMPLETED" => Ok(Self::UserCompleted),
            other => Err(UnknownProcessState {
                value: other.to_owned(),
            }),
        }
    }
}

/// One catalogued endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Identifier unique within one cache entry.
    pub id: String,
    /// Raw endpoint path as returned by the backend.
    pub path: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Processing state.
    pub status: ProcessState,
    /// Backend specification version, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version_id: Option<i64>,
}

/// Endpoints sharing one group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointGroup {
    /// Identifier unique within one cache entry.
    pub id: String,
    /// Classifier output, for example `/api/v1/users`.
    pub key: String,
    /// Decorative tag derived from `key`.
    pub visual_tag: String,
    /// Endpoints in display order.
    pub endpoints: Vec<Endpoint>,
}

impl EndpointGroup {
    /// Find an endpoint by identifier.
    #[must_use]
    pub fn endpoint(&self, endpoint_id: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.id == endpoint_id)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for catalogue entity parsing and state rules.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GET", HttpMethod::Get)]
    #[case("DELETE", HttpMethod::Delete)]
    #[case("get", HttpMethod::Other("get".to_owned()))]
    #[case("OPTIONS", HttpMethod::Other("OPTIONS".to_owned()))]
    fn parses_methods_exactly(#[case] raw: &str, #[case] expected: HttpMethod) {
        assert_eq!(HttpMethod::from(raw), expected);
        assert_eq!(HttpMethod::from(raw).as_str(), raw);
    }

    #[test]
    fn method_serialises_as_bare_string() {
        let json = serde_json::to_string(&HttpMethod::Patch).expect("serialise method");
        assert_eq!(json, "\"PATCH\"");
        let other: HttpMethod = serde_json::from_str("\"TRACE\"").expect("decode method");
        assert_eq!(other, HttpMethod::Other("TRACE".to_owned()));
    }

    #[rstest]
    #[case("AI_GENERATED", ProcessState::AiGenerated)]
    #[case("AI_VISUALIZED", ProcessState::AiVisualized)]
    #[case("USER_COMPLETED", ProcessState::UserCompleted)]
    fn parses_known_states(#[case] raw: &str, #[case] expected: ProcessState) {
        assert_eq!(raw.parse::<ProcessState>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[test]
    fn rejects_unknown_state() {
        let err = "DRAFT".parse::<ProcessState>().expect_err("unknown state");
        assert_eq!(err.value, "DRAFT");
    }

    #[rstest]
    #[case(ProcessState::AiGenerated, ProcessState::AiVisualized, false)]
    #[case(ProcessState::AiGenerated, ProcessState::UserCompleted, false)]
    #[case(ProcessState::AiVisualized, ProcessState::UserCompleted, true)]
    #[case(ProcessState::UserCompleted, ProcessState::AiVisualized, true)]
    #[case(ProcessState::AiVisualized, ProcessState::AiGenerated, false)]
    #[case(ProcessState::UserCompleted, ProcessState::AiGenerated, false)]
    fn transition_rules(
        #[case] from: ProcessState,
        #[case] to: ProcessState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.permits_transition_to(to), allowed);
    }
}
