//! Project-scoped API catalogue cache with deterministic endpoint grouping.
//!
//! The crate fetches a project's API specification records from a catalogue
//! backend, classifies them into groups by path prefix, orders and tags the
//! groups, and caches the result per project with a time-to-live. Cached
//! groupings can be patched in place and persisted between sessions.
//!
//! # Layout
//!
//! - [`domain`]: pure pipeline, cache store, fetch coordinator, and ports.
//! - [`outbound`]: reqwest source and snapshot file adapters.
//!
//! # Example
//!
//! ```
//! use api_catalog::domain::{build_endpoint_groups, CacheStore, ProjectId};
//! use api_catalog::domain::ports::ApiSpecRecord;
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let groups = build_endpoint_groups(
//!     vec![ApiSpecRecord::new("/api/v1/users/{id}", "GET")],
//!     now.timestamp_millis(),
//! );
//! let store = CacheStore::new();
//! store.write_fetched(ProjectId::new(1), groups, now);
//!
//! let cached = store.groups(ProjectId::new(1)).unwrap_or_default();
//! assert_eq!(cached.first().map(|group| group.key.as_str()), Some("/api/v1/users"));
//! ```

pub mod domain;
pub mod outbound;

#[cfg(test)]
mod test_support;
