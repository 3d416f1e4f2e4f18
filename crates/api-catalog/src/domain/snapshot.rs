//! Versioned, serialisable form of the cache store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cache_store::CacheEntry;
use super::endpoint::ProjectId;

/// Schema version written into every snapshot.
///
/// Bump this whenever [`CacheEntry`] or its nested types change shape; older
/// snapshots are then discarded on load.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Persisted cache contents. The in-flight flag is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    /// Schema version of this snapshot.
    pub version: u32,
    /// Cached entries keyed by project.
    #[serde(default)]
    pub projects: BTreeMap<ProjectId, CacheEntry>,
}

impl CatalogSnapshot {
    /// Wrap entries in a snapshot tagged with the current schema version.
    #[must_use]
    pub const fn current(projects: BTreeMap<ProjectId, CacheEntry>) -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            projects,
        }
    }

    /// Whether this snapshot was written with the current schema.
    #[must_use]
    pub const fn is_current(&self) -> bool {
        self.version == SNAPSHOT_SCHEMA_VERSION
    }
}
