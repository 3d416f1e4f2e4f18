//! Per-project cache of computed endpoint groupings.
//!
//! Entries are immutable once published: every write swaps in a new
//! `Arc<CacheEntry>`, so a reader holding an older entry never observes a
//! partial update. Writers notify subscribers through a broadcast channel
//! after the write has completed.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::endpoint::{EndpointGroup, ProcessState, ProjectId};
use super::snapshot::CatalogSnapshot;

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Cached grouping for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Groups in display order.
    pub groups: Vec<EndpointGroup>,
    /// When the grouping was last fetched successfully.
    pub last_fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is younger than `ttl` at `now`.
    ///
    /// An entry stamped in the future counts as fresh.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let Ok(ttl_delta) = TimeDelta::from_std(ttl) else {
            return true;
        };
        now.signed_duration_since(self.last_fetched_at) < ttl_delta
    }

    /// Find a group by identifier.
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&EndpointGroup> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    /// Return a copy with one endpoint's status replaced.
    ///
    /// Returns `None` when the group or endpoint does not exist. The
    /// timestamp is carried over unchanged.
    #[must_use]
    pub fn with_endpoint_status(
        &self,
        group_id: &str,
        endpoint_id: &str,
        status: ProcessState,
    ) -> Option<Self> {
        let group_index = self.groups.iter().position(|group| group.id == group_id)?;
        let endpoint_index = self
            .groups
            .get(group_index)?
            .endpoints
            .iter()
            .position(|endpoint| endpoint.id == endpoint_id)?;

        let mut patched = self.clone();
        let endpoint = patched
            .groups
            .get_mut(group_index)?
            .endpoints
            .get_mut(endpoint_index)?;
        endpoint.status = status;
        Some(patched)
    }
}

/// Change notification published by [`CacheStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A project's groups were replaced wholesale.
    Replaced {
        /// Affected project.
        project_id: ProjectId,
    },
    /// One endpoint's status was patched in place.
    EndpointPatched {
        /// Affected project.
        project_id: ProjectId,
        /// Group containing the endpoint.
        group_id: String,
        /// Patched endpoint.
        endpoint_id: String,
    },
    /// A project's entry was removed.
    Evicted {
        /// Affected project.
        project_id: ProjectId,
    },
    /// Entries were restored from a snapshot.
    Restored {
        /// Projects present after the restore.
        projects: Vec<ProjectId>,
    },
}

/// Keyed-by-project store of cached groupings.
///
/// # Examples
///
/// ```
/// use api_catalog::domain::{CacheStore, ProjectId};
/// use chrono::Utc;
///
/// let store = CacheStore::new();
/// let project = ProjectId::new(3);
/// store.write_fetched(project, Vec::new(), Utc::now());
/// assert!(store.entry(project).is_some());
/// assert!(store.evict(project));
/// assert!(store.entry(project).is_none());
/// ```
#[derive(Debug)]
pub struct CacheStore {
    entries: Mutex<BTreeMap<ProjectId, Arc<CacheEntry>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create an empty store whose subscribers buffer up to `capacity` events.
    #[must_use]
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            entries: Mutex::new(BTreeMap::new()),
            events,
        }
    }

    /// Subscribe to change notifications.
    ///
    /// Receivers that fall more than the event capacity behind observe
    /// `RecvError::Lagged` and should re-read the store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Current entry for `project_id`.
    #[must_use]
    pub fn entry(&self, project_id: ProjectId) -> Option<Arc<CacheEntry>> {
        self.lock().get(&project_id).cloned()
    }

    /// Current groups for `project_id`.
    #[must_use]
    pub fn groups(&self, project_id: ProjectId) -> Option<Vec<EndpointGroup>> {
        self.entry(project_id).map(|entry| entry.groups.clone())
    }

    /// Timestamp of the last successful fetch for `project_id`.
    #[must_use]
    pub fn last_fetched_at(&self, project_id: ProjectId) -> Option<DateTime<Utc>> {
        self.entry(project_id).map(|entry| entry.last_fetched_at)
    }

    /// Projects that currently have an entry.
    #[must_use]
    pub fn projects(&self) -> Vec<ProjectId> {
        self.lock().keys().copied().collect()
    }

    /// Publish the result of a successful fetch.
    ///
    /// The stored timestamp never moves backwards: when `fetched_at` is older
    /// than the current entry's timestamp, the groups are replaced but the
    /// newer timestamp is kept.
    pub fn write_fetched(
        &self,
        project_id: ProjectId,
        groups: Vec<EndpointGroup>,
        fetched_at: DateTime<Utc>,
    ) {
        {
            let mut entries = self.lock();
            let last_fetched_at = entries
                .get(&project_id)
                .map_or(fetched_at, |previous| previous.last_fetched_at.max(fetched_at));
            entries.insert(
                project_id,
                Arc::new(CacheEntry {
                    groups,
                    last_fetched_at,
                }),
            );
        }
        self.notify(CacheEvent::Replaced { project_id });
    }

    /// Replace a project's groups without touching its fetch timestamp.
    ///
    /// A project with no entry receives one stamped at the Unix epoch, so the
    /// next fetch treats it as stale.
    pub fn replace_groups(&self, project_id: ProjectId, groups: Vec<EndpointGroup>) {
        {
            let mut entries = self.lock();
            let last_fetched_at = entries
                .get(&project_id)
                .map(|previous| previous.last_fetched_at)
                .unwrap_or_default();
            entries.insert(
                project_id,
                Arc::new(CacheEntry {
                    groups,
                    last_fetched_at,
                }),
            );
        }
        self.notify(CacheEvent::Replaced { project_id });
    }

    /// Replace one endpoint's status inside a cached grouping.
    ///
    /// Missing projects, groups, or endpoints leave the store untouched.
    /// Returns whether an entry was patched. The fetch timestamp is kept.
    pub fn update_endpoint_status(
        &self,
        project_id: ProjectId,
        group_id: &str,
        endpoint_id: &str,
        status: ProcessState,
    ) -> bool {
        {
            let mut entries = self.lock();
            let Some(next) = entries
                .get(&project_id)
                .and_then(|current| current.with_endpoint_status(group_id, endpoint_id, status))
            else {
                return false;
            };
            entries.insert(project_id, Arc::new(next));
        }

        debug!(%project_id, group_id, endpoint_id, %status, "endpoint status patched");
        self.notify(CacheEvent::EndpointPatched {
            project_id,
            group_id: group_id.to_owned(),
            endpoint_id: endpoint_id.to_owned(),
        });
        true
    }

    /// Remove a project's entry. Returns whether one existed.
    pub fn evict(&self, project_id: ProjectId) -> bool {
        let removed = self.lock().remove(&project_id).is_some();
        if removed {
            self.notify(CacheEvent::Evicted { project_id });
        }
        removed
    }

    /// Copy the store into a snapshot tagged with the current schema version.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        let projects = self
            .lock()
            .iter()
            .map(|(project_id, entry)| (*project_id, entry.as_ref().clone()))
            .collect();
        CatalogSnapshot::current(projects)
    }

    /// Replace the store contents with a snapshot.
    ///
    /// Snapshots written under another schema version are discarded and the
    /// store is left unchanged. Returns whether the snapshot was applied.
    pub fn restore(&self, snapshot: CatalogSnapshot) -> bool {
        if !snapshot.is_current() {
            warn!(
                version = snapshot.version,
                "discarding cache snapshot with mismatched schema version"
            );
            return false;
        }

        let projects: Vec<ProjectId> = snapshot.projects.keys().copied().collect();
        {
            let mut entries = self.lock();
            *entries = snapshot
                .projects
                .into_iter()
                .map(|(project_id, entry)| (project_id, Arc::new(entry)))
                .collect();
        }
        self.notify(CacheEvent::Restored { projects });
        true
    }

    fn notify(&self, event: CacheEvent) {
        // Sending fails only when nobody is subscribed.
        self.events.send(event).ok();
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ProjectId, Arc<CacheEntry>>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    //! Store semantics: replacement, patching, eviction, and snapshots.

    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::domain::grouping::build_endpoint_groups;
    use crate::domain::ports::ApiSpecRecord;
    use crate::domain::snapshot::SNAPSHOT_SCHEMA_VERSION;

    const PROJECT: ProjectId = ProjectId::new(42);

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    fn sample_groups() -> Vec<EndpointGroup> {
        build_endpoint_groups(
            vec![
                ApiSpecRecord::new("/api/v1/users", "GET").with_version_id(1),
                ApiSpecRecord::new("/api/v1/users", "POST").with_version_id(2),
                ApiSpecRecord::new("/admin/stats", "GET").with_version_id(3),
            ],
            1_700_000_000_000,
        )
    }

    #[fixture]
    fn store() -> CacheStore {
        let store = CacheStore::new();
        store.write_fetched(PROJECT, sample_groups(), at(0));
        store
    }

    fn first_ids(store: &CacheStore) -> (String, String) {
        let entry = store.entry(PROJECT).expect("entry");
        let group = entry.groups.first().expect("group");
        let endpoint = group.endpoints.first().expect("endpoint");
        (group.id.clone(), endpoint.id.clone())
    }

    #[rstest]
    fn patch_changes_only_the_target_endpoint(store: CacheStore) {
        let before = store.entry(PROJECT).expect("entry before");
        let (group_id, endpoint_id) = first_ids(&store);

        assert!(store.update_endpoint_status(
            PROJECT,
            &group_id,
            &endpoint_id,
            ProcessState::AiVisualized
        ));

        let after = store.entry(PROJECT).expect("entry after");
        assert!(!Arc::ptr_eq(&before, &after), "patch publishes a new entry");
        assert_eq!(after.last_fetched_at, before.last_fetched_at);
        assert_eq!(after.groups.len(), before.groups.len());

        for (old_group, new_group) in before.groups.iter().zip(&after.groups) {
            for (old, new) in old_group.endpoints.iter().zip(&new_group.endpoints) {
                if new.id == endpoint_id {
                    assert_eq!(old.status, ProcessState::AiGenerated);
                    assert_eq!(new.status, ProcessState::AiVisualized);
                    assert_eq!(
                        (&old.id, &old.path, &old.method),
                        (&new.id, &new.path, &new.method)
                    );
                } else {
                    assert_eq!(old, new, "sibling endpoints stay value-equal");
                }
            }
            if old_group.id != group_id {
                assert_eq!(old_group, new_group, "sibling groups stay value-equal");
            }
        }
    }

    #[rstest]
    #[case::unknown_group("group-missing", None)]
    #[case::unknown_endpoint("", Some("endpoint-missing"))]
    fn patch_with_unknown_target_is_a_no_op(
        store: CacheStore,
        #[case] group_override: &str,
        #[case] endpoint_override: Option<&str>,
    ) {
        let (real_group, real_endpoint) = first_ids(&store);
        let group_id = if group_override.is_empty() {
            real_group.as_str()
        } else {
            group_override
        };
        let endpoint_id = endpoint_override.unwrap_or(real_endpoint.as_str());
        let before = store.entry(PROJECT).expect("entry before");

        assert!(!store.update_endpoint_status(
            PROJECT,
            group_id,
            endpoint_id,
            ProcessState::UserCompleted
        ));

        let after = store.entry(PROJECT).expect("entry after");
        assert!(Arc::ptr_eq(&before, &after), "entry is left untouched");
    }

    #[test]
    fn patch_for_unknown_project_is_a_no_op() {
        let store = CacheStore::new();
        assert!(!store.update_endpoint_status(PROJECT, "g", "e", ProcessState::UserCompleted));
        assert!(store.entry(PROJECT).is_none());
    }

    #[rstest]
    fn timestamp_never_moves_backwards(store: CacheStore) {
        store.write_fetched(PROJECT, Vec::new(), at(-60));
        assert_eq!(store.last_fetched_at(PROJECT), Some(at(0)));
        assert_eq!(store.groups(PROJECT), Some(Vec::new()));

        store.write_fetched(PROJECT, sample_groups(), at(30));
        assert_eq!(store.last_fetched_at(PROJECT), Some(at(30)));
    }

    #[rstest]
    fn replace_groups_keeps_timestamp(store: CacheStore) {
        store.replace_groups(PROJECT, Vec::new());
        assert_eq!(store.last_fetched_at(PROJECT), Some(at(0)));
        assert_eq!(store.groups(PROJECT), Some(Vec::new()));
    }

    #[test]
    fn replace_groups_on_new_project_is_stale() {
        let store = CacheStore::new();
        store.replace_groups(PROJECT, sample_groups());
        let entry = store.entry(PROJECT).expect("entry");
        assert_eq!(entry.last_fetched_at, DateTime::<Utc>::default());
        assert!(!entry.is_fresh_at(at(0), Duration::from_secs(300)));
    }

    #[rstest]
    fn evict_removes_entry_once(store: CacheStore) {
        assert!(store.evict(PROJECT));
        assert!(!store.evict(PROJECT));
        assert!(store.projects().is_empty());
    }

    #[rstest]
    #[case(0, true)]
    #[case(299, true)]
    #[case(300, false)]
    #[case(301, false)]
    #[case(-10, true)]
    fn freshness_window(store: CacheStore, #[case] elapsed: i64, #[case] fresh: bool) {
        let entry = store.entry(PROJECT).expect("entry");
        assert_eq!(entry.is_fresh_at(at(elapsed), Duration::from_secs(300)), fresh);
    }

    #[rstest]
    fn snapshot_round_trips_through_restore(store: CacheStore) {
        let snapshot = store.snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_SCHEMA_VERSION);

        let restored = CacheStore::new();
        assert!(restored.restore(snapshot));
        assert_eq!(restored.entry(PROJECT), store.entry(PROJECT));
    }

    #[rstest]
    fn restore_discards_mismatched_version(store: CacheStore) {
        let mut snapshot = store.snapshot();
        snapshot.version = SNAPSHOT_SCHEMA_VERSION + 1;

        let target = CacheStore::new();
        assert!(!target.restore(snapshot));
        assert!(target.projects().is_empty());
    }

    #[rstest]
    fn subscribers_observe_writes_in_order(store: CacheStore) {
        let mut events = store.subscribe();
        let (group_id, endpoint_id) = first_ids(&store);

        store.update_endpoint_status(PROJECT, &group_id, &endpoint_id, ProcessState::AiVisualized);
        store.update_endpoint_status(PROJECT, "missing", &endpoint_id, ProcessState::AiVisualized);
        store.evict(PROJECT);

        assert_eq!(
            events.try_recv(),
            Ok(CacheEvent::EndpointPatched {
                project_id: PROJECT,
                group_id,
                endpoint_id,
            })
        );
        assert_eq!(
            events.try_recv(),
            Ok(CacheEvent::Evicted {
                project_id: PROJECT
            })
        );
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }
}
