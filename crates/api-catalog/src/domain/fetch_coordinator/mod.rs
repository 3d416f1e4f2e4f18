//! Fetch coordination for the API catalogue cache.
//!
//! The coordinator decides whether a project needs a network round trip,
//! guards against overlapping fetches, and publishes pipeline output into the
//! [`CacheStore`]. Failures never reach the caller: stale data stays visible
//! and the failure is logged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use super::cache_store::CacheStore;
use super::endpoint::{EndpointGroup, ProcessState, ProjectId};
use super::grouping::build_endpoint_groups;
use super::ports::ApiSpecSource;

/// Orchestrates retrieval, single-flight protection, and TTL freshness.
pub struct FetchCoordinator {
    source: Arc<dyn ApiSpecSource>,
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
    loading: AtomicBool,
}

impl FetchCoordinator {
    /// Build a coordinator writing into `store`.
    /// ```rust,ignore
    /// let coordinator = FetchCoordinator::new(source, store, Arc::new(DefaultClock), ttl);
    /// ```
    pub fn new(
        source: Arc<dyn ApiSpecSource>,
        store: Arc<CacheStore>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            cache_ttl,
            loading: AtomicBool::new(false),
        }
    }

    /// Fetch a project's specifications unless the cache makes it unnecessary.
    ///
    /// Guards are checked in order: a fetch already in flight anywhere on this
    /// coordinator wins, then a fresh entry short-circuits unless
    /// `force_refresh` is set. The clock is read once on admission and that
    /// instant becomes the entry's `last_fetched_at` on success.
    ///
    /// There is no request-sequencing token. A forced refresh issued after an
    /// earlier fetch released the flag may complete out of order with it, and
    /// the later completion wins the groups.
    ///
    /// ```rust,ignore
    /// coordinator.fetch_api_specs(ProjectId::new(7), "token", false).await;
    /// let groups = coordinator.store().groups(ProjectId::new(7));
    /// ```
    pub async fn fetch_api_specs(
        &self,
        project_id: ProjectId,
        auth_token: &str,
        force_refresh: bool,
    ) {
        let Some(_loading) = LoadingGuard::claim(&self.loading) else {
            debug!(%project_id, "fetch skipped: another fetch is in flight");
            return;
        };

        let now = self.clock.utc();
        if !force_refresh && self.is_fresh(project_id, now) {
            debug!(%project_id, "fetch skipped: cached entry is fresh");
            return;
        }

        match self.source.list_by_project(project_id, auth_token).await {
            Ok(records) => {
                let endpoint_count = records.len();
                let batch_stamp = self.clock.utc().timestamp_millis();
                let groups = build_endpoint_groups(records, batch_stamp);
                let group_count = groups.len();
                self.store.write_fetched(project_id, groups, now);
                info!(%project_id, endpoint_count, group_count, "api catalogue refreshed");
            }
            Err(error) => {
                warn!(%project_id, %error, "api catalogue fetch failed; keeping cached entry");
            }
        }
    }

    /// Whether a fetch currently holds the loading flag.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Store the coordinator publishes into.
    #[must_use]
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Age after which a cached entry is refetched.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Patch one endpoint's status. See [`CacheStore::update_endpoint_status`].
    pub fn update_endpoint_status(
        &self,
        project_id: ProjectId,
        group_id: &str,
        endpoint_id: &str,
        status: ProcessState,
    ) -> bool {
        self.store
            .update_endpoint_status(project_id, group_id, endpoint_id, status)
    }

    /// Replace a project's groups wholesale. See [`CacheStore::replace_groups`].
    pub fn replace_groups(&self, project_id: ProjectId, groups: Vec<EndpointGroup>) {
        self.store.replace_groups(project_id, groups);
    }

    /// Drop a project's entry. See [`CacheStore::evict`].
    pub fn evict(&self, project_id: ProjectId) -> bool {
        self.store.evict(project_id)
    }

    fn is_fresh(&self, project_id: ProjectId, now: DateTime<Utc>) -> bool {
        self.store
            .entry(project_id)
            .is_some_and(|entry| entry.is_fresh_at(now, self.cache_ttl))
    }
}

/// Holds the loading flag for the lifetime of one admitted fetch.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
