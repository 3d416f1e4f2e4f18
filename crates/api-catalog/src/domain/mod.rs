//! Domain model and services for the API catalogue cache.
//!
//! Purpose: turn a project's flat list of API specification records into a
//! stable, ordered grouping and keep it cached with a freshness policy.
//!
//! Public surface:
//! - Pure pipeline: [`group_key_for_path`], [`sort_endpoints`],
//!   [`visual_tag_for_key`], [`build_endpoint_groups`].
//! - State: [`CacheStore`] with [`CacheEntry`] values and [`CacheEvent`]
//!   notifications; [`CatalogSnapshot`] for persistence.
//! - Orchestration: [`FetchCoordinator`] configured by [`CatalogConfig`].
//! - Ports: [`ports::ApiSpecSource`] and [`ports::CatalogSnapshotRepository`].

pub mod ports;

mod cache_store;
mod classifier;
mod config;
mod endpoint;
mod fetch_coordinator;
mod grouping;
mod ordering;
mod snapshot;
mod visual_tag;

pub use self::cache_store::{CacheEntry, CacheEvent, CacheStore};
pub use self::classifier::{GROUP_KEY_DEPTH, ROOT_GROUP_KEY, group_key_for_path};
pub use self::config::{
    BASE_URL_ENV, CACHE_TTL_SECONDS_ENV, CatalogConfig, CatalogConfigError,
    REQUEST_TIMEOUT_SECONDS_ENV,
};
pub use self::endpoint::{
    Endpoint, EndpointGroup, HttpMethod, ProcessState, ProjectId, UnknownProcessState,
};
pub use self::fetch_coordinator::FetchCoordinator;
pub use self::grouping::{FALLBACK_GROUP_KEY, build_endpoint_groups};
pub use self::ordering::{
    PRIORITY_GROUP_PREFIX, UNRANKED_METHOD, compare_endpoints, compare_group_keys, method_rank,
    sort_by_group_key, sort_endpoints,
};
pub use self::snapshot::{CatalogSnapshot, SNAPSHOT_SCHEMA_VERSION};
pub use self::visual_tag::{VISUAL_TAG_PALETTE, visual_tag_for_key};
