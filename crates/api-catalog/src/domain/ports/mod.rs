//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod api_spec_source;
mod snapshot_repository;

#[cfg(test)]
pub use api_spec_source::MockApiSpecSource;
pub use api_spec_source::{ApiSpecRecord, ApiSpecSource, ApiSpecSourceError};
pub use snapshot_repository::{CatalogSnapshotRepository, SnapshotError};
