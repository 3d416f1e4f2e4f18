//! Outbound adapters implementing the domain ports.
//!
//! - [`api_specs`]: reqwest client for the catalogue backend.
//! - [`snapshot_file`]: JSON snapshot file inside a capability directory.

pub mod api_specs;
pub mod snapshot_file;
