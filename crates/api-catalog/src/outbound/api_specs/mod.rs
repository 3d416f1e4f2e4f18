//! Catalogue backend adapters.
//!
//! This module provides a thin HTTP implementation of the `ApiSpecSource`
//! port.

mod dto;
mod http_source;

pub use http_source::ApiSpecHttpSource;
