//! Where departure feed bodies come from.
//!
//! The board only needs the raw JSON text; [`DepartureSource`] hides whether
//! it came over HTTP ([`HttpSource`]) or from a file on disk
//! ([`MockSource`], for development without network access).

mod error;
mod http;
mod mock;

pub use error::SourceError;
pub use http::{HttpSource, MAX_BODY_BYTES};
pub use mock::MockSource;

/// A provider of raw departure feed bodies.
pub trait DepartureSource {
    /// Fetch the current departures body for the configured station.
    fn fetch_body(&self) -> impl Future<Output = Result<String, SourceError>> + Send;
}
