//! Carpool coordination backend.
//!
//! The crate is organised as a hexagon: `domain` owns the ride lifecycle,
//! identity and ride-scoped ledgers; `inbound` exposes them over HTTP;
//! `outbound` implements the persistence and credential ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
