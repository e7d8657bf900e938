//! Business logic services.
//!
//! The enrichment facade and the service status table it reports from.

mod enrichment;
mod status;

pub use enrichment::{
    ALL_GRADES, ContentEnrichmentService, DEFAULT_CONTENT_TYPE, DEFAULT_DIFFICULTY,
    FacadeSettings, SECURITY_REVIEW_LIMIT, cache_key,
};
pub use status::{ServiceStatus, ServiceStatusRegistry};
