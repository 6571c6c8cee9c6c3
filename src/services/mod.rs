//! Service layer for business logic
//!
//! Route handlers stay thin: they parse the request, call one of these
//! services and reshape the result. Every service receives its dependencies
//! explicitly and treats a missing dependency as "unavailable".

mod blocklist_service;
mod dashboard_service;
mod identify_service;
mod ingest_service;
pub mod padding;
mod report_service;

pub use blocklist_service::*;
pub use dashboard_service::*;
pub use identify_service::*;
pub use ingest_service::*;
pub use report_service::*;
