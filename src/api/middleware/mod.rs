//! HTTP middleware

pub mod request_id;
pub mod timing;

pub use request_id::{RequestId, RequestIdMiddleware};
pub use timing::TimingMiddleware;
