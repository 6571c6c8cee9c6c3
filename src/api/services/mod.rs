pub mod dashboard;
pub mod extension;
pub mod health;
pub mod identify;

pub use dashboard::dashboard_routes;
pub use extension::extension_routes;
pub use health::{HealthState, api_health, root};
pub use identify::identify_routes;
