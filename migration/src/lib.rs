pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_tracker_events;
mod m20260301_000002_cookie_events;
mod m20260301_000003_blocklist_entries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_tracker_events::Migration),
            Box::new(m20260301_000002_cookie_events::Migration),
            Box::new(m20260301_000003_blocklist_entries::Migration),
        ]
    }
}
