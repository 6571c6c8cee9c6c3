pub mod blocklist_entry;
pub mod cookie_event;
pub mod tracker_event;

pub use blocklist_entry::Entity as BlocklistEntryEntity;
pub use cookie_event::Entity as CookieEventEntity;
pub use tracker_event::Entity as TrackerEventEntity;
