pub use super::rice_prices::Entity as RicePrices;
pub use super::sync_status::Entity as SyncStatus;
