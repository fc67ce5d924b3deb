// Roster module
// Player records, the ordered lineup store, and where the records come from

pub mod models;
pub mod provider;
pub mod store;

pub use models::{AtBatAdjustment, PlayerId, PlayerRecord};
pub use provider::{JsonFileProvider, RosterProvider, StaticProvider};
pub use store::RosterStore;
