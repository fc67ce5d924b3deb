// Persistence module
// Keeps the custom lineup order across sessions under one storage key

pub mod gateway;
pub mod json_file;
pub mod kv;
pub mod sqlite;

pub use gateway::{OrderGateway, DEFAULT_ORDER_KEY};
pub use json_file::JsonFileStore;
pub use kv::{KeyValueStore, MemoryStore};
pub use sqlite::SqliteStore;
