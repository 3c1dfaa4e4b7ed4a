//! Candle and trade persistence.

pub mod memory;
pub mod questdb;
pub mod store;

pub use memory::InMemoryStore;
pub use questdb::QuestDatabase;
pub use store::{MarketStore, StoreError};
