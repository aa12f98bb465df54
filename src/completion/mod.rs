//! Query autocomplete state
//!
//! - [`DynamicCompletionStore`] accumulates field and partition names per
//!   profile and persists them through a [`KeyValueStore`]
//! - [`CompletionCatalog`] answers prefix requests, adding built-in metadata
//!   fields ahead of the store's suggestions
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sumoql::completion::{CompletionCatalog, DynamicCompletionStore, MemoryStore, ResultRow};
//!
//! # async fn demo() {
//! let mut store = DynamicCompletionStore::new(Arc::new(MemoryStore::new()), "sumoql.completion");
//! store.load_profile("default").await;
//! store.add_discovered_fields(&[ResultRow::from_pairs([("host", "web-1")])]).await;
//!
//! for item in CompletionCatalog::new().complete(&store, "ho") {
//!     println!("{} ({})", item.name, item.detail);
//! }
//! # }
//! ```

mod catalog;
mod persistence;
mod row;
mod store;
mod suggestion;

pub use catalog::CompletionCatalog;
pub use persistence::{JsonFileStore, KeyValueStore, MemoryStore};
pub use row::ResultRow;
pub use store::{DynamicCompletionStore, ProfileSnapshot, profile_key};
pub use suggestion::{
    CompletionItem, Suggestion, SuggestionCategory, TIER_CATALOG, TIER_DISCOVERED, TIER_METADATA,
};
