//! sumoql library
//!
//! Query assistance for a Sumo Logic-style log-analytics service: a Basic-Auth
//! API client, a per-profile autocomplete store fed by query results and the
//! remote field catalog, and text formatting for folder listings.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `client`: Remote API client, region table and search jobs
//! - `completion`: Dynamic completion store and prefix completion
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sumoql::{ApiClient, DynamicCompletionStore, completion::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("us2", "my-access-id", "my-access-key", Duration::from_secs(30))?;
//!
//!     let mut store = DynamicCompletionStore::new(Arc::new(MemoryStore::new()), "sumoql.completion");
//!     store.load_profile("default").await;
//!     store.add_custom_fields(client.custom_field_names().await?).await;
//!
//!     println!("{} custom fields", store.custom_field_count());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod formatter;

// Re-export commonly used types
pub use client::{ApiClient, ApiResponse};
pub use completion::{CompletionCatalog, DynamicCompletionStore, KeyValueStore};
pub use config::Config;
pub use error::{Result, SumoqlError};
pub use formatter::{format_folder_report, format_folder_report_in};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
