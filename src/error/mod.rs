//! Error handling for sumoql.
//!
//! Configuration problems are real errors and stop client construction.
//! Remote API failures are reported as data by [`crate::client::ApiResponse`]
//! and only become a [`RequestError`] when a typed helper lifts them.
//! The completion store never surfaces errors; persistence failures are
//! logged and swallowed there.
//!
//! # Example
//!
//! ```rust
//! use sumoql::error::{ConfigError, Result, SumoqlError};
//!
//! fn pick_region(name: &str) -> Result<&str> {
//!     match name {
//!         "us1" | "us2" => Ok(name),
//!         other => Err(SumoqlError::Config(ConfigError::UnknownRegion(other.to_string()))),
//!     }
//! }
//!
//! assert!(pick_region("mars").is_err());
//! ```

pub mod kinds;

pub use kinds::{ConfigError, RequestError, Result, StoreError, SumoqlError};
