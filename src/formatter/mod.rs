//! Output formatting for sumoql
//!
//! This module renders command results for the terminal:
//! - Folder reports with a fixed-width children table
//! - Suggestion tables for the completion store
//! - Pretty-printed JSON for machine-readable output

mod folder;
mod table;

use serde::Serialize;

use crate::error::Result;

pub use folder::{TIMESTAMP_FORMAT, format_folder_report, format_folder_report_in};
pub use table::{SuggestionTable, TableStyle};

/// Pretty-print any serializable value as JSON
///
/// # Arguments
/// * `value` - Value to render
///
/// # Returns
/// * `Result<String>` - Indented JSON text
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
