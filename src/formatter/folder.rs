//! Plain-text report for a content library folder
//!
//! The report is a property block followed by a table of the folder's
//! children. Output depends only on the folder and the display time zone.

use chrono::{DateTime, Local, TimeZone};
use std::cmp::Ordering;
use std::fmt::Display;
use tabled::{
    builder::Builder,
    settings::{Padding, Style},
};

use crate::client::{ContentItem, Folder};

const NAME_WIDTH: usize = 20;
const TYPE_WIDTH: usize = 10;
const ID_WIDTH: usize = 20;
const DESCRIPTION_WIDTH: usize = 30;

/// Display format for timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a folder report with timestamps in the local time zone
pub fn format_folder_report(folder: &Folder) -> String {
    format_folder_report_in(folder, &Local)
}

/// Render a folder report with timestamps shown in `tz`
///
/// # Arguments
/// * `folder` - Folder with its direct children
/// * `tz` - Time zone for displayed timestamps
///
/// # Returns
/// * `String` - Property block, blank line, then the children table
pub fn format_folder_report_in<Tz>(folder: &Folder, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();

    let description = folder
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("-");

    let properties = [
        ("Name", folder.name.clone()),
        ("ID", folder.id.clone()),
        ("Parent ID", folder.parent_id.clone()),
        ("Type", folder.item_type.clone()),
        ("Description", description.to_string()),
        ("Created", display_timestamp(&folder.created_at, tz)),
        ("Modified", display_timestamp(&folder.modified_at, tz)),
        ("Children", folder.children.len().to_string()),
    ];
    for (label, value) in properties {
        out.push_str(&format!("{:<12} {}\n", format!("{label}:"), value));
    }
    out.push('\n');

    if folder.children.is_empty() {
        out.push_str("(folder is empty)\n");
        return out;
    }

    let mut children: Vec<&ContentItem> = folder.children.iter().collect();
    children.sort_by(|a, b| compare_names(&a.name, &b.name));

    let mut builder = Builder::default();
    builder.push_record([
        pad("NAME", NAME_WIDTH),
        pad("TYPE", TYPE_WIDTH),
        pad("ID", ID_WIDTH),
        pad("DESCRIPTION", DESCRIPTION_WIDTH),
        "MODIFIED".to_string(),
    ]);
    for child in children {
        builder.push_record([
            pad(&child.name, NAME_WIDTH),
            pad(&child.item_type, TYPE_WIDTH),
            pad(&child.id, ID_WIDTH),
            fixed(child.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
            display_timestamp(&child.modified_at, tz),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::blank()).with(Padding::zero());

    for line in table.to_string().lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Case-insensitive order with an exact comparison as tie-break
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Left-align `text` to at least `width` characters
fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

/// Exactly `width` characters, truncated with `...` when longer
fn fixed(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return pad(text, width);
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Render an RFC 3339 timestamp in `tz`; anything else is shown verbatim
fn display_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn child(name: &str, id: &str, description: Option<&str>) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            name: name.to_string(),
            item_type: "Search".to_string(),
            parent_id: "F1".to_string(),
            description: description.map(str::to_string),
            created_at: "2024-03-01T10:00:00Z".to_string(),
            modified_at: "2024-03-01T11:30:00Z".to_string(),
        }
    }

    fn folder(children: Vec<ContentItem>) -> Folder {
        Folder {
            id: "F1".to_string(),
            name: "Team".to_string(),
            parent_id: "ROOT".to_string(),
            description: Some("Shared searches".to_string()),
            item_type: "Folder".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            modified_at: "2024-02-01T08:15:00Z".to_string(),
            children,
        }
    }

    fn row_index(report: &str, needle: &str) -> usize {
        report
            .lines()
            .position(|line| line.starts_with(needle))
            .unwrap_or_else(|| panic!("no line starting with {needle:?} in\n{report}"))
    }

    #[test]
    fn test_property_block() {
        let report = format_folder_report_in(&folder(vec![]), &Utc);

        assert!(report.starts_with("Name:        Team\n"));
        assert!(report.contains("ID:          F1\n"));
        assert!(report.contains("Parent ID:   ROOT\n"));
        assert!(report.contains("Description: Shared searches\n"));
        assert!(report.contains("Modified:    2024-02-01 08:15:00\n"));
        assert!(report.contains("Children:    0\n"));
        assert!(report.ends_with("(folder is empty)\n"));
    }

    #[test]
    fn test_children_sorted_case_insensitive() {
        let report = format_folder_report_in(
            &folder(vec![
                child("beta", "1", None),
                child("Alpha", "2", None),
                child("alpha", "3", None),
                child("Gamma", "4", None),
            ]),
            &Utc,
        );

        let header = row_index(&report, "NAME");
        let upper = row_index(&report, "Alpha ");
        let lower = row_index(&report, "alpha ");
        let beta = row_index(&report, "beta ");
        let gamma = row_index(&report, "Gamma ");
        assert!(header < upper);
        assert!(upper < lower);
        assert!(lower < beta);
        assert!(beta < gamma);
    }

    #[test]
    fn test_columns_have_minimum_widths() {
        let report = format_folder_report_in(&folder(vec![child("a", "x", Some("d"))]), &Utc);
        let header = report.lines().find(|l| l.starts_with("NAME")).unwrap();
        let row = report.lines().find(|l| l.starts_with("a ")).unwrap();

        let type_col = header.find("TYPE").unwrap();
        let id_col = header.find("ID").unwrap();
        let desc_col = header.find("DESCRIPTION").unwrap();
        let modified_col = header.find("MODIFIED").unwrap();

        assert!(type_col >= NAME_WIDTH);
        assert!(id_col - type_col >= TYPE_WIDTH);
        assert!(desc_col - id_col >= ID_WIDTH);
        assert!(modified_col - desc_col >= DESCRIPTION_WIDTH);
        assert_eq!(&row[type_col..type_col + 6], "Search");
        assert_eq!(&row[modified_col..], "2024-03-01 11:30:00");
    }

    #[test]
    fn test_long_description_truncated() {
        let long = "This description is much longer than thirty characters";
        let report = format_folder_report_in(&folder(vec![child("a", "x", Some(long))]), &Utc);

        assert!(report.contains("This description is much lo..."));
        assert!(!report.contains(long));
    }

    #[test]
    fn test_timestamps_follow_time_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let report = format_folder_report_in(&folder(vec![child("a", "x", None)]), &tz);
        assert!(report.contains("2024-03-01 13:30:00"));
    }

    #[test]
    fn test_unparseable_timestamp_verbatim() {
        let mut item = child("a", "x", None);
        item.modified_at = "yesterday".to_string();
        let report = format_folder_report_in(&folder(vec![item]), &Utc);
        assert!(report.contains("yesterday"));
    }

    #[test]
    fn test_report_is_stable() {
        let f = folder(vec![child("b", "2", None), child("a", "1", Some("x"))]);
        assert_eq!(
            format_folder_report_in(&f, &Utc),
            format_folder_report_in(&f, &Utc)
        );
    }

    #[test]
    fn test_fixed_width_helpers() {
        assert_eq!(fixed("abc", 5), "abc  ");
        assert_eq!(fixed("abcdefgh", 5), "ab...");
        assert_eq!(fixed("héllo wörld", 8), "héllo...");
        assert_eq!(compare_names("a", "B"), Ordering::Less);
        assert_eq!(compare_names("B", "b"), Ordering::Less);
    }
}
