//! Table formatting for completion suggestions using tabled

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::completion::CompletionItem;

/// Maximum width for the documentation column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 60;

/// Table formatter for suggestion lists
pub struct SuggestionTable {
    /// Maximum documentation column width
    max_column_width: usize,

    /// Table style
    style: TableStyle,

    /// Enable colored output
    use_colors: bool,
}

/// Available table styles
#[derive(Debug, Clone, Copy)]
pub enum TableStyle {
    /// Modern style with box-drawing characters
    Modern,
    /// ASCII style with basic characters
    Ascii,
    /// Markdown style
    Markdown,
}

impl SuggestionTable {
    /// Create a new suggestion table with default settings
    pub fn new() -> Self {
        Self::with_colors(false)
    }

    /// Create a new suggestion table with color support
    ///
    /// # Arguments
    /// * `use_colors` - Color the header row
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Modern,
            use_colors,
        }
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Format completion items as a table, in the order given
    ///
    /// # Arguments
    /// * `items` - Items already sorted for display
    ///
    /// # Returns
    /// * `String` - Table string, or a placeholder when there are no items
    pub fn format(&self, items: &[CompletionItem]) -> String {
        if items.is_empty() {
            return "(no suggestions)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(["NAME", "KIND", "DOCUMENTATION"]);
        for item in items {
            builder.push_record([
                item.name.clone(),
                item.detail.clone(),
                item.documentation.replace("\n\n", " "),
            ]);
        }

        let mut table = builder.build();
        self.apply_style(&mut table);

        // Wrap long documentation instead of truncating it
        table.with(Modify::new(Columns::new(2..=2)).with(Width::wrap(self.max_column_width)));
        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        table.to_string()
    }

    fn apply_style(&self, table: &mut Table) {
        match self.style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Markdown => table.with(Style::markdown()),
        };
    }
}

impl Default for SuggestionTable {
    fn default() -> Self {
        Self::new()
    }
}
