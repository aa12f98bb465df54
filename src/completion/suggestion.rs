//! Suggestion records and their display surface

use serde::{Deserialize, Serialize};

/// Built-in metadata fields, shown first
pub const TIER_METADATA: u8 = 1;

/// Fields discovered in query results
pub const TIER_DISCOVERED: u8 = 2;

/// Custom fields and partitions from the remote catalog
pub const TIER_CATALOG: u8 = 3;

/// Where a suggested name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionCategory {
    /// Built-in metadata field supplied by the consumer
    Metadata,
    DiscoveredField,
    CustomField,
    Partition,
}

impl SuggestionCategory {
    /// Priority tier; lower tiers are listed first
    pub fn tier(self) -> u8 {
        match self {
            SuggestionCategory::Metadata => TIER_METADATA,
            SuggestionCategory::DiscoveredField => TIER_DISCOVERED,
            SuggestionCategory::CustomField | SuggestionCategory::Partition => TIER_CATALOG,
        }
    }

    /// Short label shown next to the suggestion
    pub fn label(self) -> &'static str {
        match self {
            SuggestionCategory::Metadata => "Metadata field",
            SuggestionCategory::DiscoveredField => "Discovered field",
            SuggestionCategory::CustomField => "Custom field",
            SuggestionCategory::Partition => "Partition",
        }
    }
}

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub name: String,
    pub category: SuggestionCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_value: Option<String>,
    /// Extra documentation, used by metadata fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, category: SuggestionCategory) -> Self {
        Self {
            name: name.into(),
            category,
            example_value: None,
            description: None,
        }
    }

    pub fn with_example(mut self, example: Option<String>) -> Self {
        self.example_value = example;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tier(&self) -> u8 {
        self.category.tier()
    }

    /// Key that orders suggestions by tier, then name
    pub fn sort_key(&self) -> String {
        format!("{}_{}", self.tier(), self.name)
    }

    pub fn detail(&self) -> String {
        self.category.label().to_string()
    }

    pub fn documentation(&self) -> String {
        let mut doc = match (&self.description, self.category) {
            (Some(description), _) => description.clone(),
            (None, SuggestionCategory::Metadata) => "Built-in metadata field.".to_string(),
            (None, SuggestionCategory::DiscoveredField) => {
                "Field seen in recent query results.".to_string()
            }
            (None, SuggestionCategory::CustomField) => {
                "Custom field from the field catalog.".to_string()
            }
            (None, SuggestionCategory::Partition) => {
                format!("Partition. Scope a search with `_index={}`.", self.name)
            }
        };

        if let Some(example) = &self.example_value {
            doc.push_str(&format!("\n\nExample: `{example}`"));
        }

        doc
    }

    /// Render for the completion UI
    pub fn to_item(&self) -> CompletionItem {
        CompletionItem {
            name: self.name.clone(),
            category: self.category,
            detail: self.detail(),
            documentation: self.documentation(),
            sort_key: self.sort_key(),
        }
    }
}

/// Suggestion as handed to a completion UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub name: String,
    pub category: SuggestionCategory,
    pub detail: String,
    pub documentation: String,
    pub sort_key: String,
}
