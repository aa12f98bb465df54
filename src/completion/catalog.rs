//! Prefix completion over metadata fields and the completion store
//!
//! Built-in metadata fields form tier 1. The store supplies tiers 2 and 3.

use std::collections::HashMap;

use super::store::DynamicCompletionStore;
use super::suggestion::{CompletionItem, Suggestion, SuggestionCategory};

/// Built-in metadata fields with a short description each
const BUILTIN_FIELDS: &[(&str, &str)] = &[
    ("_collector", "Name of the collector that received the message."),
    ("_collectorId", "Id of the collector that received the message."),
    ("_format", "Timestamp format detected for the message."),
    ("_index", "Partition or scheduled view the message was stored in."),
    ("_messageCount", "Sequence number of the message within its source."),
    ("_messageTime", "Time parsed from the message, in epoch milliseconds."),
    ("_raw", "The raw message text."),
    ("_receiptTime", "Time the message was received, in epoch milliseconds."),
    ("_size", "Size of the raw message in bytes."),
    ("_source", "Name of the source that collected the message."),
    ("_sourceCategory", "Source category assigned to the source."),
    ("_sourceHost", "Host name assigned to the source."),
    ("_sourceId", "Id of the source that collected the message."),
    ("_sourceName", "Source name, usually the file path or stream name."),
    ("_view", "Scheduled view the message was stored in."),
];

/// Answers completion requests for a query editor
#[derive(Debug, Clone)]
pub struct CompletionCatalog {
    metadata: Vec<Suggestion>,
}

impl Default for CompletionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionCatalog {
    /// Catalog seeded with the built-in metadata fields
    pub fn new() -> Self {
        let metadata = BUILTIN_FIELDS
            .iter()
            .map(|(name, description)| {
                Suggestion::new(*name, SuggestionCategory::Metadata).with_description(*description)
            })
            .collect();
        Self { metadata }
    }

    /// Catalog without metadata fields
    pub fn empty() -> Self {
        Self {
            metadata: Vec::new(),
        }
    }

    /// Add an extra tier-1 metadata field
    pub fn with_metadata_field(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.metadata
            .push(Suggestion::new(name, SuggestionCategory::Metadata).with_description(description));
        self
    }

    pub fn metadata_fields(&self) -> &[Suggestion] {
        &self.metadata
    }

    /// Complete `prefix` against metadata and the store's suggestions
    ///
    /// Matching is a case-insensitive prefix test; an empty prefix matches
    /// everything. When the same name (ignoring case) comes from more than one
    /// tier, only the lowest tier is kept. Results are ordered by tier, then
    /// name.
    ///
    /// # Arguments
    /// * `store` - Store holding the active profile's suggestions
    /// * `prefix` - Text typed so far
    pub fn complete(&self, store: &DynamicCompletionStore, prefix: &str) -> Vec<CompletionItem> {
        let needle = prefix.to_lowercase();
        let mut best: HashMap<String, &Suggestion> = HashMap::new();

        for suggestion in self.metadata.iter().chain(store.suggestions()) {
            let folded = suggestion.name.to_lowercase();
            if !folded.starts_with(&needle) {
                continue;
            }
            best.entry(folded)
                .and_modify(|current| {
                    if suggestion.tier() < current.tier() {
                        *current = suggestion;
                    }
                })
                .or_insert(suggestion);
        }

        let mut matches: Vec<&Suggestion> = best.into_values().collect();
        matches.sort_by(|a, b| a.tier().cmp(&b.tier()).then_with(|| a.name.cmp(&b.name)));
        matches.into_iter().map(Suggestion::to_item).collect()
    }
}
