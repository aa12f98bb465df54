//! Dynamic completion store
//!
//! Tracks three disjoint namespaces of names per profile:
//! - discovered fields: keys seen in rows of executed queries
//! - custom fields: names from the remote field catalog
//! - partitions: names from the remote partition listing
//!
//! A name lives in at most one namespace; whichever namespace registered it
//! first keeps it. Every mutation rebuilds the suggestion list and writes a
//! snapshot of the active profile to the injected [`KeyValueStore`].
//!
//! Mutations take `&mut self`, so one store never has two writes in flight.
//! Two stores pointed at the same profile are not coordinated and the last
//! snapshot written wins.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::persistence::KeyValueStore;
use crate::client::SearchOutcome;
use super::row::ResultRow;
use super::suggestion::{Suggestion, SuggestionCategory};

/// Persisted form of one profile's namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub discovered_fields: Vec<String>,
    #[serde(default)]
    pub custom_fields: Vec<String>,
    #[serde(default)]
    pub partitions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Discovered,
    Custom,
    Partition,
}

#[derive(Debug, Clone, Default)]
struct Namespaces {
    discovered: BTreeSet<String>,
    custom: BTreeSet<String>,
    partitions: BTreeSet<String>,
}

impl Namespaces {
    fn contains(&self, name: &str) -> bool {
        self.discovered.contains(name) || self.custom.contains(name) || self.partitions.contains(name)
    }

    fn set_mut(&mut self, namespace: Namespace) -> &mut BTreeSet<String> {
        match namespace {
            Namespace::Discovered => &mut self.discovered,
            Namespace::Custom => &mut self.custom,
            Namespace::Partition => &mut self.partitions,
        }
    }

    /// Insert unless the name is blank or already owned by any namespace
    fn insert(&mut self, namespace: Namespace, name: &str) -> bool {
        if name.trim().is_empty() || self.contains(name) {
            return false;
        }
        self.set_mut(namespace).insert(name.to_string())
    }

    /// Rebuild from a snapshot, keeping names disjoint
    ///
    /// Should a stored snapshot list a name twice, the namespace that comes
    /// first (discovered, custom, partitions) keeps it.
    fn from_snapshot(snapshot: &ProfileSnapshot) -> Self {
        let mut namespaces = Self::default();
        for name in &snapshot.discovered_fields {
            namespaces.insert(Namespace::Discovered, name);
        }
        for name in &snapshot.custom_fields {
            namespaces.insert(Namespace::Custom, name);
        }
        for name in &snapshot.partitions {
            namespaces.insert(Namespace::Partition, name);
        }
        namespaces
    }

    fn to_snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            discovered_fields: self.discovered.iter().cloned().collect(),
            custom_fields: self.custom.iter().cloned().collect(),
            partitions: self.partitions.iter().cloned().collect(),
        }
    }
}

/// Persistence key for a profile's snapshot
pub fn profile_key(prefix: &str, profile: &str) -> String {
    format!("{prefix}.{profile}")
}

/// Per-profile autocomplete state
pub struct DynamicCompletionStore {
    backend: Arc<dyn KeyValueStore>,
    key_prefix: String,
    active_profile: Option<String>,
    namespaces: Namespaces,
    /// First value seen for each field discovered in this session
    examples: HashMap<String, String>,
    suggestions: Vec<Suggestion>,
}

impl DynamicCompletionStore {
    /// Create an empty store with no active profile
    ///
    /// # Arguments
    /// * `backend` - Persistence capability supplied by the host
    /// * `key_prefix` - Prefix of the per-profile snapshot keys
    pub fn new(backend: Arc<dyn KeyValueStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            key_prefix: key_prefix.into(),
            active_profile: None,
            namespaces: Namespaces::default(),
            examples: HashMap::new(),
            suggestions: Vec::new(),
        }
    }

    /// Make `name` the active profile and load its persisted state
    ///
    /// Replaces all in-memory state. A profile without a snapshot, or whose
    /// snapshot cannot be read, starts empty.
    pub async fn load_profile(&mut self, name: &str) {
        self.active_profile = Some(name.to_string());
        let key = profile_key(&self.key_prefix, name);

        let snapshot = match self.backend.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<ProfileSnapshot>(value) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("Ignoring unreadable completion state for '{}': {}", name, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read completion state for '{}': {}", name, e);
                None
            }
        };

        match snapshot {
            Some(snapshot) => {
                self.namespaces = Namespaces::from_snapshot(&snapshot);
                self.examples.clear();
                self.rebuild();
                info!(
                    "Loaded completion state for '{}': {} discovered, {} custom, {} partitions",
                    name,
                    self.namespaces.discovered.len(),
                    self.namespaces.custom.len(),
                    self.namespaces.partitions.len()
                );
            }
            None => {
                self.clear();
                debug!("No completion state for '{}', starting empty", name);
            }
        }
    }

    /// Record every field name found in the rows' maps
    ///
    /// Names already known in any namespace are skipped. Nothing is persisted
    /// when no new name was found.
    ///
    /// # Returns
    /// * `usize` - Number of newly discovered fields
    pub async fn add_discovered_fields(&mut self, rows: &[ResultRow]) -> usize {
        let mut added = 0;

        for row in rows {
            for key in row.keys() {
                if self.namespaces.insert(Namespace::Discovered, key) {
                    if let Some(example) = row.value_text(key) {
                        self.examples.insert(key.to_string(), example);
                    }
                    added += 1;
                }
            }
        }

        if added > 0 {
            debug!("Discovered {} new fields", added);
            self.commit().await;
        }

        added
    }

    /// Learn field names from a finished search job
    ///
    /// A cancelled job feeds nothing into the store and yields its error.
    ///
    /// # Returns
    /// * `Result<usize>` - Number of newly discovered fields
    pub async fn add_search_outcome(
        &mut self,
        outcome: &SearchOutcome,
    ) -> crate::error::Result<usize> {
        let rows = outcome.completed_rows()?;
        Ok(self.add_discovered_fields(rows).await)
    }

    /// Register a custom field; no-op if the name is already known
    pub async fn add_custom_field(&mut self, name: &str) -> bool {
        self.add_names(Namespace::Custom, [name]).await == 1
    }

    /// Register a partition; no-op if the name is already known
    pub async fn add_partition(&mut self, name: &str) -> bool {
        self.add_names(Namespace::Partition, [name]).await == 1
    }

    /// Register many custom fields, persisting once
    pub async fn add_custom_fields<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_names(Namespace::Custom, names).await
    }

    /// Register many partitions, persisting once
    pub async fn add_partitions<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_names(Namespace::Partition, names).await
    }

    async fn add_names<I, S>(&mut self, namespace: Namespace, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = names
            .into_iter()
            .filter(|name| self.namespaces.insert(namespace, name.as_ref()))
            .count();

        if added > 0 {
            self.commit().await;
        }
        added
    }

    /// Delete a profile's persisted state
    ///
    /// Clearing the active profile also empties the in-memory state; clearing
    /// any other profile leaves it untouched.
    ///
    /// # Returns
    /// * `Result<()>` - The backend error when the snapshot could not be
    ///   deleted; in-memory state is reset either way
    pub async fn clear_profile(&mut self, name: &str) -> crate::error::Result<()> {
        if self.active_profile.as_deref() == Some(name) {
            self.clear();
        }

        let key = profile_key(&self.key_prefix, name);
        if let Err(e) = self.backend.set(&key, None).await {
            warn!("Failed to delete completion state for '{}': {}", name, e);
            return Err(e);
        }
        info!("Cleared completion state for '{}'", name);
        Ok(())
    }

    /// Empty all namespaces in memory
    ///
    /// Persisted snapshots and the active profile name are left alone.
    pub fn clear(&mut self) {
        self.namespaces = Namespaces::default();
        self.examples.clear();
        self.suggestions.clear();
    }

    /// Current suggestions: discovered fields, then custom fields, then partitions
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn active_profile(&self) -> Option<&str> {
        self.active_profile.as_deref()
    }

    pub fn discovered_field_count(&self) -> usize {
        self.namespaces.discovered.len()
    }

    pub fn custom_field_count(&self) -> usize {
        self.namespaces.custom.len()
    }

    pub fn partition_count(&self) -> usize {
        self.namespaces.partitions.len()
    }

    pub fn discovered_fields(&self) -> Vec<String> {
        self.namespaces.discovered.iter().cloned().collect()
    }

    pub fn custom_fields(&self) -> Vec<String> {
        self.namespaces.custom.iter().cloned().collect()
    }

    pub fn partitions(&self) -> Vec<String> {
        self.namespaces.partitions.iter().cloned().collect()
    }

    /// Whether `name` is a discovered or custom field
    ///
    /// Partitions are not fields and are not matched here, even though they
    /// do take part in deduplication.
    pub fn has_field(&self, name: &str) -> bool {
        self.namespaces.discovered.contains(name) || self.namespaces.custom.contains(name)
    }

    /// Snapshot of the in-memory namespaces
    pub fn snapshot(&self) -> ProfileSnapshot {
        self.namespaces.to_snapshot()
    }

    async fn commit(&mut self) {
        self.rebuild();
        self.persist().await;
    }

    fn rebuild(&mut self) {
        let discovered = self.namespaces.discovered.iter().map(|name| {
            Suggestion::new(name.clone(), SuggestionCategory::DiscoveredField)
                .with_example(self.examples.get(name).cloned())
        });
        let custom = self
            .namespaces
            .custom
            .iter()
            .map(|name| Suggestion::new(name.clone(), SuggestionCategory::CustomField));
        let partitions = self
            .namespaces
            .partitions
            .iter()
            .map(|name| Suggestion::new(name.clone(), SuggestionCategory::Partition));

        self.suggestions = discovered.chain(custom).chain(partitions).collect();
    }

    async fn persist(&self) {
        let Some(profile) = &self.active_profile else {
            debug!("No active profile, completion state kept in memory only");
            return;
        };

        let value = match serde_json::to_value(self.namespaces.to_snapshot()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize completion state: {}", e);
                return;
            }
        };

        let key = profile_key(&self.key_prefix, profile);
        match self.backend.set(&key, Some(value)).await {
            Ok(()) => debug!("Persisted completion state under {}", key),
            Err(e) => warn!("Failed to persist completion state for '{}': {}", profile, e),
        }
    }
}
