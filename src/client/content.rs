//! Content library folders

use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::Result;

/// A folder in the content library, with its direct children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub item_type: String,
    pub created_at: String,
    pub modified_at: String,
    pub children: Vec<ContentItem>,
}

/// An entry listed inside a folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentItem {
    pub id: String,
    pub name: String,
    pub item_type: String,
    pub parent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub modified_at: String,
}

impl ApiClient {
    /// Fetch a folder by id
    pub async fn folder(&self, id: &str) -> Result<Folder> {
        self.get(&format!("v2/content/folders/{}", id.trim()))
            .await
            .parse()
    }

    /// Fetch the caller's personal folder
    pub async fn personal_folder(&self) -> Result<Folder> {
        self.get("v2/content/folders/personal").await.parse()
    }
}
