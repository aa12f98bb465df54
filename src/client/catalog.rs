//! Field catalog and partition listing

use serde::Deserialize;
use tracing::debug;

use super::{ApiClient, with_query};
use crate::error::Result;

/// Page size requested from the partitions endpoint
const PARTITION_PAGE_SIZE: &str = "1000";

/// A custom field registered in the account's field catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub field_name: String,
    #[serde(default)]
    pub field_id: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A log partition (index)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub name: String,
    #[serde(default)]
    pub routing_expression: Option<String>,
    #[serde(default)]
    pub analytics_tier: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct FieldList {
    #[serde(default)]
    data: Vec<CustomField>,
}

#[derive(Debug, Deserialize)]
struct PartitionPage {
    #[serde(default)]
    data: Vec<Partition>,
    #[serde(default)]
    next: Option<String>,
}

impl ApiClient {
    /// List custom fields from the field catalog
    pub async fn custom_fields(&self) -> Result<Vec<CustomField>> {
        let list: FieldList = self.get("v1/fields").await.parse()?;
        debug!("Fetched {} custom fields", list.data.len());
        Ok(list.data)
    }

    /// Names of all custom fields
    pub async fn custom_field_names(&self) -> Result<Vec<String>> {
        Ok(self
            .custom_fields()
            .await?
            .into_iter()
            .map(|f| f.field_name)
            .collect())
    }

    /// List all partitions, following pagination tokens
    pub async fn partitions(&self) -> Result<Vec<Partition>> {
        let mut partitions = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let path = match &token {
                Some(token) => with_query(
                    "v1/partitions",
                    &[("limit", PARTITION_PAGE_SIZE), ("token", token)],
                ),
                None => with_query("v1/partitions", &[("limit", PARTITION_PAGE_SIZE)]),
            };

            let page: PartitionPage = self.get(&path).await.parse()?;
            partitions.extend(page.data);

            match page.next.filter(|next| !next.is_empty()) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!("Fetched {} partitions", partitions.len());
        Ok(partitions)
    }

    /// Names of all partitions
    pub async fn partition_names(&self) -> Result<Vec<String>> {
        Ok(self
            .partitions()
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect())
    }
}
