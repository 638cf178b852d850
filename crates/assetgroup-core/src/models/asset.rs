//! Asset domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudAccount {
    pub id: String,
    pub name: String,
}

/// An inventory record classified into at most one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub region: String,
    pub owner_id: String,
    pub cloud_account: CloudAccount,
    pub tags: Vec<Tag>,
    /// Result of the most recent rule evaluation. Only the grouping store
    /// writes this field.
    pub group_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Build a new asset from its creation payload, ungrouped, with both
    /// timestamps set to `now`.
    pub fn new(input: CreateAsset, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            asset_type: input.asset_type,
            region: input.region,
            owner_id: input.owner_id,
            cloud_account: input.cloud_account,
            tags: input.tags,
            group_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields over this record. Identity, `created_at`
    /// and `group_name` are untouched.
    pub fn apply(&mut self, input: UpdateAsset) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(asset_type) = input.asset_type {
            self.asset_type = asset_type;
        }
        if let Some(region) = input.region {
            self.region = region;
        }
        if let Some(owner_id) = input.owner_id {
            self.owner_id = owner_id;
        }
        if let Some(cloud_account) = input.cloud_account {
            self.cloud_account = cloud_account;
        }
        if let Some(tags) = input.tags {
            self.tags = tags;
        }
    }

    /// Refresh `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub region: String,
    pub owner_id: String,
    pub cloud_account: CloudAccount,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAsset {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub region: Option<String>,
    pub owner_id: Option<String>,
    pub cloud_account: Option<CloudAccount>,
    pub tags: Option<Vec<Tag>>,
}
