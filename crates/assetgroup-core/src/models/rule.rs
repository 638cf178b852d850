//! Grouping rule domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Asset field names a condition can target.
pub const FIELD_TYPE: &str = "type";
pub const FIELD_NAME: &str = "name";
pub const FIELD_TAG: &str = "tag";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOperator {
    Equals,
    Contains,
    Exists,
}

/// A single predicate over one asset field.
///
/// `field` is deliberately an open string: combinations other than the
/// ones the evaluator knows simply never match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub tag_key: Option<String>,
    #[serde(default)]
    pub tag_value: Option<String>,
}

impl Condition {
    /// `field` compared against `value` with `operator`.
    pub fn new(field: &str, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
            tag_key: None,
            tag_value: None,
        }
    }

    /// Matches assets carrying a tag with `key`.
    pub fn tag_exists(key: impl Into<String>) -> Self {
        Self {
            field: FIELD_TAG.into(),
            operator: ConditionOperator::Exists,
            value: None,
            tag_key: Some(key.into()),
            tag_value: None,
        }
    }

    /// Matches assets carrying the exact `key`/`value` tag.
    pub fn tag_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: FIELD_TAG.into(),
            operator: ConditionOperator::Equals,
            value: None,
            tag_key: Some(key.into()),
            tag_value: Some(value.into()),
        }
    }
}

/// A named group and the AND-combined conditions an asset must satisfy
/// to join it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub group_name: String,
    pub conditions: Vec<Condition>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(input: CreateRule, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_name: input.group_name,
            conditions: input.conditions,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the supplied fields over this rule and refresh `updated_at`.
    pub fn apply(&mut self, input: UpdateRule, now: DateTime<Utc>) {
        if let Some(group_name) = input.group_name {
            self.group_name = group_name;
        }
        if let Some(conditions) = input.conditions {
            self.conditions = conditions;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        self.updated_at = now.max(self.created_at);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRule {
    pub group_name: String,
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRule {
    pub group_name: Option<String>,
    pub conditions: Option<Vec<Condition>>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    /// An explicit JSON `null` clears; an absent key leaves it alone.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

/// Maps a present key to `Some(..)` so `null` survives as `Some(None)`.
/// Absent keys never reach this and fall back to `None` via `default`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
