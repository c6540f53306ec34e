use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::EntityKind;

// Persisted admin record. Only `visible`, `published_at` and `updated_at`
// are written here; everything else rides along in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            slug: None,
            visible: false,
            published_at: None,
            updated_at: Utc::now(),
            fields: Map::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

// The two columns a visibility toggle rewrites
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityPatch {
    pub visible: bool,
    pub published_at: Option<DateTime<Utc>>,
}

// Login check responses
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAllowed {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginThrottled {
    pub error: String,
    pub message: String,
    pub retry_after: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_columns_survive_a_round_trip() {
        let raw = json!({
            "id": "f1",
            "kind": "Formation",
            "slug": "rust-basics",
            "visible": true,
            "title": "Rust basics",
            "durationHours": 14
        });
        let record: Record = serde_json::from_value(raw).unwrap();
        assert_eq!(record.kind, EntityKind::Formation);
        assert!(record.published_at.is_none());
        assert_eq!(record.fields["title"], "Rust basics");

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["durationHours"], 14);
        assert_eq!(out["publishedAt"], Value::Null);
        assert!(out.get("updatedAt").is_some());
    }

    #[test]
    fn fail_open_body_only_says_allowed() {
        let body = LoginAllowed {
            allowed: true,
            remaining: None,
            reset_time: None,
        };
        assert_eq!(serde_json::to_value(body).unwrap(), json!({ "allowed": true }));
    }
}
