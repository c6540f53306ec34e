use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::path::Path;
use tracing::info;

use crate::entity::EntityKind;
use crate::error::StoreError;
use crate::models::{Record, VisibilityPatch};

/// Persistence seam for admin records.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, StoreError>;

    /// Applies `patch` to one row; `NotFound` if the row is gone.
    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        patch: VisibilityPatch,
    ) -> Result<Record, StoreError>;

    /// Cheap round trip used by the keep-alive probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

// In-memory store, keyed by (kind, id)
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<(EntityKind, String), Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: Record) {
        self.records
            .insert((record.kind, record.id.clone()), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Load a JSON array of records
    pub fn seed_from_file(&self, path: &Path) -> Result<usize, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("reading {}: {}", path.display(), e)))?;
        let records: Vec<Record> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Backend(format!("parsing {}: {}", path.display(), e)))?;

        let count = records.len();
        for record in records {
            self.insert(record);
        }
        info!(count, path = %path.display(), "Seeded record store");
        Ok(count)
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .records
            .get(&(kind, id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        patch: VisibilityPatch,
    ) -> Result<Record, StoreError> {
        // get_mut holds the row lock for the whole write
        let mut row = self
            .records
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        row.visible = patch.visible;
        row.published_at = patch.published_at;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
