//! Publish/unpublish for every admin resource.
//!
//! A toggle is read, flip, single-row write, then queued revalidation. There
//! is no compare-and-swap between the read and the write: two toggles racing
//! on one id both land and the last write decides the final state.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::cache::InvalidationQueue;
use crate::entity::EntityKind;
use crate::error::ToggleError;
use crate::models::{Record, VisibilityPatch};
use crate::store::EntityStore;

pub async fn toggle_visibility(
    store: &dyn EntityStore,
    invalidations: &InvalidationQueue,
    kind: EntityKind,
    id: &str,
) -> Result<Record, ToggleError> {
    toggle_visibility_at(store, invalidations, kind, id, Utc::now()).await
}

pub async fn toggle_visibility_at(
    store: &dyn EntityStore,
    invalidations: &InvalidationQueue,
    kind: EntityKind,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Record, ToggleError> {
    let current = store
        .find_by_id(kind, id)
        .await
        .map_err(|e| log_storage(kind, id, e))?
        .ok_or_else(|| ToggleError::NotFound {
            kind,
            id: id.to_string(),
        })?;

    let patch = next_visibility(kind, &current, now);

    let updated = store
        .update(kind, id, patch)
        .await
        .map_err(|e| log_storage(kind, id, e))?;

    debug!(%kind, id, visible = updated.visible, "Visibility toggled");

    invalidations.enqueue(kind.cache_paths_for(&updated));
    Ok(updated)
}

// publishedAt is stamped once, on the first publish, and never cleared
fn next_visibility(kind: EntityKind, current: &Record, now: DateTime<Utc>) -> VisibilityPatch {
    let visible = !current.visible;
    let published_at = match current.published_at {
        None if visible && kind.tracks_published_at() => Some(now),
        existing => existing,
    };
    VisibilityPatch {
        visible,
        published_at,
    }
}

fn log_storage(kind: EntityKind, id: &str, err: crate::error::StoreError) -> ToggleError {
    let err = ToggleError::from(err);
    if let ToggleError::Storage(ref e) = err {
        error!(%kind, id, error = %e, "Visibility toggle failed");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc::Receiver;

    use crate::cache::InvalidationJob;

    fn queue() -> (InvalidationQueue, Receiver<InvalidationJob>) {
        InvalidationQueue::channel(16)
    }

    fn drain(rx: &mut Receiver<InvalidationJob>) -> Vec<InvalidationJob> {
        let mut jobs = Vec::new();
        while let Ok(job) = rx.try_recv() {
            jobs.push(job);
        }
        jobs
    }

    #[tokio::test]
    async fn first_publish_stamps_and_unpublish_keeps_timestamp() {
        let store = MemoryStore::new();
        store.insert(Record::new("p1", EntityKind::BlogPost).with_slug("launch"));
        let (q, mut rx) = queue();

        let t1 = Utc::now();
        let published = toggle_visibility_at(&store, &q, EntityKind::BlogPost, "p1", t1)
            .await
            .unwrap();
        assert!(published.visible);
        assert_eq!(published.published_at, Some(t1));

        let t2 = t1 + Duration::minutes(5);
        let hidden = toggle_visibility_at(&store, &q, EntityKind::BlogPost, "p1", t2)
            .await
            .unwrap();
        assert!(!hidden.visible);
        assert_eq!(hidden.published_at, Some(t1));

        let jobs = drain(&mut rx);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].paths, vec!["/admin/blog", "/blog", "/blog/launch"]);
    }

    #[tokio::test]
    async fn republishing_preserves_original_timestamp() {
        let store = MemoryStore::new();
        let t0 = Utc::now() - Duration::days(30);
        store.insert(
            Record::new("p1", EntityKind::BlogPost)
                .with_visible(false)
                .with_published_at(t0),
        );
        let (q, _rx) = queue();

        for _ in 0..3 {
            let r = toggle_visibility(&store, &q, EntityKind::BlogPost, "p1")
                .await
                .unwrap();
            assert_eq!(r.published_at, Some(t0));
        }
    }

    #[tokio::test]
    async fn toggling_twice_restores_visibility_for_every_kind() {
        let store = MemoryStore::new();
        let (q, _rx) = queue();

        for kind in EntityKind::ALL {
            store.insert(Record::new("x", kind).with_visible(true));
            toggle_visibility(&store, &q, kind, "x").await.unwrap();
            let back = toggle_visibility(&store, &q, kind, "x").await.unwrap();
            assert!(back.visible, "{kind}");
        }
    }

    #[tokio::test]
    async fn untracked_kinds_never_get_published_at() {
        let store = MemoryStore::new();
        store.insert(Record::new("f1", EntityKind::Formation));
        let (q, _rx) = queue();

        let r = toggle_visibility(&store, &q, EntityKind::Formation, "f1")
            .await
            .unwrap();
        assert!(r.visible);
        assert!(r.published_at.is_none());
    }

    // Counts writes and can be told to fail
    #[derive(Default)]
    struct SpyStore {
        inner: MemoryStore,
        updates: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl EntityStore for SpyStore {
        async fn find_by_id(
            &self,
            kind: EntityKind,
            id: &str,
        ) -> Result<Option<Record>, StoreError> {
            if self.fail {
                return Err(StoreError::Backend("connection reset".into()));
            }
            self.inner.find_by_id(kind, id).await
        }

        async fn update(
            &self,
            kind: EntityKind,
            id: &str,
            patch: VisibilityPatch,
        ) -> Result<Record, StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update(kind, id, patch).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_id_is_not_found_without_side_effects() {
        let store = SpyStore::default();
        let (q, mut rx) = queue();

        let err = toggle_visibility(&store, &q, EntityKind::Partner, "ghost")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ToggleError::NotFound { kind: EntityKind::Partner, ref id } if id == "ghost"
        ));
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_distinct_from_not_found() {
        let store = SpyStore {
            fail: true,
            ..Default::default()
        };
        let (q, mut rx) = queue();

        let err = toggle_visibility(&store, &q, EntityKind::Value, "v1")
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleError::Storage(StoreError::Backend(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn closed_invalidation_queue_does_not_fail_toggle() {
        let store = MemoryStore::new();
        store.insert(Record::new("v1", EntityKind::Value));
        let (q, rx) = queue();
        drop(rx);

        let r = toggle_visibility(&store, &q, EntityKind::Value, "v1")
            .await
            .unwrap();
        assert!(r.visible);
    }
}
