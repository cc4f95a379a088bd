//! Explicit upload → artifact association.
//!
//! Every upload registers an `ArtifactRecord` under a fresh UUID so the update
//! path can find its artifact without parsing filenames. Records live only as
//! long as the process, matching the file store's retention, and the oldest
//! are dropped once the registry is full.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::DEFAULT_MAX_SESSIONS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub record_id: Uuid,
    pub timestamp: i64,
    pub upload_name: String,
    pub artifact_name: String,
    /// Transcription produced at upload time.
    pub resume_text: String,
}

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<Uuid, ArtifactRecord>,
    order: VecDeque<Uuid>,
}

#[derive(Debug)]
pub struct ArtifactRegistry {
    records: RwLock<Records>,
    capacity: usize,
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Records::default()),
            capacity: capacity.max(1),
        }
    }

    pub async fn register(
        &self,
        timestamp: i64,
        upload_name: String,
        artifact_name: String,
        resume_text: String,
    ) -> ArtifactRecord {
        let record = ArtifactRecord {
            record_id: Uuid::new_v4(),
            timestamp,
            upload_name,
            artifact_name,
            resume_text,
        };

        let mut records = self.records.write().await;
        records.by_id.insert(record.record_id, record.clone());
        records.order.push_back(record.record_id);
        while records.by_id.len() > self.capacity {
            let Some(oldest) = records.order.pop_front() else {
                break;
            };
            records.by_id.remove(&oldest);
            debug!(record_id = %oldest, "Artifact record evicted");
        }

        record
    }

    pub async fn get(&self, record_id: Uuid) -> Option<ArtifactRecord> {
        self.records.read().await.by_id.get(&record_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn register(registry: &ArtifactRegistry, name: &str) -> ArtifactRecord {
        registry
            .register(
                1,
                format!("1_{name}.txt"),
                format!("1_{name}.tex"),
                format!("{name} resume"),
            )
            .await
    }

    #[tokio::test]
    async fn test_register_then_lookup() {
        let registry = ArtifactRegistry::new();
        let record = registry
            .register(
                1_700_000_000_000,
                "1700000000000_jane.pdf".into(),
                "1700000000000_jane.tex".into(),
                "Jane Doe\nRust engineer".into(),
            )
            .await;

        let found = registry.get(record.record_id).await.unwrap();
        assert_eq!(found, record);
        assert_eq!(found.resume_text, "Jane Doe\nRust engineer");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let registry = ArtifactRegistry::new();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_each_upload_gets_distinct_id() {
        let registry = ArtifactRegistry::new();
        let a = register(&registry, "a").await;
        let b = register(&registry, "a").await;
        assert_ne!(a.record_id, b.record_id);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_oldest_record_is_dropped_past_capacity() {
        let registry = ArtifactRegistry::with_capacity(2);
        let a = register(&registry, "a").await;
        let b = register(&registry, "b").await;
        let c = register(&registry, "c").await;

        assert_eq!(registry.len().await, 2);
        assert!(registry.get(a.record_id).await.is_none());
        assert_eq!(registry.get(b.record_id).await, Some(b));
        assert_eq!(registry.get(c.record_id).await, Some(c));
    }
}
