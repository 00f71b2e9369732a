use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Partial update of a user's lifetime stats. Fields carry the new absolute
/// values; `None` fields are omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wins: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_games: Option<i32>,
}

/// Best-effort mirror of the local lifetime stats. Callers do not block on
/// or retry the response; a failed call is logged and forgotten.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<()>;
}

/// In-memory store recording every patch it receives, for tests.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    updates: Mutex<Vec<(String, UserPatch)>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<(String, UserPatch)> {
        self.updates.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<()> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id.to_string(), patch));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_omits_unset_fields() {
        let patch = UserPatch {
            wins: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"wins": 3}));
    }

    #[tokio::test]
    async fn memory_store_records_updates() {
        let store = MemoryProfileStore::new();
        store
            .update_user(
                "p1",
                UserPatch {
                    played_games: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "p1");
        assert_eq!(updates[0].1.played_games, Some(1));
    }
}
