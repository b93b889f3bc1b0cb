use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{HandoffError, HandoffKey, HandoffStore};

/// Process-local handoff store, used when no `REDIS_URL` is configured and in tests.
/// Entries live until cleared or the process exits.
#[derive(Default)]
pub struct MemoryHandoffStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HandoffStore for MemoryHandoffStore {
    async fn put_raw(
        &self,
        client_id: Uuid,
        key: HandoffKey,
        value: String,
    ) -> Result<(), HandoffError> {
        let mut entries = self.entries.lock().await;
        let storage_key = key.storage_key(client_id);
        if entries.contains_key(&storage_key) {
            return Err(HandoffError::AlreadyWritten(key));
        }
        entries.insert(storage_key, value);
        Ok(())
    }

    async fn get_raw(&self, client_id: Uuid, key: HandoffKey) -> Result<Option<String>, HandoffError> {
        Ok(self.entries.lock().await.get(&key.storage_key(client_id)).cloned())
    }

    async fn take_raw(
        &self,
        client_id: Uuid,
        key: HandoffKey,
    ) -> Result<Option<String>, HandoffError> {
        Ok(self.entries.lock().await.remove(&key.storage_key(client_id)))
    }

    async fn clear(&self, client_id: Uuid, key: HandoffKey) -> Result<(), HandoffError> {
        self.entries.lock().await.remove(&key.storage_key(client_id));
        Ok(())
    }
}
