//! Handoff storage: a per-client, ephemeral key/value relay between otherwise independent views.
//!
//! Two keys exist:
//! - `customTest`: written by the custom-topic flow, consumed (read once) by the quiz session.
//! - `testResults`: written once at submission, read by the result view, cleared before a
//!   retake or when a new test starts.
//!
//! Writes are write-once: putting a key that is already present fails with
//! `HandoffError::AlreadyWritten`. Callers that intend to replace an entry clear it first.
//! `HandoffStore` is the raw backend seam; `Handoff` layers the typed operations on top.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::result::{CustomTest, SessionResult};

pub mod memory;
pub mod redis_store;

pub use memory::MemoryHandoffStore;
pub use redis_store::RedisHandoffStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffKey {
    CustomTest,
    TestResults,
}

impl HandoffKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandoffKey::CustomTest => "customTest",
            HandoffKey::TestResults => "testResults",
        }
    }

    /// Storage key, namespaced by the browsing session it belongs to.
    pub fn storage_key(&self, client_id: Uuid) -> String {
        format!("handoff:{client_id}:{}", self.as_str())
    }
}

impl fmt::Display for HandoffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Entry '{0}' has already been written")]
    AlreadyWritten(HandoffKey),

    #[error("Entry '{key}' could not be parsed: {source}")]
    Corrupt {
        key: HandoffKey,
        source: serde_json::Error,
    },

    #[error("Failed to serialize entry: {0}")]
    Serialize(serde_json::Error),
}

/// Raw storage backend. Values are JSON strings.
#[async_trait]
pub trait HandoffStore: Send + Sync {
    /// Stores `value` only if `key` is absent.
    async fn put_raw(&self, client_id: Uuid, key: HandoffKey, value: String)
        -> Result<(), HandoffError>;

    async fn get_raw(&self, client_id: Uuid, key: HandoffKey) -> Result<Option<String>, HandoffError>;

    /// Atomically reads and deletes.
    async fn take_raw(&self, client_id: Uuid, key: HandoffKey)
        -> Result<Option<String>, HandoffError>;

    async fn clear(&self, client_id: Uuid, key: HandoffKey) -> Result<(), HandoffError>;
}

/// Typed read/write/clear operations over a `HandoffStore`.
#[derive(Clone)]
pub struct Handoff {
    store: Arc<dyn HandoffStore>,
}

impl Handoff {
    pub fn new(store: Arc<dyn HandoffStore>) -> Self {
        Self { store }
    }

    pub async fn write_custom_test(
        &self,
        client_id: Uuid,
        test: &CustomTest,
    ) -> Result<(), HandoffError> {
        self.put(client_id, HandoffKey::CustomTest, test).await
    }

    /// Consumes the pending custom test, if any.
    pub async fn take_custom_test(&self, client_id: Uuid) -> Result<Option<CustomTest>, HandoffError> {
        let raw = self.store.take_raw(client_id, HandoffKey::CustomTest).await?;
        decode(HandoffKey::CustomTest, raw)
    }

    pub async fn clear_custom_test(&self, client_id: Uuid) -> Result<(), HandoffError> {
        self.store.clear(client_id, HandoffKey::CustomTest).await
    }

    pub async fn write_test_results(
        &self,
        client_id: Uuid,
        result: &SessionResult,
    ) -> Result<(), HandoffError> {
        self.put(client_id, HandoffKey::TestResults, result).await
    }

    pub async fn read_test_results(
        &self,
        client_id: Uuid,
    ) -> Result<Option<SessionResult>, HandoffError> {
        let raw = self.store.get_raw(client_id, HandoffKey::TestResults).await?;
        decode(HandoffKey::TestResults, raw)
    }

    pub async fn clear_test_results(&self, client_id: Uuid) -> Result<(), HandoffError> {
        self.store.clear(client_id, HandoffKey::TestResults).await
    }

    async fn put<T: Serialize>(
        &self,
        client_id: Uuid,
        key: HandoffKey,
        value: &T,
    ) -> Result<(), HandoffError> {
        let raw = serde_json::to_string(value).map_err(HandoffError::Serialize)?;
        self.store.put_raw(client_id, key, raw).await
    }
}

fn decode<T: DeserializeOwned>(key: HandoffKey, raw: Option<String>) -> Result<Option<T>, HandoffError> {
    raw.map(|s| serde_json::from_str(&s).map_err(|source| HandoffError::Corrupt { key, source }))
        .transpose()
}
