use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::debug;
use uuid::Uuid;

use super::{HandoffError, HandoffKey, HandoffStore};

/// Redis-backed handoff store. Entries expire after `ttl_secs`, matching the
/// lifetime of a browsing session rather than living forever.
#[derive(Clone)]
pub struct RedisHandoffStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisHandoffStore {
    pub async fn connect(client: &redis::Client, ttl_secs: u64) -> Result<Self, HandoffError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn, ttl_secs })
    }
}

#[async_trait]
impl HandoffStore for RedisHandoffStore {
    async fn put_raw(
        &self,
        client_id: Uuid,
        key: HandoffKey,
        value: String,
    ) -> Result<(), HandoffError> {
        let mut conn = self.conn.clone();
        let storage_key = key.storage_key(client_id);

        // SET NX replies nil when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(&storage_key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;

        match reply {
            Some(_) => {
                debug!("Wrote handoff entry {storage_key}");
                Ok(())
            }
            None => Err(HandoffError::AlreadyWritten(key)),
        }
    }

    async fn get_raw(&self, client_id: Uuid, key: HandoffKey) -> Result<Option<String>, HandoffError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key.storage_key(client_id))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn take_raw(
        &self,
        client_id: Uuid,
        key: HandoffKey,
    ) -> Result<Option<String>, HandoffError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(key.storage_key(client_id))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn clear(&self, client_id: Uuid, key: HandoffKey) -> Result<(), HandoffError> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(key.storage_key(client_id))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
