//! External slot index.
//!
//! Every job contributes its split clips to shared, per-slot sets of
//! storage keys. Registration is append-only set membership, safe for
//! uncoordinated concurrent writers and idempotent under duplicates.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::QueueResult;

/// Records uploaded split-clip keys against their slot.
#[async_trait]
pub trait SlotRegistry: Send + Sync {
    async fn add_to_slot(&self, slot: usize, key: &str) -> QueueResult<()>;
}

/// Redis-backed slot index using one set per slot.
pub struct RedisSlotIndex {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSlotIndex {
    pub fn new(redis_url: &str) -> QueueResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            key_prefix: "slots".to_string(),
        })
    }

    fn slot_key(&self, slot: usize) -> String {
        format!("{}:{}", self.key_prefix, slot)
    }

    /// All keys registered against a slot, in no particular order.
    pub async fn slot_members(&self, slot: usize) -> QueueResult<Vec<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let members: Vec<String> = conn.smembers(self.slot_key(slot)).await?;
        Ok(members)
    }
}

#[async_trait]
impl SlotRegistry for RedisSlotIndex {
    async fn add_to_slot(&self, slot: usize, key: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _added: u64 = conn.sadd(self.slot_key(slot), key).await?;
        debug!("Registered {} in slot {}", key, slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_slot_registration_is_idempotent() {
        dotenvy::dotenv().ok();

        let redis_url = std::env::var("REDIS_URL").expect("REDIS_URL not set");
        let index = RedisSlotIndex::new(&redis_url).expect("Failed to create slot index");

        let key = "split/0/itest.mp4";
        index.add_to_slot(900, key).await.expect("first add");
        index.add_to_slot(900, key).await.expect("second add");

        let members = index.slot_members(900).await.expect("members");
        assert_eq!(members.iter().filter(|m| m.as_str() == key).count(), 1);
    }
}
