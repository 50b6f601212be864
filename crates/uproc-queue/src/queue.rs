//! Upload job intake over Redis Streams.
//!
//! The queue hands payloads to the worker one at a time; the worker
//! acknowledges every delivery, success or failure, so a consumed job
//! is never redelivered.

use tracing::{debug, info};

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for upload jobs
    pub stream_name: String,
    /// Consumer group name
    pub consumer_group: String,
}

impl QueueConfig {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            stream_name: "uploads".to_string(),
            consumer_group: "uproc:workers".to_string(),
        }
    }

    /// Create config from environment variables. `REDIS_URL` is
    /// required; stream names have defaults.
    pub fn from_env() -> QueueResult<Self> {
        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| QueueError::connection_failed("REDIS_URL not set"))?;

        let mut config = Self::new(redis_url);
        if let Ok(stream) = std::env::var("QUEUE_STREAM") {
            config.stream_name = stream;
        }
        if let Ok(group) = std::env::var("QUEUE_CONSUMER_GROUP") {
            config.consumer_group = group;
        }
        Ok(config)
    }
}

/// A single delivered payload, identified for acknowledgment.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message_id: String,
    pub payload: Vec<u8>,
}

/// Job queue client.
pub struct JobQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env()?)
    }

    /// Initialize the queue (create consumer group if not exists).
    pub async fn init(&self) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => info!("Created consumer group: {}", self.config.consumer_group),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists: {}", self.config.consumer_group);
            }
            Err(e) => return Err(QueueError::Redis(e)),
        }

        Ok(())
    }

    /// Enqueue a raw payload. The producer side of the stream; used by
    /// upstream services and integration tests.
    pub async fn enqueue(&self, payload: &[u8]) -> QueueResult<String> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("*")
            .arg("job")
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        debug!("Enqueued payload with message ID {}", message_id);
        Ok(message_id)
    }

    /// Consume up to `count` deliveries, blocking up to `block_ms`.
    ///
    /// Payload decoding is the consumer's concern; entries without a
    /// `job` field are skipped and acknowledged so they never recycle.
    pub async fn consume(
        &self,
        consumer_name: &str,
        block_ms: u64,
        count: usize,
    ) -> QueueResult<Vec<Delivery>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(consumer_name)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        let mut deliveries = Vec::new();

        for stream_key in result.keys {
            for entry in stream_key.ids {
                let message_id = entry.id.clone();

                if let Some(redis::Value::BulkString(payload)) = entry.map.get("job") {
                    deliveries.push(Delivery {
                        message_id,
                        payload: payload.clone(),
                    });
                } else {
                    debug!("Skipping stream entry {} without job field", message_id);
                    self.ack(&message_id).await.ok();
                }
            }
        }

        Ok(deliveries)
    }

    /// Acknowledge a delivery (mark as consumed, remove from stream).
    pub async fn ack(&self, message_id: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        redis::cmd("XDEL")
            .arg(&self.config.stream_name)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        debug!("Acknowledged delivery: {}", message_id);
        Ok(())
    }
}
