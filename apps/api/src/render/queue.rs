use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Redis list holding pending compilations. Producers LPUSH, the worker BRPOPs.
pub const COMPILE_QUEUE: &str = "compile:resume";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileJob {
    pub variant_id: Uuid,
    pub queued_at: DateTime<Utc>,
}

impl CompileJob {
    pub fn new(variant_id: Uuid) -> Self {
        Self {
            variant_id,
            queued_at: Utc::now(),
        }
    }
}

/// Queues a variant for compilation. A failed push is logged; the variant row
/// is already stored and can be recompiled on its next write.
pub async fn enqueue_compile(redis: &redis::Client, variant_id: Uuid) {
    match push(redis, &CompileJob::new(variant_id)).await {
        Ok(depth) => info!(variant_id = %variant_id, depth, "Queued resume compilation"),
        Err(e) => warn!(variant_id = %variant_id, "Failed to queue resume compilation: {e}"),
    }
}

async fn push(redis: &redis::Client, job: &CompileJob) -> anyhow::Result<i64> {
    let payload = serde_json::to_string(job)?;
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let depth: i64 = conn.lpush(COMPILE_QUEUE, payload).await?;
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_payload_shape() {
        let job = CompileJob::new(Uuid::nil());
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["variant_id"], "00000000-0000-0000-0000-000000000000");
        assert!(value["queued_at"].is_string());

        let back: CompileJob = serde_json::from_value(value).unwrap();
        assert_eq!(back, job);
    }

    #[tokio::test]
    async fn test_enqueue_failure_does_not_panic() {
        // Nothing listens on port 1.
        let client = redis::Client::open("redis://127.0.0.1:1").unwrap();
        enqueue_compile(&client, Uuid::new_v4()).await;
    }
}
