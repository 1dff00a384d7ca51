use futures_util::StreamExt;
use redis::{Client, ErrorKind, RedisError, RedisResult, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::JobChange;

/// Fans job changes out to other instances sharing the same backend, and
/// their changes back into the local push feed.
pub struct RedisChangeFeed {
    connection: ConnectionManager,
    channel: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChangeMessage {
    job_id: String,
    brand_id: String,
    origin: Uuid,
}

impl From<&JobChange> for ChangeMessage {
    fn from(c: &JobChange) -> Self {
        Self {
            job_id: c.job_id.clone(),
            brand_id: c.brand_id.clone(),
            origin: c.origin,
        }
    }
}

impl From<ChangeMessage> for JobChange {
    fn from(m: ChangeMessage) -> Self {
        Self {
            job_id: m.job_id,
            brand_id: m.brand_id,
            origin: m.origin,
        }
    }
}

impl RedisChangeFeed {
    /// Connects, subscribes to the app's change channel, and starts forwarding
    /// changes made elsewhere into `local`.
    pub async fn connect(
        redis_url: &str,
        app_id: &str,
        origin: Uuid,
        local: broadcast::Sender<JobChange>,
    ) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client.clone()).await?;
        let channel = keys::job_changes(app_id);

        let mut pubsub = client.get_async_connection().await?.into_pubsub();
        pubsub.subscribe(&channel).await?;
        tokio::spawn(forward_changes(pubsub, origin, local));
        debug!(channel, "Subscribed to job change channel");

        Ok(Self {
            connection,
            channel,
        })
    }

    pub async fn publish(&self, change: &JobChange) -> RedisResult<()> {
        let payload = serde_json::to_string(&ChangeMessage::from(change)).map_err(|e| {
            RedisError::from((ErrorKind::TypeError, "Serialization error", e.to_string()))
        })?;

        redis::cmd("PUBLISH")
            .arg(&self.channel)
            .arg(payload)
            .query_async(&mut self.connection.clone())
            .await
    }
}

async fn forward_changes(
    mut pubsub: redis::aio::PubSub,
    origin: Uuid,
    local: broadcast::Sender<JobChange>,
) {
    let mut messages = pubsub.on_message();
    while let Some(msg) = messages.next().await {
        let payload: String = match msg.get_payload() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Unreadable job change payload");
                continue;
            }
        };
        let change: ChangeMessage = match serde_json::from_str(&payload) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Malformed job change message");
                continue;
            }
        };
        // Our own writes were already delivered locally.
        if change.origin == origin {
            continue;
        }
        let _ = local.send(change.into());
    }
    warn!("Job change channel closed; push updates are local-only from now on");
}

/// Channel name generators
pub mod keys {
    pub fn job_changes(app_id: &str) -> String {
        format!("stitch:{}:jobs:changes", app_id)
    }
}
