//! Redis service relaying rearrangement events to external deliverers

use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Infrastructure(format!("Failed to create Redis client: {}", e)))?;

        // Reconnects on its own after the first successful connection
        let mut manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Infrastructure(format!("Failed to connect to Redis: {}", e)))?;

        // Test connection
        redis::cmd("PING")
            .query_async::<_, String>(&mut manager)
            .await
            .map_err(|e| AppError::Infrastructure(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { manager })
    }

    /// Publish a payload on a pub/sub channel, returning the receiver count
    pub async fn publish(&self, channel: &str, payload: &str) -> AppResult<i64> {
        let mut conn = self.manager.clone();

        let receivers: i64 = conn
            .publish(channel, payload)
            .await
            .map_err(|e| AppError::Infrastructure(format!("Failed to publish to Redis: {}", e)))?;

        Ok(receivers)
    }
}
