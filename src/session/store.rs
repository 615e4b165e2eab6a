use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::ClientError;

/// Durable key/value storage for the bearer token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}

pub struct SqliteTokenStore {
    db: SqlitePool,
}

impl SqliteTokenStore {
    pub async fn connect(database_url: &str) -> Result<Self, ClientError> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Self::from_pool(db).await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self, ClientError> {
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .map_err(|e| ClientError::Storage(e.into()))?;
        Ok(Self { db })
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM session_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO session_kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM session_kv WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
