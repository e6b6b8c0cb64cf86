use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::UserDirectory;
use crate::config::PostgresConfig;

/// `users` 表上的用户库实现
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 启动时创建连接池，整个进程生命周期内复用
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .context("failed to connect to postgres")?;
        Ok(Self::new(pool))
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn resolve_user_id(&self, subject: &str) -> Result<Option<String>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .context("failed to resolve user id")?;
        Ok(id.map(|id| id.to_string()))
    }
}
