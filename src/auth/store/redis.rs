use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use super::RevocationStore;

const DEFAULT_NAMESPACE: &str = "auth";
const REVOKED_MARKER: &str = "true";

/// Redis 撤销存储
///
/// 持有一个进程级的 `ConnectionManager`，断线时自动重连；每次调用只克隆句柄。
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisRevocationStore {
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        Self::connect_with_namespace(url, DEFAULT_NAMESPACE).await
    }

    pub async fn connect_with_namespace(
        url: impl AsRef<str>,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let client = redis::Client::open(url.as_ref()).context("failed to open redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("failed to connect to redis")?;
        Ok(Self::with_connection(conn, namespace))
    }

    pub fn with_connection(conn: ConnectionManager, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    /// 启动时检查连通性
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("redis ping failed")?;
        Ok(())
    }

    fn revoked_key(&self, token: &str) -> String {
        format!("{}:revoked:{}", self.namespace, token)
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn mark_revoked(&self, token: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Ok(());
        }
        // 毫秒向上取整，条目不会早于令牌失效
        let ttl_ms = ttl.as_nanos().div_ceil(1_000_000) as u64;
        let mut conn = self.conn.clone();

        let _: () = conn
            .pset_ex(self.revoked_key(token), REVOKED_MARKER, ttl_ms)
            .await
            .context("failed to set revoked key")?;
        debug!(ttl_ms, "revocation entry written");

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(self.revoked_key(token))
            .await
            .context("failed to check revoked key")?;
        Ok(exists)
    }
}
