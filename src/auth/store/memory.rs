use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::RevocationStore;

/// 进程内撤销存储
///
/// 撤销不会被其他进程看到，只适用于测试和单进程开发环境。
#[derive(Clone, Default)]
pub struct MemoryRevocationStore {
    entries: Arc<RwLock<HashMap<String, Instant>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的条目数
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|deadline| **deadline > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn mark_revoked(&self, token: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Ok(());
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, deadline| *deadline > now);
        entries.insert(token.to_string(), now + ttl);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(token)
            .is_some_and(|deadline| *deadline > Instant::now()))
    }
}
