use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserDirectory;

/// 内存用户库，用于测试和本地运行
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个用户并返回新分配的 ID
    pub async fn insert(&self, subject: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        self.users.write().await.insert(subject.into(), id.clone());
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn resolve_user_id(&self, subject: &str) -> Result<Option<String>> {
        Ok(self.users.read().await.get(subject).cloned())
    }
}
