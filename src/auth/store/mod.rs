use std::time::Duration;

use async_trait::async_trait;

use crate::error::InfraResult;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryRevocationStore;
pub use self::redis::RedisRevocationStore;

/// 撤销存储接口
///
/// 以原始访问令牌字符串为键记录"已撤销"标记，条目在 `ttl` 到期后自动消失。
/// 生产环境必须使用所有进程共享的存储，撤销才能在进程间可见。
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// 标记令牌已撤销；重复标记视为成功
    async fn mark_revoked(&self, token: &str, ttl: Duration) -> InfraResult<()>;

    /// 检查令牌是否已被撤销
    async fn is_revoked(&self, token: &str) -> InfraResult<bool>;
}
