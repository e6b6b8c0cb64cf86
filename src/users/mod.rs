//! 用户库边界
//!
//! 认证子系统只需要一个查询：按令牌主体（邮箱）解析用户的持久化 ID。
//! 用户注册、密码存储等由用户管理组件负责。

use async_trait::async_trait;

use crate::error::InfraResult;

pub mod memory;
pub mod postgres;

pub use self::memory::InMemoryUserDirectory;
pub use self::postgres::PgUserDirectory;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 返回主体对应的用户 ID；用户不存在时返回 `None`
    async fn resolve_user_id(&self, subject: &str) -> InfraResult<Option<String>>;
}
