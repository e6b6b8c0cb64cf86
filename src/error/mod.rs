//! 认证服务错误处理模块
//!
//! 提供统一的错误类型、错误代码分类以及与 gRPC 状态码的转换

pub mod auth_error;
pub mod code;
pub mod grpc;

// 重新导出公共类型和函数
pub use auth_error::{AuthError, Result, VerificationError, VerificationFailure};
pub use code::{ErrorCategory, ErrorCode};
pub use grpc::map_error_code_to_grpc;

/// 基础设施层默认使用的结果类型
pub type InfraResult<T> = anyhow::Result<T>;

/// `InfraResult` 的辅助扩展，用于快速转换为统一的业务错误类型
pub trait InfraResultExt<T> {
    /// 撤销存储错误
    fn into_store_error(self) -> Result<T>;

    /// 用户库错误
    fn into_directory_error(self) -> Result<T>;
}

impl<T> InfraResultExt<T> for InfraResult<T> {
    fn into_store_error(self) -> Result<T> {
        self.map_err(|err| AuthError::Store(format!("{err:#}")))
    }

    fn into_directory_error(self) -> Result<T> {
        self.map_err(|err| AuthError::Directory(format!("{err:#}")))
    }
}
