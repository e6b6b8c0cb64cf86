//! gRPC 错误处理
//!
//! 提供 AuthError 到 tonic::Status 的转换

use super::{AuthError, ErrorCode};
use tonic::{Code, Status};

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        let mut status = Status::new(map_error_code_to_grpc(code), public_message(&err));

        // 添加错误代码到 metadata
        if let Ok(value) = code.as_u32().to_string().parse() {
            status.metadata_mut().insert("error-code", value);
        }

        status
    }
}

/// 对外暴露的错误信息，不携带内部细节
fn public_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::Unauthenticated | AuthError::Verification(_) => "Could not validate credentials",
        AuthError::SubjectNotFound => "Subject not found",
        AuthError::Store(_) | AuthError::Directory(_) => "Authentication backend unavailable",
        AuthError::Encoding(_) | AuthError::Configuration(_) => "Internal error",
    }
}

/// 将错误代码映射到 gRPC 状态码
pub fn map_error_code_to_grpc(code: ErrorCode) -> Code {
    match code {
        // 认证相关
        ErrorCode::AuthenticationRequired | ErrorCode::TokenInvalid => Code::Unauthenticated,

        // 未找到
        ErrorCode::UserNotFound => Code::NotFound,

        // 服务不可用
        ErrorCode::RevocationStoreError | ErrorCode::DatabaseError => Code::Unavailable,

        // 内部错误
        ErrorCode::ConfigurationError | ErrorCode::EncodingError => Code::Internal,
    }
}
