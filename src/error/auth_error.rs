//! 认证子系统统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// 令牌校验失败的内部原因
///
/// 只用于日志诊断，不会返回给不可信的调用方。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    /// 签名不匹配
    InvalidSignature,
    /// 结构错误（分段、base64、JSON、缺少声明、算法不符）
    Malformed,
    /// 已过期
    Expired,
    /// 令牌类型不符（例如把刷新令牌当作访问令牌）
    WrongKind,
}

impl VerificationFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationFailure::InvalidSignature => "invalid_signature",
            VerificationFailure::Malformed => "malformed",
            VerificationFailure::Expired => "expired",
            VerificationFailure::WrongKind => "wrong_kind",
        }
    }
}

/// 令牌校验错误
///
/// 对外只有一种表现（"token verification failed"），
/// 具体原因通过 [`VerificationError::reason`] 留给日志使用。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("token verification failed")]
pub struct VerificationError {
    reason: VerificationFailure,
}

impl VerificationError {
    pub fn new(reason: VerificationFailure) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> VerificationFailure {
        self.reason
    }
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let reason = match err.kind() {
            ErrorKind::InvalidSignature => VerificationFailure::InvalidSignature,
            ErrorKind::ExpiredSignature => VerificationFailure::Expired,
            _ => VerificationFailure::Malformed,
        };
        Self::new(reason)
    }
}

/// 认证子系统错误
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// 无法确认调用方身份（令牌缺失、伪造、过期或已撤销）
    #[error("unauthenticated")]
    Unauthenticated,

    /// 令牌校验失败（刷新流程使用）
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// 令牌主体在用户库中不存在
    #[error("subject not found")]
    SubjectNotFound,

    /// 签名失败
    #[error("token encoding failed: {0}")]
    Encoding(String),

    /// 撤销存储不可用
    #[error("revocation store error: {0}")]
    Store(String),

    /// 用户库不可用
    #[error("user directory error: {0}")]
    Directory(String),

    /// 配置错误（启动期致命错误）
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AuthError::Configuration(msg.into())
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::Unauthenticated => ErrorCode::AuthenticationRequired,
            AuthError::Verification(_) => ErrorCode::TokenInvalid,
            AuthError::SubjectNotFound => ErrorCode::UserNotFound,
            AuthError::Encoding(_) => ErrorCode::EncodingError,
            AuthError::Store(_) => ErrorCode::RevocationStoreError,
            AuthError::Directory(_) => ErrorCode::DatabaseError,
            AuthError::Configuration(_) => ErrorCode::ConfigurationError,
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_error_hides_reason_in_display() {
        let expired = VerificationError::new(VerificationFailure::Expired);
        let forged = VerificationError::new(VerificationFailure::InvalidSignature);

        assert_eq!(expired.to_string(), forged.to_string());
        assert_eq!(expired.reason(), VerificationFailure::Expired);
    }

    #[test]
    fn verification_converts_into_token_invalid() {
        let err: AuthError = VerificationError::new(VerificationFailure::Malformed).into();
        assert!(matches!(err, AuthError::Verification(_)));
        assert_eq!(err.code(), ErrorCode::TokenInvalid);
        assert_eq!(AuthError::SubjectNotFound.code(), ErrorCode::UserNotFound);
    }
}
