//! 错误代码和错误类别定义
//!
//! 错误代码按类别分组，每个类别占用1000个代码范围：
//! - 2000-2999: 认证相关错误
//! - 5000-5999: 用户相关错误
//! - 6000-6999: 系统相关错误
//! - 8000-8999: 序列化相关错误

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误代码枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 认证相关错误 (2000-2999)
    // ============================================================
    AuthenticationRequired = 2003,
    TokenInvalid = 2005,

    // ============================================================
    // 用户相关错误 (5000-5999)
    // ============================================================
    UserNotFound = 5000,

    // ============================================================
    // 系统相关错误 (6000-6999)
    // ============================================================
    ConfigurationError = 6003,
    DatabaseError = 6004,
    RevocationStoreError = 6005,

    // ============================================================
    // 序列化相关错误 (8000-8999)
    // ============================================================
    EncodingError = 8002,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            2003 => Some(ErrorCode::AuthenticationRequired),
            2005 => Some(ErrorCode::TokenInvalid),
            5000 => Some(ErrorCode::UserNotFound),
            6003 => Some(ErrorCode::ConfigurationError),
            6004 => Some(ErrorCode::DatabaseError),
            6005 => Some(ErrorCode::RevocationStoreError),
            8002 => Some(ErrorCode::EncodingError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            ErrorCode::TokenInvalid => "TOKEN_INVALID",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::RevocationStoreError => "REVOCATION_STORE_ERROR",
            ErrorCode::EncodingError => "ENCODING_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            2000..=2999 => ErrorCategory::Authentication,
            5000..=5999 => ErrorCategory::User,
            8000..=8999 => ErrorCategory::Serialization,
            _ => ErrorCategory::System,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Authentication,
    User,
    System,
    Serialization,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Authentication => write!(f, "AUTHENTICATION"),
            ErrorCategory::User => write!(f, "USER"),
            ErrorCategory::System => write!(f, "SYSTEM"),
            ErrorCategory::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}
