//! 服务配置
//!
//! 配置在进程启动时加载一次，再以引用的方式传给各组件。

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub authenticator: AuthenticatorConfig,
    pub jwt: JwtConfig,
    pub redis: RedisConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
}

/// gRPC 认证端点监听配置（与公开 HTTP 端口分开）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthenticatorConfig {
    #[serde(default = "default_address")]
    pub address: String,
    pub port: u16,
}

impl AuthenticatorConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.address, self.port)
            .parse()
            .map_err(|err| AuthError::configuration(format!("invalid authenticator address: {err}")))
    }
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

/// JWT 配置，令牌寿命统一以秒为单位
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
}

impl JwtConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

// 避免密钥出现在日志中
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

fn default_access_ttl_secs() -> u64 {
    15 * 60
}

fn default_refresh_ttl_secs() -> u64 {
    30 * 24 * 60 * 60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "auth".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    pub prefix: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            prefix: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// 从 TOML 文件加载配置，并应用环境变量覆盖
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| AuthError::configuration(format!("failed to read {path}: {err}")))?;
        let mut config = Self::from_toml(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|err| AuthError::configuration(format!("invalid config: {err}")))
    }

    /// 应用覆盖项，`lookup` 通常是环境变量读取
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("AUTH_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Some(value) = lookup("AUTH_JWT_ACCESS_LIFETIME") {
            self.jwt.access_ttl_secs = parse_override("AUTH_JWT_ACCESS_LIFETIME", &value)?;
        }
        if let Some(value) = lookup("AUTH_JWT_REFRESH_LIFETIME") {
            self.jwt.refresh_ttl_secs = parse_override("AUTH_JWT_REFRESH_LIFETIME", &value)?;
        }
        if let Some(url) = lookup("AUTH_REDIS_URL") {
            self.redis.url = url;
        }
        if let Some(url) = lookup("AUTH_POSTGRES_URL") {
            self.postgres.url = url;
        }
        if let Some(value) = lookup("AUTH_API_AUTHENTICATOR_PORT") {
            self.authenticator.port = parse_override("AUTH_API_AUTHENTICATOR_PORT", &value)?;
        }
        if let Some(prefix) = lookup("AUTH_COOKIE_PREFIX") {
            self.cookies.prefix = prefix;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.trim().is_empty() {
            return Err(AuthError::configuration("jwt.secret must not be empty"));
        }
        if self.jwt.access_ttl_secs == 0 || self.jwt.refresh_ttl_secs == 0 {
            return Err(AuthError::configuration("token lifetimes must be positive"));
        }
        if self.jwt.refresh_ttl_secs < self.jwt.access_ttl_secs {
            return Err(AuthError::configuration(
                "jwt.refresh_ttl_secs must not be shorter than jwt.access_ttl_secs",
            ));
        }
        if self.cookies.prefix.is_empty() {
            return Err(AuthError::configuration("cookies.prefix must not be empty"));
        }
        self.authenticator.socket_addr()?;
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| AuthError::configuration(format!("invalid {key}={value}: {err}")))
}
