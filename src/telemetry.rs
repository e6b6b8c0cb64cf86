//! 日志初始化
//!
//! `RUST_LOG` 存在时优先于配置中的级别。`log` crate 的记录（sqlx、redis 等依赖）
//! 经 `tracing-log` 转发到同一个订阅者。

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogConfig, LogFormat};
use crate::error::{AuthError, Result};

/// 安装全局订阅者，进程内只能调用一次
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            ),
        ),
        LogFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
        }
    };
    installed.map_err(|err| AuthError::configuration(format!("tracing already initialized: {err}")))?;

    tracing_log::LogTracer::init()
        .map_err(|err| AuthError::configuration(format!("log bridge already initialized: {err}")))?;

    Ok(())
}

fn build_filter(env_directives: Option<String>, level: &str) -> Result<EnvFilter> {
    if let Some(directives) = env_directives.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(&directives)
            .map_err(|err| AuthError::configuration(format!("invalid RUST_LOG: {err}")));
    }
    EnvFilter::try_new(level)
        .map_err(|err| AuthError::configuration(format!("invalid log.level {level:?}: {err}")))
}
