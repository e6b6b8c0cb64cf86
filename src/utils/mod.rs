//! 工具函数模块

use std::net::SocketAddr;
use tonic::Request;

/// 提取追踪ID
pub fn extract_trace_id<T>(req: &Request<T>) -> Option<String> {
    extract_metadata(req, "x-trace-id")
}

/// 提取请求ID
pub fn extract_request_id<T>(req: &Request<T>) -> Option<String> {
    extract_metadata(req, "x-request-id")
}

fn extract_metadata<T>(req: &Request<T>, key: &str) -> Option<String> {
    req.metadata()
        .get(key)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// 等待服务启动就绪（通过 TCP 连接重试）
///
/// 使用指数退避策略重试连接，直到服务真正可以接受连接。
pub async fn wait_for_server_ready(
    address: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio::time::{sleep, timeout};
    use tracing::debug;

    const MAX_RETRIES: u32 = 30;
    const INITIAL_DELAY_MS: u64 = 50;
    const MAX_DELAY_MS: u64 = 500;
    const TOTAL_TIMEOUT_SECS: u64 = 10;

    // 监听 0.0.0.0 / [::] 时改为探测回环地址
    let target = if address.ip().is_unspecified() {
        let loopback = if address.is_ipv4() {
            std::net::Ipv4Addr::LOCALHOST.into()
        } else {
            std::net::Ipv6Addr::LOCALHOST.into()
        };
        SocketAddr::new(loopback, address.port())
    } else {
        address
    };

    let start = std::time::Instant::now();
    let mut delay_ms = INITIAL_DELAY_MS;

    for attempt in 1..=MAX_RETRIES {
        if start.elapsed().as_secs() > TOTAL_TIMEOUT_SECS {
            return Err(format!(
                "Server readiness check timeout after {} seconds",
                TOTAL_TIMEOUT_SECS
            )
            .into());
        }

        match timeout(Duration::from_millis(100), TcpStream::connect(target)).await {
            Ok(Ok(_)) => {
                debug!(
                    address = %target,
                    attempts = attempt,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Server is ready"
                );
                return Ok(());
            }
            Ok(Err(e)) => {
                debug!(address = %target, attempt, error = %e, "Connection attempt failed, retrying...");
            }
            Err(_) => {
                debug!(address = %target, attempt, "Connection attempt timed out, retrying...");
            }
        }

        sleep(Duration::from_millis(delay_ms)).await;
        delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
    }

    Err(format!("Server readiness check failed after {} attempts", MAX_RETRIES).into())
}
