//! gRPC 服务端模块
//!
//! 提供认证端点的服务器构建器和配置

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::info;

use super::AuthenticatorService;

/// 服务端配置
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub addr: SocketAddr,
    pub max_concurrent_streams: Option<u32>,
    pub tcp_nodelay: bool,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 50051)),
            max_concurrent_streams: Some(1000),
            tcp_nodelay: true,
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

/// 服务器构建器
#[derive(Default)]
pub struct RpcServerBuilder {
    config: RpcServerConfig,
}

impl RpcServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.config.addr = addr;
        self
    }

    pub fn max_concurrent_streams(mut self, max: u32) -> Self {
        self.config.max_concurrent_streams = Some(max);
        self
    }

    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.config.tcp_nodelay = nodelay;
        self
    }

    pub fn tcp_keepalive(mut self, keepalive: Duration) -> Self {
        self.config.tcp_keepalive = Some(keepalive);
        self
    }

    pub fn build(self) -> RpcServer {
        RpcServer::new(self.config)
    }
}

/// 认证端点 gRPC 服务器
pub struct RpcServer {
    config: RpcServerConfig,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> RpcServerBuilder {
        RpcServerBuilder::new()
    }

    fn transport(&self) -> Server {
        let mut server = Server::builder()
            .tcp_nodelay(self.config.tcp_nodelay)
            .tcp_keepalive(self.config.tcp_keepalive);

        if let Some(max_streams) = self.config.max_concurrent_streams {
            server = server.concurrency_limit_per_connection(max_streams as usize);
        }

        server
    }

    /// 在配置的地址上监听，直到 `shutdown` 完成
    pub async fn serve<F>(
        self,
        service: AuthenticatorService,
        shutdown: F,
    ) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        info!(address = %self.config.addr, "Authenticator gRPC server listening");
        self.transport()
            .add_service(service.into_server())
            .serve_with_shutdown(self.config.addr, shutdown)
            .await
    }

    /// 在已绑定的监听器上提供服务（测试中使用临时端口）
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        service: AuthenticatorService,
        shutdown: F,
    ) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(address = %addr, "Authenticator gRPC server listening");
        }
        self.transport()
            .add_service(service.into_server())
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
    }
}
