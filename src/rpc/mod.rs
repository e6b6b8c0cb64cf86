//! 认证 RPC 端点
//!
//! 其他后端服务通过 `authenticator.Authenticator` 询问"令牌是否可用"和"令牌属于哪个用户"，
//! 无需自行校验签名或访问撤销存储。

pub mod authenticator;
pub mod client;
pub mod server;

/// `proto/authenticator.proto` 生成的代码
pub mod proto {
    tonic::include_proto!("authenticator");
}

pub use authenticator::AuthenticatorService;
pub use client::{ClientBuilder, ClientConfig, RemoteAuthenticator};
pub use server::{RpcServer, RpcServerBuilder, RpcServerConfig};
