//! 认证端点客户端
//!
//! 供其他后端服务调用 `CheckToken` / `GetUserID`

use std::time::Duration;

use tonic::Status;
use tonic::transport::{Channel, Endpoint};

use super::proto::Token;
use super::proto::authenticator_client::AuthenticatorClient;

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:50051".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        }
    }
}

/// 客户端构建器
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub async fn connect(self) -> Result<RemoteAuthenticator, tonic::transport::Error> {
        RemoteAuthenticator::connect(self.config).await
    }
}

/// 远程认证器
///
/// `Channel` 内部复用连接，克隆成本很低，可在多个任务间共享。
#[derive(Clone)]
pub struct RemoteAuthenticator {
    inner: AuthenticatorClient<Channel>,
}

impl RemoteAuthenticator {
    pub async fn connect(config: ClientConfig) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(config.address)?
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .connect()
            .await?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: AuthenticatorClient::new(channel),
        }
    }

    /// 访问令牌当前是否可用
    pub async fn check_token(&self, token: impl Into<String>) -> Result<bool, Status> {
        let mut client = self.inner.clone();
        let response = client.check_token(Token { token: token.into() }).await?;
        Ok(response.into_inner().is_valid)
    }

    /// 访问令牌所属用户的 ID；令牌不可用时返回 `UNAUTHENTICATED`
    pub async fn get_user_id(&self, token: impl Into<String>) -> Result<String, Status> {
        let mut client = self.inner.clone();
        let response = client.get_user_id(Token { token: token.into() }).await?;
        Ok(response.into_inner().user_id)
    }
}
