//! Authenticator gRPC 端点集成测试
//!
//! 服务端监听临时端口，撤销存储和用户库使用内存实现。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth_service::auth::{MemoryRevocationStore, RevocationStore, TokenService};
use auth_service::config::JwtConfig;
use auth_service::error::InfraResult;
use auth_service::rpc::{AuthenticatorService, ClientBuilder, RemoteAuthenticator, RpcServer};
use auth_service::users::{InMemoryUserDirectory, UserDirectory};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::Code;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 3600,
    }
}

struct Harness {
    client: RemoteAuthenticator,
    tokens: Arc<TokenService>,
    users: InMemoryUserDirectory,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<(), tonic::transport::Error>>,
}

impl Harness {
    async fn start() -> Self {
        let store = MemoryRevocationStore::new();
        Self::start_with(Arc::new(store), None).await
    }

    async fn start_with(
        store: Arc<dyn RevocationStore>,
        directory: Option<Arc<dyn UserDirectory>>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&jwt_config(), store).unwrap());
        let users = InMemoryUserDirectory::new();
        let directory: Arc<dyn UserDirectory> = match directory {
            Some(directory) => directory,
            None => Arc::new(users.clone()),
        };
        let service = AuthenticatorService::new(tokens.clone(), directory);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(RpcServer::builder().build().serve_with_listener(
            listener,
            service,
            async move {
                let _ = shutdown_rx.await;
            },
        ));

        let client = ClientBuilder::new()
            .address(format!("http://{addr}"))
            .timeout(Duration::from_secs(5))
            .connect()
            .await
            .unwrap();

        Self {
            client,
            tokens,
            users,
            shutdown: Some(shutdown_tx),
            server,
        }
    }

    async fn stop(self) {
        let Harness {
            client,
            shutdown,
            server,
            ..
        } = self;
        drop(client);
        if let Some(tx) = shutdown {
            let _ = tx.send(());
        }
        server.await.unwrap().unwrap();
    }
}

struct UnreachableStore;

#[async_trait]
impl RevocationStore for UnreachableStore {
    async fn mark_revoked(&self, _token: &str, _ttl: Duration) -> InfraResult<()> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn is_revoked(&self, _token: &str) -> InfraResult<bool> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

struct BrokenDirectory;

#[async_trait]
impl UserDirectory for BrokenDirectory {
    async fn resolve_user_id(&self, _subject: &str) -> InfraResult<Option<String>> {
        Err(anyhow::anyhow!("pool timed out"))
    }
}

#[tokio::test]
async fn login_check_logout_flow() {
    let harness = Harness::start().await;
    let user_id = harness.users.insert("alice@example.com").await;
    let pair = harness.tokens.issue_pair("alice@example.com").unwrap();

    assert!(harness.client.check_token(&pair.access_token).await.unwrap());
    assert_eq!(harness.client.get_user_id(&pair.access_token).await.unwrap(), user_id);

    harness.tokens.logout(&pair.access_token).await.unwrap();

    assert!(!harness.client.check_token(&pair.access_token).await.unwrap());
    let status = harness
        .client
        .get_user_id(&pair.access_token)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    harness.stop().await;
}

#[tokio::test]
async fn valid_token_for_unknown_user_is_not_found() {
    let harness = Harness::start().await;
    let pair = harness.tokens.issue_pair("ghost@example.com").unwrap();

    assert!(harness.client.check_token(&pair.access_token).await.unwrap());
    let status = harness
        .client
        .get_user_id(&pair.access_token)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    harness.stop().await;
}

#[tokio::test]
async fn forged_and_malformed_tokens_are_rejected() {
    let harness = Harness::start().await;
    harness.users.insert("bob@example.com").await;
    let pair = harness.tokens.issue_pair("bob@example.com").unwrap();

    let mut tampered = pair.access_token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'E' } else { 'A' });

    for token in [tampered.as_str(), "", "not.a.jwt", pair.refresh_token.as_str()] {
        assert!(!harness.client.check_token(token).await.unwrap());
        let status = harness.client.get_user_id(token).await.unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }

    harness.stop().await;
}

#[tokio::test]
async fn concurrent_refreshes_both_succeed() {
    let harness = Harness::start().await;
    harness.users.insert("carol@example.com").await;
    let old = harness.tokens.issue_pair("carol@example.com").unwrap();

    let (first, second) = tokio::join!(
        harness.tokens.refresh(&old.access_token, &old.refresh_token),
        harness.tokens.refresh(&old.access_token, &old.refresh_token),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_ne!(first, second);
    assert!(!harness.client.check_token(&old.access_token).await.unwrap());
    assert!(harness.client.check_token(&first.access_token).await.unwrap());
    assert!(harness.client.check_token(&second.access_token).await.unwrap());

    harness.stop().await;
}

#[tokio::test]
async fn unreachable_revocation_store_fails_closed() {
    let harness = Harness::start_with(Arc::new(UnreachableStore), None).await;
    harness.users.insert("dave@example.com").await;
    let pair = harness.tokens.issue_pair("dave@example.com").unwrap();

    assert!(!harness.client.check_token(&pair.access_token).await.unwrap());
    let status = harness
        .client
        .get_user_id(&pair.access_token)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    harness.stop().await;
}

#[tokio::test]
async fn directory_failure_is_unavailable_without_details() {
    let harness =
        Harness::start_with(Arc::new(MemoryRevocationStore::new()), Some(Arc::new(BrokenDirectory)))
            .await;
    let pair = harness.tokens.issue_pair("erin@example.com").unwrap();

    let status = harness
        .client
        .get_user_id(&pair.access_token)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
    assert!(!status.message().contains("pool timed out"));

    harness.stop().await;
}
