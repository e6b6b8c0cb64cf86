use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use auth_service::auth::{RedisRevocationStore, TokenService};
use auth_service::config::Config;
use auth_service::rpc::{AuthenticatorService, RpcServer};
use auth_service::runtime::ServiceRuntime;
use auth_service::telemetry;
use auth_service::users::PgUserDirectory;

const DEFAULT_CONFIG_PATH: &str = "config/auth.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("AUTH_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_from_file(&config_path)?;

    telemetry::init_tracing(&config.log)?;
    info!(
        service = %config.service.name,
        version = %config.service.version,
        config = %config_path,
        "Starting authentication service"
    );

    let store = RedisRevocationStore::connect_with_namespace(&config.redis.url, &config.redis.namespace)
        .await
        .context("revocation store unavailable")?;
    store.ping().await?;
    info!("Connected to revocation store");

    let users = PgUserDirectory::connect(&config.postgres).await?;
    info!("Connected to user directory");

    let tokens = Arc::new(TokenService::new(&config.jwt, Arc::new(store))?);
    let service = AuthenticatorService::new(tokens, Arc::new(users.clone()));

    let address = config.authenticator.socket_addr()?;
    let server = RpcServer::builder().addr(address).build();

    let result = ServiceRuntime::new(config.service.name.clone(), address)
        .add_spawn_with_shutdown("authenticator-grpc", move |shutdown_rx| async move {
            server
                .serve(service, async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .map_err(|err| -> Box<dyn std::error::Error + Send + Sync> { Box::new(err) })
        })
        .run()
        .await;

    users.close().await;
    if let Err(err) = &result {
        error!(error = %err, "Authentication service stopped with error");
    }
    result
}
