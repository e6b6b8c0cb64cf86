//! Authentication token subsystem
//!
//! Issues signed access/refresh token pairs, keeps a shared revocation list in
//! Redis, and exposes the `Authenticator` gRPC endpoint that other backend
//! services call to validate tokens and resolve the calling user.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod rpc;
pub mod runtime;
pub mod telemetry;
pub mod users;
pub mod utils;

pub use auth::{
    MemoryRevocationStore, RedisRevocationStore, RevocationStore, TokenClaims, TokenKind,
    TokenPair, TokenService,
};
pub use config::Config;
pub use error::{AuthError, ErrorCategory, ErrorCode, Result};
pub use rpc::{AuthenticatorService, RemoteAuthenticator, RpcServer};
pub use runtime::ServiceRuntime;
pub use users::{InMemoryUserDirectory, PgUserDirectory, UserDirectory};
