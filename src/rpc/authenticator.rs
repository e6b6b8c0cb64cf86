use std::sync::Arc;

use tonic::service::interceptor::InterceptedService;
use tonic::{Request, Response, Status};
use tracing::{Instrument, debug, error, info_span, warn};

use super::proto::authenticator_server::{Authenticator, AuthenticatorServer};
use super::proto::{Token, TokenValidity, UserId};
use crate::auth::TokenService;
use crate::error::{AuthError, InfraResultExt, Result};
use crate::interceptor::{TracingInterceptor, trace_info};
use crate::users::UserDirectory;

/// `Authenticator` gRPC 服务实现
///
/// 令牌服务和用户库在进程启动时创建一次，所有调用共享。
#[derive(Clone)]
pub struct AuthenticatorService {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserDirectory>,
}

impl AuthenticatorService {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserDirectory>) -> Self {
        Self { tokens, users }
    }

    /// 包装成带追踪拦截器的 tonic 服务
    pub fn into_server(self) -> InterceptedService<AuthenticatorServer<Self>, TracingInterceptor> {
        AuthenticatorServer::with_interceptor(self, TracingInterceptor::new())
    }

    async fn resolve_user_id(&self, token: &str) -> Result<String> {
        let subject = self.tokens.subject_of_access_token(token).await?;
        self.users
            .resolve_user_id(&subject)
            .await
            .into_directory_error()?
            .ok_or(AuthError::SubjectNotFound)
    }
}

#[tonic::async_trait]
impl Authenticator for AuthenticatorService {
    async fn check_token(
        &self,
        request: Request<Token>,
    ) -> std::result::Result<Response<TokenValidity>, Status> {
        let trace = trace_info(&request);
        let span = info_span!(
            "check_token",
            trace_id = %trace.trace_id,
            request_id = %trace.request_id
        );
        let token = request.into_inner().token;

        let is_valid = self
            .tokens
            .is_access_token_valid(&token)
            .instrument(span)
            .await;
        debug!(is_valid, "CheckToken handled");

        Ok(Response::new(TokenValidity { is_valid }))
    }

    async fn get_user_id(
        &self,
        request: Request<Token>,
    ) -> std::result::Result<Response<UserId>, Status> {
        let trace = trace_info(&request);
        let span = info_span!(
            "get_user_id",
            trace_id = %trace.trace_id,
            request_id = %trace.request_id
        );
        let token = request.into_inner().token;

        match self.resolve_user_id(&token).instrument(span).await {
            Ok(user_id) => Ok(Response::new(UserId { user_id })),
            Err(err) => {
                match &err {
                    AuthError::SubjectNotFound => warn!("token subject has no stored user"),
                    AuthError::Directory(reason) => error!(%reason, "user directory lookup failed"),
                    _ => debug!(error = %err, "GetUserID rejected"),
                }
                Err(err.into())
            }
        }
    }
}
