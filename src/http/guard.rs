use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::request::Parts;
use serde_json::json;
use tracing::debug;

use super::cookies::{CookieNames, SessionCookies};
use crate::auth::TokenService;

/// 受保护路由的中间件状态
#[derive(Clone)]
pub struct SessionGuard {
    tokens: Arc<TokenService>,
    names: Arc<CookieNames>,
}

impl SessionGuard {
    pub fn new(tokens: Arc<TokenService>, names: CookieNames) -> Self {
        Self {
            tokens,
            names: Arc::new(names),
        }
    }

    /// 从请求头中取出访问令牌并确认其可用
    pub async fn authenticate(&self, headers: &http::HeaderMap) -> Result<AuthenticatedSubject, GuardRejection> {
        let access_token = SessionCookies::from_headers(headers, &self.names)
            .access_token
            .ok_or(GuardRejection::SignInRequired)?;

        let subject = self
            .tokens
            .subject_of_access_token(&access_token)
            .await
            .map_err(|_| GuardRejection::SignInRequired)?;

        Ok(AuthenticatedSubject {
            subject,
            access_token,
        })
    }
}

/// 已通过校验的调用方
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub subject: String,
    /// 原始访问令牌，登出和刷新时需要
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    SignInRequired,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::SignInRequired => (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "Sign in required!" })),
            )
                .into_response(),
        }
    }
}

/// 会话中间件
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/me", get(me))
///     .layer(axum::middleware::from_fn_with_state(guard, require_session));
/// ```
pub async fn require_session(
    State(guard): State<SessionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let caller = guard
        .authenticate(request.headers())
        .await
        .inspect_err(|_| debug!(path = %request.uri().path(), "session rejected"))?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedSubject
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubject>()
            .cloned()
            .ok_or(GuardRejection::SignInRequired)
    }
}
