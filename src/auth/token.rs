use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::claims::{TokenClaims, TokenKind};
use super::codec::TokenCodec;
use super::store::RevocationStore;
use crate::config::JwtConfig;
use crate::error::{AuthError, InfraResultExt, Result, VerificationError, VerificationFailure};

/// Access/refresh token pair handed to the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Why an access token was refused. Only ever logged.
#[derive(Debug)]
enum Rejection {
    Verification(VerificationFailure),
    Revoked,
    StoreUnavailable(AuthError),
}

/// Token issuance, validation and revocation.
///
/// Holds no mutable state of its own; all coordination between requests and
/// processes goes through the [`RevocationStore`].
pub struct TokenService {
    codec: TokenCodec,
    store: Arc<dyn RevocationStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Creates a new token service
    pub fn new(config: &JwtConfig, store: Arc<dyn RevocationStore>) -> Result<Self> {
        if config.access_ttl_secs == 0 || config.refresh_ttl_secs == 0 {
            return Err(AuthError::configuration("token lifetimes must be positive"));
        }
        Ok(Self {
            codec: TokenCodec::new(&config.secret)?,
            store,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        })
    }

    /// Issues an access/refresh pair for the subject. Does not touch the store.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair> {
        let now = Utc::now();
        let access = TokenClaims::new(subject, TokenKind::Access, now, self.access_ttl);
        let refresh = TokenClaims::new(subject, TokenKind::Refresh, now, self.refresh_ttl);

        let pair = TokenPair {
            access_token: self.codec.sign(&access)?,
            refresh_token: self.codec.sign(&refresh)?,
        };
        debug!(subject, access_jti = %access.jti, refresh_jti = %refresh.jti, "token pair issued");
        Ok(pair)
    }

    /// True iff the signature verifies, the token has not expired and it is
    /// not revoked. A store failure counts as "not usable".
    pub async fn is_access_token_valid(&self, access_token: &str) -> bool {
        self.check_access_token(access_token).await.is_ok()
    }

    /// Resolves the subject of a usable access token.
    pub async fn subject_of_access_token(&self, access_token: &str) -> Result<String> {
        self.check_access_token(access_token)
            .await
            .map(|claims| claims.sub)
            .map_err(|_| AuthError::Unauthenticated)
    }

    /// Decodes a refresh token. Refresh tokens are never revoked individually,
    /// so the store is not consulted.
    pub fn subject_of_refresh_token(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<String, VerificationError> {
        self.codec
            .verify_and_decode(refresh_token, TokenKind::Refresh)
            .map(|claims| claims.sub)
            .inspect_err(|err| debug!(reason = err.reason().as_str(), "refresh token rejected"))
    }

    /// Blacklists an access token for the rest of its lifetime.
    ///
    /// Tokens that are already expired or cannot be verified are unusable
    /// anyway, so nothing is written for them.
    pub async fn revoke_access_token(&self, access_token: &str) -> Result<()> {
        let claims = match self.codec.decode_ignoring_expiry(access_token, TokenKind::Access) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(reason = err.reason().as_str(), "skip revocation of unverifiable token");
                return Ok(());
            }
        };

        let ttl = claims.revocation_ttl(Utc::now());
        if ttl.is_zero() {
            debug!(jti = %claims.jti, "skip revocation of expired token");
            return Ok(());
        }

        self.store
            .mark_revoked(access_token, ttl)
            .await
            .into_store_error()?;
        info!(subject = %claims.sub, jti = %claims.jti, ttl_ms = ttl.as_millis() as u64, "access token revoked");
        Ok(())
    }

    /// Logout: revokes the caller's current access token.
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        self.revoke_access_token(access_token).await
    }

    /// Exchanges a refresh token for a new pair and revokes the superseded
    /// access token.
    ///
    /// The three steps are separate round trips. Two concurrent refreshes of the
    /// same pair can both pass the decode step and both return a fresh pair.
    pub async fn refresh(&self, old_access_token: &str, refresh_token: &str) -> Result<TokenPair> {
        let subject = self.subject_of_refresh_token(refresh_token)?;
        self.revoke_access_token(old_access_token).await?;
        let pair = self.issue_pair(&subject)?;
        info!(subject = %subject, "token pair refreshed");
        Ok(pair)
    }

    async fn check_access_token(
        &self,
        access_token: &str,
    ) -> std::result::Result<TokenClaims, Rejection> {
        let result = self.check_access_token_inner(access_token).await;
        match &result {
            Err(Rejection::StoreUnavailable(err)) => {
                warn!(error = %err, "revocation store unavailable, rejecting token");
            }
            Err(Rejection::Verification(reason)) => {
                debug!(reason = reason.as_str(), "access token rejected");
            }
            Err(Rejection::Revoked) => debug!(reason = "revoked", "access token rejected"),
            Ok(_) => {}
        }
        result
    }

    async fn check_access_token_inner(
        &self,
        access_token: &str,
    ) -> std::result::Result<TokenClaims, Rejection> {
        let claims = self
            .codec
            .verify_and_decode(access_token, TokenKind::Access)
            .map_err(|err| Rejection::Verification(err.reason()))?;

        let revoked = self
            .store
            .is_revoked(access_token)
            .await
            .into_store_error()
            .map_err(Rejection::StoreUnavailable)?;
        if revoked {
            return Err(Rejection::Revoked);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryRevocationStore;
    use crate::error::InfraResult;
    use async_trait::async_trait;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "token-service-test".to_string(),
            access_ttl_secs: 300,
            refresh_ttl_secs: 3600,
        }
    }

    fn service() -> (TokenService, MemoryRevocationStore) {
        let store = MemoryRevocationStore::new();
        let service = TokenService::new(&jwt_config(), Arc::new(store.clone())).unwrap();
        (service, store)
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

    #[tokio::test]
    async fn issued_access_token_is_valid_and_resolves_subject() {
        let (service, store) = service();
        let pair = service.issue_pair("alice@example.com").unwrap();

        assert!(service.is_access_token_valid(&pair.access_token).await);
        assert_eq!(
            service.subject_of_access_token(&pair.access_token).await.unwrap(),
            "alice@example.com"
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn revoked_token_stays_invalid_and_revocation_is_idempotent() {
        let (service, store) = service();
        let pair = service.issue_pair("bob@example.com").unwrap();

        service.revoke_access_token(&pair.access_token).await.unwrap();
        assert!(!service.is_access_token_valid(&pair.access_token).await);

        service.revoke_access_token(&pair.access_token).await.unwrap();
        assert!(!service.is_access_token_valid(&pair.access_token).await);
        assert_eq!(store.len().await, 1);

        let err = service
            .subject_of_access_token(&pair.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn refresh_token_is_never_accepted_as_access_token() {
        let (service, _) = service();
        let pair = service.issue_pair("carol@example.com").unwrap();

        assert!(!service.is_access_token_valid(&pair.refresh_token).await);
        assert_eq!(
            service.subject_of_refresh_token(&pair.refresh_token).unwrap(),
            "carol@example.com"
        );
        assert!(service.subject_of_refresh_token(&pair.access_token).is_err());
    }

    #[tokio::test]
    async fn expired_token_is_invalid_and_revoking_it_writes_nothing() {
        let (service, store) = service();
        let codec = TokenCodec::new(&jwt_config().secret).unwrap();
        let mut claims =
            TokenClaims::new("dave", TokenKind::Access, Utc::now(), Duration::from_secs(300));
        claims.exp = claims.iat - 10;
        let expired = codec.sign(&claims).unwrap();

        assert!(!service.is_access_token_valid(&expired).await);
        service.revoke_access_token(&expired).await.unwrap();
        assert!(store.is_empty().await);
    }

    fn sign_access_expiring_at(subject: &str, exp: u64) -> String {
        let codec = TokenCodec::new(&jwt_config().secret).unwrap();
        let mut claims =
            TokenClaims::new(subject, TokenKind::Access, Utc::now(), Duration::from_secs(300));
        claims.iat = exp.saturating_sub(60);
        claims.exp = exp;
        codec.sign(&claims).unwrap()
    }

    #[tokio::test]
    async fn revoking_during_the_expiry_second_still_takes_effect() {
        let (service, store) = service();
        let now_secs = Utc::now().timestamp() as u64;
        let token = sign_access_expiring_at("heidi@example.com", now_secs);

        service.revoke_access_token(&token).await.unwrap();

        assert!(!service.is_access_token_valid(&token).await);
        // 只有在撤销前已跨入下一秒时才会跳过写入
        if Utc::now().timestamp() as u64 == now_secs {
            assert_eq!(store.len().await, 1);
        }
    }

    #[tokio::test]
    async fn revocation_outlives_the_last_usable_second() {
        let (service, _) = service();
        let exp = Utc::now().timestamp() as u64 + 1;
        let token = sign_access_expiring_at("ivan@example.com", exp);

        service.revoke_access_token(&token).await.unwrap();
        assert!(!service.is_access_token_valid(&token).await);

        // 第 exp 秒的末尾，签名校验仍会接受该令牌
        let wait_ms = (exp * 1000 + 900).saturating_sub(Utc::now().timestamp_millis() as u64);
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        assert!(!service.is_access_token_valid(&token).await);
    }

    #[tokio::test]
    async fn revoking_garbage_is_a_no_op() {
        let (service, store) = service();
        service.revoke_access_token("garbage").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn refresh_rotates_pair_and_revokes_old_access_token() {
        let (service, _) = service();
        let old = service.issue_pair("erin@example.com").unwrap();

        let new = service
            .refresh(&old.access_token, &old.refresh_token)
            .await
            .unwrap();

        assert_ne!(new, old);
        assert!(!service.is_access_token_valid(&old.access_token).await);
        assert_eq!(
            service.subject_of_access_token(&new.access_token).await.unwrap(),
            "erin@example.com"
        );
    }

    #[tokio::test]
    async fn refresh_with_invalid_refresh_token_keeps_old_access_token() {
        let (service, _) = service();
        let old = service.issue_pair("frank@example.com").unwrap();

        let err = service
            .refresh(&old.access_token, "not-a-token")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Verification(_)));
        assert!(service.is_access_token_valid(&old.access_token).await);
    }

    #[tokio::test]
    async fn unreachable_store_fails_closed() {
        let service = TokenService::new(&jwt_config(), Arc::new(UnreachableStore)).unwrap();
        let pair = service.issue_pair("grace@example.com").unwrap();

        assert!(!service.is_access_token_valid(&pair.access_token).await);
        assert!(matches!(
            service.subject_of_access_token(&pair.access_token).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            service.logout(&pair.access_token).await,
            Err(AuthError::Store(_))
        ));
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        let mut config = jwt_config();
        config.access_ttl_secs = 0;
        assert!(TokenService::new(&config, Arc::new(MemoryRevocationStore::new())).is_err());
    }
}
