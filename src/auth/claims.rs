use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 令牌类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims shared by access and refresh tokens.
///
/// `sub` is the only identity payload. `jti` keeps two tokens issued for the
/// same subject within the same second distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
    pub jti: String,
    pub typ: TokenKind,
}

impl TokenClaims {
    /// Builds a claim set expiring `lifetime` after `issued_at`.
    pub fn new(
        subject: impl Into<String>,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let iat = issued_at.timestamp().max(0) as u64;
        Self {
            sub: subject.into(),
            exp: iat.saturating_add(lifetime.as_secs()),
            iat,
            jti: Uuid::new_v4().to_string(),
            typ: kind,
        }
    }

    /// 撤销条目需要保留的时长
    ///
    /// 零偏差校验只在 `exp < now` 时拒绝，令牌在第 `exp` 秒内仍然可用，
    /// 因此条目要保留到 `exp + 1` 秒的起点。令牌已经无法通过校验时返回零。
    pub fn revocation_ttl(&self, now: DateTime<Utc>) -> Duration {
        let now_ms = now.timestamp_millis().max(0) as u64;
        if self.exp < now_ms / 1000 {
            return Duration::ZERO;
        }
        let unusable_from_ms = self.exp.saturating_add(1).saturating_mul(1000);
        Duration::from_millis(unusable_from_ms.saturating_sub(now_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_is_issue_time_plus_lifetime() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let claims = TokenClaims::new(
            "alice@example.com",
            TokenKind::Access,
            issued,
            Duration::from_secs(900),
        );

        assert_eq!(claims.iat, issued.timestamp() as u64);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn revocation_ttl_covers_the_whole_expiry_second() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let claims = TokenClaims::new("bob", TokenKind::Access, issued, Duration::from_secs(60));
        let expiry = issued + chrono::Duration::seconds(60);

        assert_eq!(
            claims.revocation_ttl(issued + chrono::Duration::milliseconds(20_300)),
            Duration::from_millis(40_700)
        );
        // 第 exp 秒内令牌仍可通过校验
        assert_eq!(
            claims.revocation_ttl(expiry + chrono::Duration::milliseconds(300)),
            Duration::from_millis(700)
        );
        assert_eq!(claims.revocation_ttl(expiry), Duration::from_secs(1));
    }

    #[test]
    fn revocation_ttl_is_zero_once_token_cannot_verify() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let claims = TokenClaims::new("bob", TokenKind::Refresh, issued, Duration::from_secs(60));

        assert_eq!(
            claims.revocation_ttl(issued + chrono::Duration::seconds(61)),
            Duration::ZERO
        );
        assert_eq!(
            claims.revocation_ttl(issued + chrono::Duration::hours(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn every_claim_set_gets_its_own_id() {
        let now = Utc::now();
        let a = TokenClaims::new("carol", TokenKind::Access, now, Duration::from_secs(60));
        let b = TokenClaims::new("carol", TokenKind::Access, now, Duration::from_secs(60));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&TokenKind::Refresh).unwrap();
        assert_eq!(json, "\"refresh\"");
    }
}
