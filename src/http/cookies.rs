use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};

use crate::auth::TokenPair;
use crate::config::CookieConfig;
use crate::error::{AuthError, Result};

const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; SameSite=Lax";

/// 会话 Cookie 名称：`<prefix>_access_token` / `<prefix>_refresh_token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieNames {
    pub access: String,
    pub refresh: String,
}

impl CookieNames {
    pub fn new(prefix: &str) -> Self {
        Self {
            access: format!("{prefix}_access_token"),
            refresh: format!("{prefix}_refresh_token"),
        }
    }

    pub fn from_config(config: &CookieConfig) -> Self {
        Self::new(&config.prefix)
    }
}

/// 请求中携带的会话令牌
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionCookies {
    /// 从所有 `Cookie` 头中读取两个令牌，空值视为缺失
    pub fn from_headers(headers: &HeaderMap, names: &CookieNames) -> Self {
        let mut cookies = Self::default();

        let pairs = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='));

        for (name, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if name == names.access {
                cookies.access_token = Some(value.to_string());
            } else if name == names.refresh {
                cookies.refresh_token = Some(value.to_string());
            }
        }

        cookies
    }
}

/// 追加两个 `Set-Cookie` 头，下发新的令牌对
pub fn set_token_cookies(headers: &mut HeaderMap, names: &CookieNames, pair: &TokenPair) -> Result<()> {
    headers.append(SET_COOKIE, cookie_value(&names.access, &pair.access_token, None)?);
    headers.append(SET_COOKIE, cookie_value(&names.refresh, &pair.refresh_token, None)?);
    Ok(())
}

/// 登出时让浏览器立即删除两个 Cookie
pub fn clear_token_cookies(headers: &mut HeaderMap, names: &CookieNames) -> Result<()> {
    headers.append(SET_COOKIE, cookie_value(&names.access, "", Some(0))?);
    headers.append(SET_COOKIE, cookie_value(&names.refresh, "", Some(0))?);
    Ok(())
}

fn cookie_value(name: &str, value: &str, max_age: Option<u64>) -> Result<HeaderValue> {
    let rendered = match max_age {
        Some(max_age) => format!("{name}={value}; {COOKIE_ATTRIBUTES}; Max-Age={max_age}"),
        None => format!("{name}={value}; {COOKIE_ATTRIBUTES}"),
    };
    HeaderValue::from_str(&rendered)
        .map_err(|err| AuthError::Encoding(format!("invalid cookie value for {name}: {err}")))
}
