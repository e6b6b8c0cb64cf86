//! 公开 HTTP 层使用的会话辅助
//!
//! 令牌以 Cookie 形式下发给浏览器；受保护路由通过 [`guard::require_session`]
//! 中间件校验访问令牌，处理函数再用 [`AuthenticatedSubject`] 取出调用方身份。

pub mod cookies;
pub mod guard;

pub use cookies::{CookieNames, SessionCookies, clear_token_cookies, set_token_cookies};
pub use guard::{AuthenticatedSubject, GuardRejection, SessionGuard, require_session};
