//! `Set-Cookie` values for the session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use masnaa_config::JwtConfig;
use time::Duration;

fn build(config: &JwtConfig, value: String, max_age: i64) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::seconds(max_age))
        .build()
}

/// Cookie carrying `token` for the configured session lifetime.
pub fn session_cookie(token: &str, config: &JwtConfig) -> String {
    build(config, token.to_string(), config.session_expiry).to_string()
}

/// Expires the session cookie immediately.
pub fn clear_session_cookie(config: &JwtConfig) -> String {
    let mut cookie = build(config, String::new(), 0);
    cookie.make_removal();
    cookie.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::with_secret("cookie-test-secret-0123456789abcdef").unwrap()
    }

    #[test]
    fn test_session_cookie_attributes() {
        let header = session_cookie("abc.def.ghi", &config());
        let cookie = Cookie::parse(header).unwrap();
        assert_eq!(cookie.name(), "auth-token");
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604800)));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_secure_flag() {
        let mut config = config();
        config.cookie_secure = true;
        let cookie = Cookie::parse(session_cookie("t", &config)).unwrap();
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_clear_cookie() {
        let header = clear_session_cookie(&config());
        assert!(header.contains("Max-Age=0"));

        let cookie = Cookie::parse(header).unwrap();
        assert_eq!(cookie.name(), "auth-token");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
