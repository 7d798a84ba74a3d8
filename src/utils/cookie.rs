use axum::http::{header, HeaderMap};
use std::{env, sync::OnceLock};

pub const SESSION_COOKIE: &str = "user_session";

/// Roughly the lifetime of browser local storage: 400 days, the cap most browsers apply.
const SESSION_COOKIE_MAX_AGE: u64 = 400 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct SessionCookieConfig {
    secure: bool,
    same_site: &'static str,
}

impl SessionCookieConfig {
    fn from_env() -> Self {
        let same_site = parse_same_site(
            &env::var("SESSION_COOKIE_SAMESITE").unwrap_or_else(|_| "Lax".to_string()),
        );
        let mut secure = crate::config::parse_bool_env("SESSION_COOKIE_SECURE", false);

        // Browsers require SameSite=None cookies to also be Secure.
        if same_site == "None" {
            secure = true;
        }

        Self { secure, same_site }
    }
}

fn session_cookie_config() -> &'static SessionCookieConfig {
    static CONFIG: OnceLock<SessionCookieConfig> = OnceLock::new();
    CONFIG.get_or_init(SessionCookieConfig::from_env)
}

fn parse_same_site(value: &str) -> &'static str {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => "Strict",
        "none" => "None",
        _ => "Lax",
    }
}

pub fn build_session_cookie(value: &str) -> String {
    let config = session_cookie_config();
    let mut cookie = format!(
        "{SESSION_COOKIE}={value}; Path=/; Max-Age={SESSION_COOKIE_MAX_AGE}; HttpOnly; SameSite={}",
        config.same_site
    );

    if config.secure {
        cookie.push_str("; Secure");
    }

    cookie
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie_header| {
            cookie_header.split(';').find_map(|cookie| {
                let (key, value) = cookie.trim().split_once('=')?;
                (key.trim() == name).then(|| value.trim().to_string())
            })
        })
}
