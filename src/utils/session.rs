use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_TOKEN_PREFIX: &str = "user_";
const TOKEN_SUFFIX_LEN: usize = 9;
const MAX_TOKEN_LEN: usize = 64;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a pseudo-anonymous session token (`user_` + 9 base-36 chars).
///
/// Not cryptographically hardened: the token is a correlation key for
/// upvotes and reports, never a credential.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_SUFFIX_LEN];
    if getrandom::getrandom(&mut bytes).is_err() {
        // Entropy source unavailable: fall back to clock bits.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (nanos >> (i * 7)) as u8;
        }
    }

    let mut token = String::with_capacity(SESSION_TOKEN_PREFIX.len() + TOKEN_SUFFIX_LEN);
    token.push_str(SESSION_TOKEN_PREFIX);
    for b in bytes {
        token.push(BASE36[(b % 36) as usize] as char);
    }
    token
}

/// Accept any short token made of `[A-Za-z0-9_-]`. Clients may bring their own.
pub fn is_valid_session_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
