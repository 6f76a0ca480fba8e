pub mod gate;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::store::{Principal, Session};

pub use gate::{AuthorizationGate, GateOutcome, ALLOW_LIST_TABLE, NOT_AUTHORIZED};

pub const ACCESS_TOKEN_COOKIE: &str = "admin_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "admin_refresh_token";

// Treat tokens this close to expiry as already expired.
const EXPIRY_SKEW_SECS: i64 = 10;

/// Allow-listed principal, injected into request extensions by the gate.
#[derive(Clone, Debug)]
pub struct AdminPrincipal(pub Principal);

/// Session tokens as carried by the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    /// Read the session cookies. `None` when there is no access token.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let access_token = cookie_value(headers, ACCESS_TOKEN_COOKIE)?;
        Some(Self {
            access_token,
            refresh_token: cookie_value(headers, REFRESH_TOKEN_COOKIE),
        })
    }

    /// Whether the access token's own `exp` claim says it is spent. Tokens
    /// that cannot be decoded are left for the directory to judge.
    pub fn access_token_expired(&self) -> bool {
        match TokenClaims::peek(&self.access_token).and_then(|c| c.exp) {
            Some(exp) => exp - EXPIRY_SKEW_SECS <= Utc::now().timestamp(),
            None => false,
        }
    }
}

impl From<&Session> for SessionTokens {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
        }
    }
}

/// Claims the dashboard reads from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode without verifying the signature. Only used to schedule a
    /// refresh; the directory remains the authority on token validity.
    pub fn peek(token: &str) -> Option<Self> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn cookie(name: &str, value: &str, max_age: u64, config: &SessionConfig) -> Option<HeaderValue> {
    let secure = if config.cookie_secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        name, value, max_age, secure
    ))
    .ok()
}

/// `Set-Cookie` values that store a session in the browser.
pub fn session_cookies(session: &Session, config: &SessionConfig) -> Vec<HeaderValue> {
    let mut cookies = Vec::with_capacity(2);
    cookies.extend(cookie(ACCESS_TOKEN_COOKIE, &session.access_token, config.max_age_secs, config));
    if let Some(refresh) = &session.refresh_token {
        cookies.extend(cookie(REFRESH_TOKEN_COOKIE, refresh, config.max_age_secs, config));
    }
    cookies
}

/// `Set-Cookie` values that remove the session from the browser.
pub fn clear_session_cookies(config: &SessionConfig) -> Vec<HeaderValue> {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .iter()
        .filter_map(|name| cookie(name, "", 0, config))
        .collect()
}

/// Append cookies to a response's headers.
pub fn append_cookies(headers: &mut HeaderMap, cookies: Vec<HeaderValue>) {
    for value in cookies {
        headers.append(SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    fn token_expiring_at(exp: i64) -> String {
        let claims = TokenClaims {
            sub: Some("6f9619ff-8b86-d011-b42d-00cf4fc964ff".into()),
            email: None,
            exp: Some(exp),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"remote-secret")).unwrap()
    }

    #[test]
    fn reads_session_cookies() {
        let headers = headers_with_cookie("theme=dark; admin_access_token=abc.def.ghi; admin_refresh_token=r1");
        let tokens = SessionTokens::from_headers(&headers).unwrap();
        assert_eq!(tokens.access_token, "abc.def.ghi");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r1"));
    }

    #[test]
    fn missing_or_empty_access_cookie_is_no_session() {
        assert!(SessionTokens::from_headers(&HeaderMap::new()).is_none());
        assert!(SessionTokens::from_headers(&headers_with_cookie("admin_access_token=; x=1")).is_none());
        assert!(SessionTokens::from_headers(&headers_with_cookie("admin_refresh_token=r1")).is_none());
    }

    #[test]
    fn peeks_expiry_without_the_signing_key() {
        let now = Utc::now().timestamp();
        let fresh = SessionTokens { access_token: token_expiring_at(now + 3600), refresh_token: None };
        let stale = SessionTokens { access_token: token_expiring_at(now - 60), refresh_token: None };
        let opaque = SessionTokens { access_token: "opaque".into(), refresh_token: None };

        assert!(!fresh.access_token_expired());
        assert!(stale.access_token_expired());
        assert!(!opaque.access_token_expired());
    }

    #[test]
    fn cookie_attributes_follow_config() {
        let config = SessionConfig { cookie_secure: true, max_age_secs: 600 };
        let cleared = clear_session_cookies(&config);
        assert_eq!(cleared.len(), 2);
        let first = cleared[0].to_str().unwrap();
        assert!(first.starts_with("admin_access_token=;"));
        assert!(first.contains("Max-Age=0"));
        assert!(first.ends_with("; Secure"));
        assert!(first.contains("HttpOnly"));
    }
}
