//! JWT authentication module.
//!
//! Signs and verifies HS256 tokens for both scopes, and provides the
//! middleware guarding the private route groups.
//!
//! ```text
//! request ──► Authorization: Bearer <jwt> ──┐
//!         └─► Cookie: jwt_token / session_jwt ┴─► verify ──► scope check ──► claims extension
//! ```

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use tableside_core::{ManagerClaims, ScopedClaims, SessionClaims, TokenScope};

use crate::error::ApiError;
use crate::AppState;

/// Cookie carrying a manager token.
pub const MANAGER_COOKIE: &str = "jwt_token";

/// Cookie carrying a session token.
pub const SESSION_COOKIE: &str = "session_jwt";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("token scope {found:?} cannot access {expected:?} routes")]
    WrongScope {
        expected: TokenScope,
        found: Option<TokenScope>,
    },

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager").finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(secret: impl Into<String>) -> Self {
        JwtManager {
            secret: secret.into(),
        }
    }

    fn secret(&self) -> Result<&[u8], AuthError> {
        if self.secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(self.secret.as_bytes())
    }

    /// Sign claims as an HS256 token.
    pub fn sign<C>(&self, claims: &C) -> Result<String, AuthError>
    where
        C: Serialize + ScopedClaims,
    {
        let secret = self.secret()?;
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validate a token's signature and expiry, then require `C`'s scope.
    pub fn verify<C>(&self, token: &str) -> Result<C, AuthError>
    where
        C: DeserializeOwned + ScopedClaims,
    {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<serde_json::Value>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let found = data
            .claims
            .get("scope")
            .cloned()
            .and_then(|scope| serde_json::from_value::<TokenScope>(scope).ok());

        if found != Some(C::SCOPE) {
            return Err(AuthError::WrongScope {
                expected: C::SCOPE,
                found,
            });
        }

        serde_json::from_value(data.claims).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Value of cookie `name` from the `Cookie` headers.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Bearer header first, then the named cookie.
fn request_token(headers: &HeaderMap, cookie: &str) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .or_else(|| extract_cookie(headers, cookie))
        .map(str::to_string)
}

/// Guards `/private/manager`: verified [`ManagerClaims`] become a request extension.
pub async fn require_manager(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request_token(request.headers(), MANAGER_COOKIE).ok_or(AuthError::MissingToken)?;
    let claims: ManagerClaims = state.jwt.verify(&token)?;

    debug!(manager = %claims.email(), "manager authenticated");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Guards `/private/session`: verified [`SessionClaims`] become a request extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request_token(request.headers(), SESSION_COOKIE).ok_or(AuthError::MissingToken)?;
    let claims: SessionClaims = state.jwt.verify(&token)?;

    debug!(store_id = %claims.store_id, seat_id = %claims.seat_id, "session authenticated");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    fn manager() -> JwtManager {
        JwtManager::new("test-secret")
    }

    #[test]
    fn test_jwt_roundtrip() {
        let claims = ManagerClaims::new("boss@cafe.test", false, Duration::hours(1));
        let token = manager().sign(&claims).unwrap();

        let decoded: ManagerClaims = manager().verify(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_wrong_scope() {
        let claims = SessionClaims::new("store_1", "seat_1", "Table 1", Duration::hours(1));
        let token = manager().sign(&claims).unwrap();

        let result = manager().verify::<ManagerClaims>(&token);
        assert!(matches!(
            result,
            Err(AuthError::WrongScope {
                expected: TokenScope::Manager,
                found: Some(TokenScope::Session),
            })
        ));
        assert!(manager().verify::<SessionClaims>(&token).is_ok());
    }

    #[test]
    fn test_empty_secret() {
        let blank = JwtManager::new("  ");
        let claims = ManagerClaims::new("boss@cafe.test", false, Duration::hours(1));
        assert!(matches!(blank.sign(&claims), Err(AuthError::MissingSecret)));
        assert!(matches!(
            blank.verify::<ManagerClaims>("a.b.c"),
            Err(AuthError::MissingSecret)
        ));
    }

    #[test]
    fn test_tampered_and_foreign_tokens() {
        let claims = ManagerClaims::new("boss@cafe.test", false, Duration::hours(1));
        let token = manager().sign(&claims).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(
            manager().verify::<ManagerClaims>(&tampered),
            Err(AuthError::InvalidToken(_))
        ));

        let other = JwtManager::new("other-secret");
        assert!(matches!(
            other.verify::<ManagerClaims>(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let issued = Utc::now() - Duration::hours(2);
        let claims = ManagerClaims::issued_at("boss@cafe.test", false, issued, Duration::hours(1));
        let token = manager().sign(&claims).unwrap();

        assert!(matches!(
            manager().verify::<ManagerClaims>(&token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_token_sources() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; jwt_token=from-cookie"));
        assert_eq!(extract_cookie(&headers, MANAGER_COOKIE), Some("from-cookie"));
        assert_eq!(extract_cookie(&headers, SESSION_COOKIE), None);
        assert_eq!(request_token(&headers, MANAGER_COOKIE).as_deref(), Some("from-cookie"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(request_token(&headers, MANAGER_COOKIE).as_deref(), Some("from-header"));
    }
}
