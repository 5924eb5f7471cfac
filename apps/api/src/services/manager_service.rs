//! Manager signup and signin.

use serde::Serialize;
use tracing::{info, warn};

use tableside_core::validation::validate_email;
use tableside_core::{Manager, ManagerClaims, ManagerView};

use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password, verify_password};
use crate::services::TOKEN_TYPE;
use crate::AppState;

/// Signin result: the token plus the manager it was issued to.
#[derive(Debug, Clone, Serialize)]
pub struct SigninGrant {
    pub token: String,
    pub token_type: &'static str,
    pub manager: ManagerView,
}

pub struct ManagerService {
    state: AppState,
}

impl ManagerService {
    pub fn new(state: AppState) -> Self {
        ManagerService { state }
    }

    /// Registers a non-admin manager.
    ///
    /// ## Errors
    /// - `Validation` for a malformed email or a password outside policy
    /// - `Conflict` if the email is already registered
    pub async fn signup(&self, email: &str, password: &str) -> ApiResult<ManagerView> {
        let email = email.trim();
        validate_email(email)?;

        let hash = hash_password(password)?;
        let manager = Manager::new(email, hash, false)?;

        self.state.managers.create(&manager).await?;
        info!(email = %manager.email, "manager registered");

        Ok(ManagerView::from(&manager))
    }

    /// Checks credentials and issues a manager token.
    pub async fn signin(&self, email: &str, password: &str) -> ApiResult<SigninGrant> {
        let email = email.trim();

        let manager = match self.state.managers.find_by_id(email).await? {
            Some(m) if verify_password(password, &m.password_hash) => m,
            _ => {
                warn!(email = %email, "signin rejected");
                return Err(ApiError::Unauthorized("invalid email or password".to_string()));
            }
        };

        let claims = ManagerClaims::new(
            manager.email.as_str(),
            manager.admin,
            self.state.config.manager_token_ttl(),
        );
        let token = self.state.jwt.sign(&claims)?;

        info!(email = %manager.email, "manager signed in");

        Ok(SigninGrant {
            token,
            token_type: TOKEN_TYPE,
            manager: ManagerView::from(&manager),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::http::StatusCode;

    fn service() -> ManagerService {
        let config = ApiConfig {
            jwt_secret: "test-secret".to_string(),
            ..ApiConfig::default()
        };
        ManagerService::new(AppState::in_memory(config))
    }

    #[tokio::test]
    async fn test_signup_then_signin() {
        let svc = service();
        let view = svc.signup(" boss@cafe.test ", "long-enough").await.unwrap();
        assert_eq!(view.email, "boss@cafe.test");
        assert!(!view.admin);

        let grant = svc.signin("boss@cafe.test", "long-enough").await.unwrap();
        assert_eq!(grant.token_type, "bearer");
        assert_eq!(grant.manager.email, "boss@cafe.test");

        let claims: ManagerClaims = svc.state.jwt.verify(&grant.token).unwrap();
        assert_eq!(claims.email(), "boss@cafe.test");
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicates_and_bad_input() {
        let svc = service();
        svc.signup("boss@cafe.test", "long-enough").await.unwrap();

        let dup = svc.signup("boss@cafe.test", "long-enough").await.unwrap_err();
        assert_eq!(dup.status_and_code().0, StatusCode::CONFLICT);

        let short = svc.signup("other@cafe.test", "short").await.unwrap_err();
        assert_eq!(short.status_and_code().0, StatusCode::BAD_REQUEST);

        let email = svc.signup("nope", "long-enough").await.unwrap_err();
        assert_eq!(email.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signin_rejects_bad_credentials() {
        let svc = service();
        svc.signup("boss@cafe.test", "long-enough").await.unwrap();

        for (email, password) in [
            ("boss@cafe.test", "wrong-password"),
            ("ghost@cafe.test", "long-enough"),
        ] {
            let err = svc.signin(email, password).await.unwrap_err();
            assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);
        }
    }
}
