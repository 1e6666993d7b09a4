use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::credentials::verify_password;
use super::principal::UserRecord;
use crate::backend::{StoreError, UserDirectory};
use crate::config::PasswordCheck;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new<U: Into<String>, P: Into<String>>(user_id: U, password: P) -> Self {
        Self { user_id: user_id.into().trim().to_string(), password: password.into() }
    }
}

/// Verifies credentials and yields the account record a session is built from.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, req: &LoginRequest) -> AppResult<UserRecord>;
}

/// Credentials checked against the identity directory.
pub struct DirectoryAuthProvider {
    directory: Arc<dyn UserDirectory>,
    check: PasswordCheck,
}

impl DirectoryAuthProvider {
    pub fn new(directory: Arc<dyn UserDirectory>, check: PasswordCheck) -> Self {
        Self { directory, check }
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthenticated("invalid_credentials", "invalid user id or password")
}

#[async_trait]
impl AuthProvider for DirectoryAuthProvider {
    async fn authenticate(&self, req: &LoginRequest) -> AppResult<UserRecord> {
        if req.user_id.is_empty() || req.password.is_empty() {
            return Err(AppError::user("missing_credentials", "user id and password are required"));
        }
        let user = match self.directory.get_user(&req.user_id).await {
            Ok(u) => u,
            Err(StoreError::NotFound(_)) => {
                warn!(target: "studydesk::session", "login rejected: unknown user {}", req.user_id);
                return Err(invalid_credentials());
            }
            Err(e) => return Err(AppError::unavailable("identity_unavailable".to_string(), e.to_string())),
        };
        if !verify_password(self.check, &user.password, &req.password) {
            warn!(target: "studydesk::session", "login rejected: bad password for {}", req.user_id);
            return Err(invalid_credentials());
        }
        Ok(user)
    }
}
