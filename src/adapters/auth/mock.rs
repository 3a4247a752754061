//! Mock session validator for tests and local runs.
//!
//! ```ignore
//! let validator = MockSessionValidator::new()
//!     .with_test_user("user-token", "user-1")
//!     .with_test_admin("admin-token", "admin-1");
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Maps fixed tokens to users. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a regular user `{id}` with email `{id}@test.example.com`.
    pub fn with_test_user(self, token: impl Into<String>, user_id: &str) -> Self {
        self.with_test_identity(token, user_id, false)
    }

    /// Same as [`Self::with_test_user`] but with the admin flag set.
    pub fn with_test_admin(self, token: impl Into<String>, user_id: &str) -> Self {
        self.with_test_identity(token, user_id, true)
    }

    /// Blank ids are skipped, so the token stays unknown.
    fn with_test_identity(self, token: impl Into<String>, user_id: &str, is_admin: bool) -> Self {
        if let Ok(id) = UserId::new(user_id) {
            let user = AuthenticatedUser::new(
                id,
                format!("{}@test.example.com", user_id),
                Some(format!("Test User {}", user_id)),
                is_admin,
            );
            self.add_token(token, user);
        }
        self
    }

    /// Forces every validation to fail with `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        if let Ok(mut slot) = self.force_error.write() {
            *slot = Some(error);
        }
        self
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), user);
        }
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let forced = self
            .force_error
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator poisoned"))?
            .clone();
        if let Some(error) = forced {
            return Err(error);
        }

        self.tokens
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator poisoned"))?
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
